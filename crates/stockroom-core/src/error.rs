//! # Error Types
//!
//! Domain-specific error types for stockroom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockroom-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Malformed input                                │
//! │                                                                         │
//! │  stockroom-db errors                                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  stockroom-sales errors                                                │
//! │  └── SalesError       - CoreError | DbError | ConfigError              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SalesError → request boundary     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable and reportable to the caller. None of them
//! is fatal to the process.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Inventory item cannot be found for this owner.
    ///
    /// ## When This Occurs
    /// - Item ID doesn't exist
    /// - Item exists but belongs to another owner (never reported as forbidden)
    /// - Item was deleted after it was put in the cart
    #[error("Inventory item not found: {0}")]
    ItemNotFound(String),

    /// Sale cannot be found for this owner.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to reserve a line item.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line: Linen Shirt (M) × 5
    ///      │
    ///      ▼
    /// reserve(): quantity on hand = 3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Linen Shirt", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Linen Shirt in stock"
    /// ```
    #[error("Insufficient stock for {name} ({item_id}): available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// A sale was submitted with no line items.
    #[error("Sale must have at least one item")]
    EmptyCart,

    /// Discount is larger than the subtotal.
    #[error("Discount {discount_cents} exceeds subtotal {subtotal_cents}")]
    NegativeTotal {
        subtotal_cents: i64,
        discount_cents: i64,
    },

    /// Sale has already been voided (possibly by a concurrent request).
    #[error("Sale is already voided: {0}")]
    AlreadyVoided(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true for the "not found" class (items and sales).
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ItemNotFound(_) | CoreError::SaleNotFound(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any mutation happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustNotBeNegative { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item_id: "item-1".to_string(),
            name: "Linen Shirt".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Linen Shirt (item-1): available 3, requested 5"
        );

        let err = CoreError::NegativeTotal {
            subtotal_cents: 10_000,
            discount_cents: 12_000,
        };
        assert_eq!(err.to_string(), "Discount 12000 exceeds subtotal 10000");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        };
        assert_eq!(err.to_string(), "discount cannot be negative");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_not_found_class() {
        assert!(CoreError::ItemNotFound("a".into()).is_not_found());
        assert!(CoreError::SaleNotFound("b".into()).is_not_found());
        assert!(!CoreError::EmptyCart.is_not_found());
    }
}
