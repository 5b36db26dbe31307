//! # Validation Module
//!
//! Input validation and sale totals for Stockroom.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create_sale() pipeline                             │
//! │                                                                         │
//! │  CreateSaleRequest                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_sale_request() ← THIS MODULE                                 │
//! │       ├── no lines?            → EmptyCart                             │
//! │       ├── bad qty / price?     → ValidationError                       │
//! │       ├── negative discount?   → ValidationError                       │
//! │       └── discount > subtotal? → NegativeTotal                         │
//! │       │                                                                 │
//! │       ▼  (only now is stock touched)                                    │
//! │  InventoryLedger::reserve() per line                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: a failing request never reaches the ledger.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CreateSaleRequest, NewInventoryItem, SaleLineRequest};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 500;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an item name.
///
/// ```rust
/// use stockroom_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Linen Shirt").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional free-text field (customer name, notes, ...).
pub fn validate_optional_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(text) if text.chars().count() > MAX_TEXT_LEN => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity: 1..=MAX_ITEM_QUANTITY.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level (opening quantity). Zero is allowed.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a non-negative amount in centavos. Zero is allowed (free items).
///
/// ```rust
/// use stockroom_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents("price", 0).is_ok());
/// assert!(validate_amount_cents("price", -1).is_err());
/// ```
pub fn validate_amount_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a new catalog entry before it is stored.
pub fn validate_new_item(item: &NewInventoryItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_optional_text("description", item.description.as_deref())?;
    validate_amount_cents("price", item.price_cents)?;
    validate_amount_cents("cost", item.cost_cents)?;
    validate_stock_quantity(item.quantity)?;
    Ok(())
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Subtotal, discount and total computed from a request.
///
/// Invariants: `subtotal = Σ quantity × unit price` and
/// `total = subtotal − discount ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl SaleTotals {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Validates one cart line.
pub fn validate_line(line: &SaleLineRequest) -> ValidationResult<()> {
    if line.item_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "item_id".to_string(),
        });
    }
    validate_quantity(line.quantity)?;
    validate_amount_cents("unit price", line.unit_price_cents)?;
    Ok(())
}

/// Validates a proposed sale and computes its totals.
///
/// ## Order of checks
/// 1. `EmptyCart`
/// 2. cart size, each line, discount, free-text fields
/// 3. `NegativeTotal`
///
/// ```rust
/// use stockroom_core::{CreateSaleRequest, SaleLineRequest};
/// use stockroom_core::validation::validate_sale_request;
///
/// let request = CreateSaleRequest::new(vec![SaleLineRequest {
///     item_id: "a".into(),
///     quantity: 3,
///     unit_price_cents: 10_000,
///     size: None,
/// }])
/// .with_discount(5_000);
///
/// let totals = validate_sale_request(&request).unwrap();
/// assert_eq!(totals.subtotal_cents, 30_000);
/// assert_eq!(totals.total_cents, 25_000);
/// ```
pub fn validate_sale_request(request: &CreateSaleRequest) -> CoreResult<SaleTotals> {
    if request.lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    if request.lines.len() > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        }
        .into());
    }

    for line in &request.lines {
        validate_line(line)?;
    }

    validate_amount_cents("discount", request.discount_cents)?;
    validate_optional_text("customer name", request.customer_name.as_deref())?;
    validate_optional_text("customer contact", request.customer_contact.as_deref())?;
    validate_optional_text("notes", request.notes.as_deref())?;

    let subtotal = request
        .lines
        .iter()
        .try_fold(Money::zero(), |subtotal, line| {
            Money::from_cents(line.unit_price_cents)
                .checked_multiply_quantity(line.quantity)
                .and_then(|line_total| subtotal.checked_add(line_total))
        })
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "subtotal".to_string(),
            min: 0,
            max: i64::MAX,
        })?;
    let discount = Money::from_cents(request.discount_cents);
    let total = subtotal - discount;

    if total.is_negative() {
        return Err(CoreError::NegativeTotal {
            subtotal_cents: subtotal.cents(),
            discount_cents: discount.cents(),
        });
    }

    Ok(SaleTotals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        total_cents: total.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    fn line(item_id: &str, quantity: i64, unit_price_cents: i64) -> SaleLineRequest {
        SaleLineRequest {
            item_id: item_id.to_string(),
            quantity,
            unit_price_cents,
            size: None,
        }
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Denim Jacket").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_new_item() {
        let mut item = NewInventoryItem {
            name: "Polo".to_string(),
            description: None,
            size: Size::M,
            price_cents: 59_900,
            cost_cents: 30_000,
            quantity: 0,
            image_url: None,
        };
        assert!(validate_new_item(&item).is_ok());

        item.cost_cents = -1;
        assert!(validate_new_item(&item).is_err());

        item.cost_cents = 0;
        item.quantity = -4;
        assert!(validate_new_item(&item).is_err());
    }

    #[test]
    fn test_totals_for_example_cart() {
        let request = CreateSaleRequest::new(vec![line("a", 3, 100)]);
        let totals = validate_sale_request(&request).unwrap();
        assert_eq!(
            totals,
            SaleTotals {
                subtotal_cents: 300,
                discount_cents: 0,
                total_cents: 300,
            }
        );
    }

    #[test]
    fn test_empty_cart_is_rejected_first() {
        let request = CreateSaleRequest::new(vec![]).with_discount(-5);
        assert!(matches!(
            validate_sale_request(&request),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_negative_total() {
        let request = CreateSaleRequest::new(vec![line("a", 1, 500)]).with_discount(501);
        match validate_sale_request(&request) {
            Err(CoreError::NegativeTotal {
                subtotal_cents,
                discount_cents,
            }) => {
                assert_eq!(subtotal_cents, 500);
                assert_eq!(discount_cents, 501);
            }
            other => panic!("expected NegativeTotal, got {other:?}"),
        }

        // Discount equal to subtotal is a free sale, not an error.
        let request = CreateSaleRequest::new(vec![line("a", 1, 500)]).with_discount(500);
        assert_eq!(validate_sale_request(&request).unwrap().total_cents, 0);
    }

    #[test]
    fn test_malformed_lines() {
        let zero_qty = CreateSaleRequest::new(vec![line("a", 0, 100)]);
        assert!(matches!(
            validate_sale_request(&zero_qty),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let negative_price = CreateSaleRequest::new(vec![line("a", 1, -100)]);
        assert!(matches!(
            validate_sale_request(&negative_price),
            Err(CoreError::Validation(_))
        ));

        let negative_discount = CreateSaleRequest::new(vec![line("a", 1, 100)]).with_discount(-1);
        assert!(matches!(
            validate_sale_request(&negative_discount),
            Err(CoreError::Validation(_))
        ));

        let blank_item = CreateSaleRequest::new(vec![line(" ", 1, 100)]);
        assert!(validate_sale_request(&blank_item).is_err());
    }

    #[test]
    fn test_cart_size_limit() {
        let lines = (0..=MAX_CART_ITEMS).map(|i| line(&i.to_string(), 1, 1)).collect();
        assert!(validate_sale_request(&CreateSaleRequest::new(lines)).is_err());
    }

    #[test]
    fn test_subtotal_overflow_is_rejected() {
        let huge = CreateSaleRequest::new(vec![line("a", 3, i64::MAX / 2)]);
        assert!(matches!(
            validate_sale_request(&huge),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // Each line fits on its own; the sum does not.
        let summed = CreateSaleRequest::new(vec![
            line("a", 1, i64::MAX - 10),
            line("b", 1, 11),
        ]);
        assert!(matches!(
            validate_sale_request(&summed),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }
}
