//! # Sales Error Types
//!
//! One error type for every operation the sales service exposes.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockroom                              │
//! │                                                                         │
//! │  validate_sale_request() ── ValidationError ─┐                         │
//! │                                               ▼                         │
//! │  InventoryLedger / SaleCoordinator ──── CoreError ──┐                  │
//! │                                                      │                  │
//! │  InventoryRepository / SaleRepository ── DbError ───┤                  │
//! │                                                      │                  │
//! │  SalesConfig::load() ──────────────── ConfigError ──┤                  │
//! │                                                      ▼                  │
//! │                                                SalesError              │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                                  code(): "INSUFFICIENT_STOCK", ...     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use stockroom_core::CoreError;
use stockroom_db::DbError;

/// Result type alias for sales operations.
pub type SalesResult<T> = Result<T, SalesError>;

// =============================================================================
// Sales Error
// =============================================================================

/// Error returned by the ledger, the coordinator and the service facade.
#[derive(Debug, Error)]
pub enum SalesError {
    /// A business rule rejected the request. Nothing is retried.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The store failed underneath the workflow.
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),

    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SalesError {
    /// Missing item or sale, including one that belongs to another owner.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SalesError::Domain(err) if err.is_not_found())
    }

    /// Machine-readable category for the request boundary.
    pub fn code(&self) -> ErrorCode {
        match self {
            SalesError::Domain(err) => match err {
                CoreError::ItemNotFound(_) | CoreError::SaleNotFound(_) => ErrorCode::NotFound,
                CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                CoreError::EmptyCart => ErrorCode::EmptyCart,
                CoreError::NegativeTotal { .. } => ErrorCode::NegativeTotal,
                CoreError::AlreadyVoided(_) => ErrorCode::AlreadyVoided,
                CoreError::Validation(_) => ErrorCode::ValidationError,
            },
            SalesError::Storage(_) => ErrorCode::DatabaseError,
            SalesError::Config(_) => ErrorCode::ConfigError,
        }
    }
}

/// Error codes for the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item or sale not found for this owner (404)
    NotFound,

    /// Not enough stock for a line (409)
    InsufficientStock,

    /// Sale submitted with no lines (400)
    EmptyCart,

    /// Discount larger than subtotal (400)
    NegativeTotal,

    /// Sale was already voided (409)
    AlreadyVoided,

    /// Malformed input (400)
    ValidationError,

    /// Store failure (500)
    DatabaseError,

    /// Bad configuration (500)
    ConfigError,
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`SalesConfig`](crate::config::SalesConfig).
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range or unknown.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
