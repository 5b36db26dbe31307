//! # stockroom-core: Pure Business Logic for Stockroom
//!
//! Domain types, money, validation and the sales summary fold for a small
//! garment shop inventory and point-of-sale tracker. Nothing in here touches
//! a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Request boundary (HTTP / CLI, not in this repo)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ owner id + plain records               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     stockroom-sales: InventoryLedger, SaleCoordinator           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockroom-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validation│  │  report   │  │   │
//! │  │   │ Inventory │  │   Money   │  │ cart rules│  │ summary   │  │   │
//! │  │   │   Sale    │  │           │  │  totals   │  │   fold    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                stockroom-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Sale, SaleState, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Cart and catalog validation, sale totals
//! - [`report`] - Read-only sales summary over active sales
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_cents(49_900); // ₱499.00
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 149_700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{DailyTotal, PaymentMethodTotal, SalesSummary, TopItem};
pub use types::*;
pub use validation::SaleTotals;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway carts and keeps the per-item reservation loop short.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of entries kept in [`SalesSummary::top_items`].
pub const TOP_ITEMS_LIMIT: usize = 10;
