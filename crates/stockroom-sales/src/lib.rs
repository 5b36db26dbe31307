//! # stockroom-sales: Inventory Ledger & Sale Transactions
//!
//! The workflows that move stock: reserving and releasing units, recording
//! sales, voiding them, and summarizing what sold.
//!
//! ## Consistency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    What Is Atomic, What Is Not                          │
//! │                                                                         │
//! │  ✅ one item, one reserve   UPDATE ... WHERE quantity >= qty            │
//! │  ✅ one sale, one void      UPDATE ... WHERE voided_at IS NULL          │
//! │  ✅ one sale record         header + lines in one SQLite transaction    │
//! │                                                                         │
//! │  ❌ a multi-line cart       each line is reserved on its own            │
//! │     BestEffortSequential → earlier lines stay reserved on failure       │
//! │     TwoPhase             → pre-check, then release on failure           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock never goes negative, and a voided sale gives its stock back at
//! most once.
//!
//! ## Modules
//!
//! - [`ledger`] - Per-item reserve/release
//! - [`coordinator`] - Create sale, void sale, read and summarize
//! - [`store`] - Storage traits and their SQLite adapters
//! - [`service`] - Facade over the above
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Error types and codes

pub mod config;
pub mod coordinator;
pub mod error;
pub mod ledger;
pub mod service;
pub mod store;

pub use config::{ReservationStrategy, SalesConfig};
pub use coordinator::SaleCoordinator;
pub use error::{ConfigError, ErrorCode, SalesError, SalesResult};
pub use ledger::{InventoryLedger, Reservation};
pub use service::SalesService;
pub use store::{InventoryStore, SaleStore};
