//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite storage for inventory items and sales, using sqlx for async
//! access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  SaleCoordinator / InventoryLedger (stockroom-sales)                   │
//! │       │  via InventoryStore / SaleStore                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockroom-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ InventoryRepo  │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo       │   │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <project data dir>/stockroom.db                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Inventory and sale repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockroom.db")).await?;
//!
//! let item = db.inventory().find_owned("owner-1", &item_id).await?;
//! let sales = db.sales().query("owner-1", &DateRange::all(), true).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::inventory::{DecrementOutcome, InventoryRepository};
pub use repository::sale::{SaleRepository, VoidOutcome};
