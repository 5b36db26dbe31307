//! # Repository Module
//!
//! Database repository implementations for Stockroom.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  InventoryLedger / SaleCoordinator                                     │
//! │       │                                                                 │
//! │       │  store.conditional_decrement(owner, id, 2)                     │
//! │       ▼                                                                 │
//! │  InventoryRepository                  SaleRepository                   │
//! │  ├── insert / delete                  ├── insert (header + lines)      │
//! │  ├── find_owned                       ├── find_owned                   │
//! │  ├── conditional_decrement            ├── conditional_void             │
//! │  └── increment                        └── query (range, active_only)   │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every read and write takes the owner id explicitly.
//!
//! ## Available Repositories
//!
//! - [`InventoryRepository`](inventory::InventoryRepository) - Catalog and stock levels
//! - [`SaleRepository`](sale::SaleRepository) - Sales and line items

pub mod inventory;
pub mod sale;
