//! # Sales Service
//!
//! The facade callers use: one handle that owns the database, the ledger
//! and the coordinator.
//!
//! ```rust,ignore
//! let config = SalesConfig::load(None)?;
//! let service = SalesService::connect(&config).await?;
//!
//! let item = service.register_item("owner-1", new_item).await?;
//! let sale = service.create_sale("owner-1", request).await?;
//! let summary = service.summarize("owner-1", &DateRange::all()).await?;
//! ```

use std::sync::Arc;

use tracing::info;

use stockroom_core::{CreateSaleRequest, DateRange, InventoryItem, NewInventoryItem, Sale, SalesSummary};
use stockroom_db::Database;

use crate::config::{ReservationStrategy, SalesConfig};
use crate::coordinator::SaleCoordinator;
use crate::error::{ConfigError, SalesResult};
use crate::ledger::InventoryLedger;

/// Entry point for every sales operation.
#[derive(Clone)]
pub struct SalesService {
    db: Database,
    coordinator: SaleCoordinator,
}

impl SalesService {
    /// Opens the configured database and wires the workflows over it.
    ///
    /// The database file's parent directory is created if missing.
    pub async fn connect(config: &SalesConfig) -> SalesResult<Self> {
        config.validate()?;

        let db_config = config.db_config();
        if !db_config.is_in_memory() {
            if let Some(parent) = config.database.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
                }
            }
        }

        let db = Database::new(db_config).await?;

        info!(
            path = %config.database.path.display(),
            strategy = %config.reservation_strategy(),
            "Sales service ready"
        );
        Ok(Self::from_database(db, config.reservation_strategy()))
    }

    /// Wires the workflows over an already-open database.
    pub fn from_database(db: Database, strategy: ReservationStrategy) -> Self {
        let ledger = InventoryLedger::new(Arc::new(db.inventory()));
        let coordinator = SaleCoordinator::new(ledger, Arc::new(db.sales()), strategy);
        SalesService { db, coordinator }
    }

    pub async fn create_sale(&self, owner_id: &str, request: CreateSaleRequest) -> SalesResult<Sale> {
        self.coordinator.create_sale(owner_id, request).await
    }

    pub async fn void_sale(&self, owner_id: &str, sale_id: &str) -> SalesResult<Sale> {
        self.coordinator.void_sale(owner_id, sale_id).await
    }

    pub async fn summarize(&self, owner_id: &str, range: &DateRange) -> SalesResult<SalesSummary> {
        self.coordinator.summarize(owner_id, range).await
    }

    pub async fn find_sale(&self, owner_id: &str, sale_id: &str) -> SalesResult<Sale> {
        self.coordinator.find_sale(owner_id, sale_id).await
    }

    pub async fn register_item(
        &self,
        owner_id: &str,
        item: NewInventoryItem,
    ) -> SalesResult<InventoryItem> {
        self.coordinator.ledger().register_item(owner_id, item).await
    }

    pub fn ledger(&self) -> &InventoryLedger {
        self.coordinator.ledger()
    }

    pub fn strategy(&self) -> ReservationStrategy {
        self.coordinator.strategy()
    }

    /// The underlying database, for maintenance tasks.
    pub fn database(&self) -> &Database {
        &self.db
    }
}
