//! # Store Ports
//!
//! The storage operations the ledger and coordinator depend on.
//!
//! ```text
//!   InventoryLedger ──► dyn InventoryStore ──► InventoryRepository (SQLite)
//!   SaleCoordinator ──► dyn SaleStore      ──► SaleRepository      (SQLite)
//! ```
//!
//! Every operation is scoped by owner id. The only synchronization the
//! workflows rely on is that `conditional_decrement` and
//! `conditional_void` are single atomic statements.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroom_core::{DateRange, InventoryItem, Sale};
use stockroom_db::{
    DbResult, DecrementOutcome, InventoryRepository, SaleRepository, VoidOutcome,
};

/// Per-item stock storage.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn find_owned_item(&self, owner_id: &str, item_id: &str)
        -> DbResult<Option<InventoryItem>>;

    /// Takes `qty` units only if at least `qty` are on hand, atomically.
    async fn conditional_decrement(
        &self,
        owner_id: &str,
        item_id: &str,
        qty: i64,
    ) -> DbResult<DecrementOutcome>;

    /// Adds `qty` units. Returns whether an item matched.
    async fn increment(&self, owner_id: &str, item_id: &str, qty: i64) -> DbResult<bool>;

    async fn insert_item(&self, item: &InventoryItem) -> DbResult<()>;
}

/// Sale record storage.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Persists header and lines as one write.
    async fn insert_sale(&self, sale: &Sale) -> DbResult<()>;

    async fn find_owned_sale(&self, owner_id: &str, sale_id: &str) -> DbResult<Option<Sale>>;

    /// Sets the void timestamp only if the sale is still active.
    async fn conditional_void(
        &self,
        owner_id: &str,
        sale_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<VoidOutcome>;

    /// Newest first.
    async fn query_sales(
        &self,
        owner_id: &str,
        range: &DateRange,
        active_only: bool,
    ) -> DbResult<Vec<Sale>>;
}

// =============================================================================
// SQLite Adapters
// =============================================================================

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn find_owned_item(
        &self,
        owner_id: &str,
        item_id: &str,
    ) -> DbResult<Option<InventoryItem>> {
        self.find_owned(owner_id, item_id).await
    }

    async fn conditional_decrement(
        &self,
        owner_id: &str,
        item_id: &str,
        qty: i64,
    ) -> DbResult<DecrementOutcome> {
        InventoryRepository::conditional_decrement(self, owner_id, item_id, qty).await
    }

    async fn increment(&self, owner_id: &str, item_id: &str, qty: i64) -> DbResult<bool> {
        InventoryRepository::increment(self, owner_id, item_id, qty).await
    }

    async fn insert_item(&self, item: &InventoryItem) -> DbResult<()> {
        self.insert(item).await
    }
}

#[async_trait]
impl SaleStore for SaleRepository {
    async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        self.insert(sale).await
    }

    async fn find_owned_sale(&self, owner_id: &str, sale_id: &str) -> DbResult<Option<Sale>> {
        self.find_owned(owner_id, sale_id).await
    }

    async fn conditional_void(
        &self,
        owner_id: &str,
        sale_id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<VoidOutcome> {
        SaleRepository::conditional_void(self, owner_id, sale_id, at).await
    }

    async fn query_sales(
        &self,
        owner_id: &str,
        range: &DateRange,
        active_only: bool,
    ) -> DbResult<Vec<Sale>> {
        self.query(owner_id, range, active_only).await
    }
}
