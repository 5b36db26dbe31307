//! # Inventory Ledger
//!
//! Owns quantity-on-hand for every item and the two ways it changes:
//! `reserve` (take stock for a sale line) and `release` (give it back).
//!
//! ## Reserve
//! ```text
//!   reserve(owner, item, 3)
//!        │
//!        ▼
//!   conditional_decrement ── Applied(item)         → Reservation { remaining }
//!        │               ── Insufficient{available} → InsufficientStock
//!        │               ── Absent                  → ItemNotFound
//! ```
//!
//! No lock is held between the check and the update; the store does both
//! in one statement. Quantity-on-hand therefore never goes negative, even
//! with concurrent sales of the same item.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use stockroom_core::validation::{validate_new_item, validate_quantity};
use stockroom_core::{CoreError, InventoryItem, NewInventoryItem, Size, ValidationError};
use stockroom_db::repository::inventory::generate_item_id;
use stockroom_db::DecrementOutcome;

use crate::error::SalesResult;
use crate::store::InventoryStore;

/// Snapshot of a successful reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub item_id: String,
    /// Item name at reservation time; frozen onto the sale line.
    pub name: String,
    /// Item size at reservation time.
    pub size: Size,
    /// Units taken.
    pub quantity: i64,
    /// Units left on hand after this reservation.
    pub remaining: i64,
}

/// Per-item stock operations, scoped by owner.
#[derive(Clone)]
pub struct InventoryLedger {
    store: Arc<dyn InventoryStore>,
}

impl InventoryLedger {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        InventoryLedger { store }
    }

    /// Takes `qty` units of an item.
    ///
    /// ## Errors
    /// - `Validation` when `qty` is not in 1..=999
    /// - `ItemNotFound` when the owner has no such item
    /// - `InsufficientStock` when fewer than `qty` units are on hand
    pub async fn reserve(
        &self,
        owner_id: &str,
        item_id: &str,
        qty: i64,
    ) -> SalesResult<Reservation> {
        validate_quantity(qty).map_err(CoreError::from)?;

        match self.store.conditional_decrement(owner_id, item_id, qty).await? {
            DecrementOutcome::Applied(item) => {
                debug!(
                    item_id = %item_id,
                    qty = qty,
                    remaining = item.quantity,
                    "Reserved stock"
                );
                Ok(Reservation {
                    item_id: item.id,
                    name: item.name,
                    size: item.size,
                    quantity: qty,
                    remaining: item.quantity,
                })
            }
            DecrementOutcome::Insufficient { name, available } => {
                Err(CoreError::InsufficientStock {
                    item_id: item_id.to_string(),
                    name,
                    available,
                    requested: qty,
                }
                .into())
            }
            DecrementOutcome::Absent => Err(CoreError::ItemNotFound(item_id.to_string()).into()),
        }
    }

    /// Gives `qty` units back. There is no upper bound, so lines recorded
    /// before the per-line limit existed can still be returned.
    ///
    /// ## Errors
    /// - `Validation` when `qty` is not positive
    /// - `ItemNotFound` when the item is gone or belongs to another owner
    pub async fn release(&self, owner_id: &str, item_id: &str, qty: i64) -> SalesResult<()> {
        require_positive(qty)?;

        if !self.store.increment(owner_id, item_id, qty).await? {
            return Err(CoreError::ItemNotFound(item_id.to_string()).into());
        }

        debug!(item_id = %item_id, qty = qty, "Released stock");
        Ok(())
    }

    /// Read-only version of [`reserve`](Self::reserve): same errors, no
    /// mutation.
    ///
    /// `qty` may be the summed demand of several cart lines, so only the
    /// lower bound is enforced.
    pub async fn check_available(
        &self,
        owner_id: &str,
        item_id: &str,
        qty: i64,
    ) -> SalesResult<InventoryItem> {
        require_positive(qty)?;

        let item = self
            .store
            .find_owned_item(owner_id, item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        if !item.can_fulfil(qty) {
            return Err(CoreError::InsufficientStock {
                item_id: item.id,
                name: item.name,
                available: item.quantity,
                requested: qty,
            }
            .into());
        }

        Ok(item)
    }

    /// Looks up one of the owner's items.
    pub async fn find_item(
        &self,
        owner_id: &str,
        item_id: &str,
    ) -> SalesResult<Option<InventoryItem>> {
        Ok(self.store.find_owned_item(owner_id, item_id).await?)
    }

    /// Adds a new item to the owner's catalog with its opening stock.
    pub async fn register_item(
        &self,
        owner_id: &str,
        new_item: NewInventoryItem,
    ) -> SalesResult<InventoryItem> {
        validate_new_item(&new_item).map_err(CoreError::from)?;

        let now = Utc::now();
        let item = InventoryItem {
            id: generate_item_id(),
            owner_id: owner_id.to_string(),
            name: new_item.name.trim().to_string(),
            description: new_item.description,
            size: new_item.size,
            price_cents: new_item.price_cents,
            cost_cents: new_item.cost_cents,
            quantity: new_item.quantity,
            image_url: new_item.image_url,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_item(&item).await?;

        info!(
            item_id = %item.id,
            owner_id = %owner_id,
            name = %item.name,
            size = %item.size,
            quantity = item.quantity,
            "Item registered"
        );
        Ok(item)
    }
}

fn require_positive(qty: i64) -> Result<(), CoreError> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SalesError;
    use stockroom_db::{Database, DbConfig};

    async fn setup() -> InventoryLedger {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        InventoryLedger::new(Arc::new(db.inventory()))
    }

    /// File-backed database with a multi-connection pool, so concurrent
    /// calls run on separate connections.
    async fn setup_pooled(tag: &str) -> (InventoryLedger, Database, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("stockroom-{}-{}.db", tag, generate_item_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        (InventoryLedger::new(Arc::new(db.inventory())), db, path)
    }

    async fn teardown(db: Database, path: std::path::PathBuf) {
        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    fn shirt(quantity: i64) -> NewInventoryItem {
        NewInventoryItem {
            name: "Linen Shirt".to_string(),
            description: Some("Relaxed fit".to_string()),
            size: Size::M,
            price_cents: 89_900,
            cost_cents: 40_000,
            quantity,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_reserve_then_release() {
        let ledger = setup().await;
        let item = ledger.register_item("alice", shirt(5)).await.unwrap();

        let reservation = ledger.reserve("alice", &item.id, 3).await.unwrap();
        assert_eq!(reservation.remaining, 2);
        assert_eq!(reservation.name, "Linen Shirt");
        assert_eq!(reservation.size, Size::M);

        ledger.release("alice", &item.id, 3).await.unwrap();
        let after = ledger.find_item("alice", &item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 5);
    }

    #[tokio::test]
    async fn test_reserve_insufficient_leaves_stock_untouched() {
        let ledger = setup().await;
        let item = ledger.register_item("alice", shirt(2)).await.unwrap();

        match ledger.reserve("alice", &item.id, 3).await {
            Err(SalesError::Domain(CoreError::InsufficientStock {
                item_id,
                name,
                available,
                requested,
            })) => {
                assert_eq!(item_id, item.id);
                assert_eq!(name, "Linen Shirt");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let after = ledger.find_item("alice", &item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 2);
    }

    #[tokio::test]
    async fn test_other_owner_sees_not_found() {
        let ledger = setup().await;
        let item = ledger.register_item("alice", shirt(5)).await.unwrap();

        assert!(ledger
            .reserve("bob", &item.id, 1)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(ledger
            .release("bob", &item.id, 1)
            .await
            .unwrap_err()
            .is_not_found());

        let after = ledger.find_item("alice", &item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 5);
    }

    #[tokio::test]
    async fn test_non_positive_quantities_are_rejected() {
        let ledger = setup().await;
        let item = ledger.register_item("alice", shirt(5)).await.unwrap();

        for qty in [0, -2] {
            assert!(matches!(
                ledger.reserve("alice", &item.id, qty).await,
                Err(SalesError::Domain(CoreError::Validation(_)))
            ));
            assert!(matches!(
                ledger.release("alice", &item.id, qty).await,
                Err(SalesError::Domain(CoreError::Validation(_)))
            ));
        }
    }

    #[tokio::test]
    async fn test_check_available_does_not_mutate() {
        let ledger = setup().await;
        let item = ledger.register_item("alice", shirt(4)).await.unwrap();

        assert!(ledger.check_available("alice", &item.id, 4).await.is_ok());
        assert!(ledger.check_available("alice", &item.id, 5).await.is_err());
        assert!(matches!(
            ledger.check_available("alice", &item.id, 0).await,
            Err(SalesError::Domain(CoreError::Validation(_)))
        ));
        assert!(ledger
            .check_available("alice", "missing", 1)
            .await
            .unwrap_err()
            .is_not_found());

        let after = ledger.find_item("alice", &item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 4);
    }

    #[tokio::test]
    async fn test_register_item_validates() {
        let ledger = setup().await;
        let mut bad = shirt(1);
        bad.name = "   ".to_string();
        assert!(matches!(
            ledger.register_item("alice", bad).await,
            Err(SalesError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_release_has_no_upper_bound() {
        let ledger = setup().await;
        let item = ledger.register_item("alice", shirt(0)).await.unwrap();

        ledger.release("alice", &item.id, 1_500).await.unwrap();
        let after = ledger.find_item("alice", &item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 1_500);

        // Reserving is still capped per line.
        assert!(matches!(
            ledger.reserve("alice", &item.id, 1_000).await,
            Err(SalesError::Domain(CoreError::Validation(_)))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reserves_never_oversell() {
        let (ledger, db, path) = setup_pooled("reserve").await;
        let item = ledger.register_item("alice", shirt(5)).await.unwrap();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let ledger = ledger.clone();
                let item_id = item.id.clone();
                tokio::spawn(async move { ledger.reserve("alice", &item_id, 3).await })
            })
            .collect();

        let mut applied = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => applied += 1,
                Err(SalesError::Domain(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(applied, 1);
        let after = ledger.find_item("alice", &item.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 2);

        teardown(db, path).await;
    }
}
