//! # Inventory Repository
//!
//! Database operations for an owner's garment catalog.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, check, write back (two sales both see 5 in stock)     │
//! │     SELECT quantity ...            → 5                                  │
//! │     UPDATE ... SET quantity = 2                                         │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional delta update                              │
//! │     UPDATE inventory_items                                              │
//! │        SET quantity = quantity - 3                                      │
//! │      WHERE id = ? AND owner_id = ? AND quantity >= 3                    │
//! │      RETURNING *                                                        │
//! │                                                                         │
//! │  Sale A: reserve 3 of 5 → row returned, 2 left                          │
//! │  Sale B: reserve 3 of 5 → no row (only 2 left) → Insufficient          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is scoped by `owner_id`. Another owner's item looks exactly
//! like a missing one.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use stockroom_core::InventoryItem;

const ITEM_COLUMNS: &str = r#"
    id, owner_id, name, description, size,
    price_cents, cost_cents, quantity, image_url,
    created_at, updated_at
"#;

/// Result of a conditional decrement.
#[derive(Debug, Clone)]
pub enum DecrementOutcome {
    /// Stock was taken. Carries the item as it is after the update.
    Applied(InventoryItem),
    /// The item exists for this owner but has fewer units than requested.
    Insufficient { name: String, available: i64 },
    /// No such item for this owner.
    Absent,
}

/// Repository for inventory item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InventoryRepository::new(pool);
///
/// repo.insert(&item).await?;
/// match repo.conditional_decrement("owner-1", &item.id, 2).await? {
///     DecrementOutcome::Applied(item) => println!("{} left", item.quantity),
///     DecrementOutcome::Insufficient { available, .. } => { /* ... */ }
///     DecrementOutcome::Absent => { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Inserts a new item.
    pub async fn insert(&self, item: &InventoryItem) -> DbResult<()> {
        debug!(id = %item.id, owner_id = %item.owner_id, name = %item.name, "Inserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (
                id, owner_id, name, description, size,
                price_cents, cost_cents, quantity, image_url,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11
            )
            "#,
        )
        .bind(&item.id)
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.size)
        .bind(item.price_cents)
        .bind(item.cost_cents)
        .bind(item.quantity)
        .bind(&item.image_url)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an item by ID, scoped to its owner.
    pub async fn find_owned(&self, owner_id: &str, id: &str) -> DbResult<Option<InventoryItem>> {
        debug!(id = %id, owner_id = %owner_id, "Fetching inventory item");

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Takes `qty` units if at least that many are on hand.
    ///
    /// The check and the decrement are one statement, so two concurrent
    /// calls can never both succeed against stock that only covers one.
    pub async fn conditional_decrement(
        &self,
        owner_id: &str,
        id: &str,
        qty: i64,
    ) -> DbResult<DecrementOutcome> {
        debug!(id = %id, owner_id = %owner_id, qty = qty, "Conditionally decrementing stock");

        let updated = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory_items
            SET
                quantity = quantity - ?3,
                updated_at = ?4
            WHERE id = ?1 AND owner_id = ?2 AND quantity >= ?3
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(qty)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(item) = updated {
            return Ok(DecrementOutcome::Applied(item));
        }

        // Nothing matched: tell "too few units" apart from "no such item".
        let current: Option<(String, i64)> = sqlx::query_as(
            "SELECT name, quantity FROM inventory_items WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match current {
            Some((name, available)) => DecrementOutcome::Insufficient { name, available },
            None => DecrementOutcome::Absent,
        })
    }

    /// Adds `qty` units back. No upper bound.
    ///
    /// ## Returns
    /// `false` when no item matched (deleted, or another owner's).
    pub async fn increment(&self, owner_id: &str, id: &str, qty: i64) -> DbResult<bool> {
        debug!(id = %id, owner_id = %owner_id, qty = qty, "Incrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET
                quantity = quantity + ?3,
                updated_at = ?4
            WHERE id = ?1 AND owner_id = ?2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(qty)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an item outright.
    ///
    /// Sales keep their frozen name and price for the item; voiding such
    /// a sale skips its stock release.
    pub async fn delete(&self, owner_id: &str, id: &str) -> DbResult<bool> {
        debug!(id = %id, owner_id = %owner_id, "Deleting inventory item");

        let result = sqlx::query("DELETE FROM inventory_items WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Generates a new inventory item ID.
pub fn generate_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
