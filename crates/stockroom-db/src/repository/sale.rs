//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. RECORD                                                             │
//! │     └── insert() → sales row + sale_line_items rows                    │
//! │         (one transaction: header and lines land together)              │
//! │                                                                         │
//! │  2. (OPTIONAL) VOID                                                    │
//! │     └── conditional_void() → voided_at set                             │
//! │         WHERE voided_at IS NULL, so only one caller ever wins          │
//! │                                                                         │
//! │  Lines are never updated after step 1.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The nullable `voided_at` column becomes [`SaleState`] at this boundary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{DateRange, PaymentMethod, Sale, SaleLineItem, SaleState, Size};

/// Result of a conditional void.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoidOutcome {
    /// This call set `voided_at`.
    Matched,
    /// Sale missing, another owner's, or already voided.
    NotMatched,
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    owner_id: String,
    sale_date: DateTime<Utc>,
    subtotal_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    payment_method: PaymentMethod,
    customer_name: Option<String>,
    customer_contact: Option<String>,
    notes: Option<String>,
    voided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self, lines: Vec<SaleLineItem>) -> Sale {
        Sale {
            id: self.id,
            owner_id: self.owner_id,
            sale_date: self.sale_date,
            lines,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            payment_method: self.payment_method,
            customer_name: self.customer_name,
            customer_contact: self.customer_contact,
            notes: self.notes,
            state: SaleState::from_voided_at(self.voided_at),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    sale_id: String,
    item_id: String,
    name: String,
    size: Option<String>,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
}

impl LineRow {
    fn into_line(self) -> DbResult<SaleLineItem> {
        let size = match self.size {
            Some(label) => Some(
                label
                    .parse::<Size>()
                    .map_err(|_| DbError::corrupt("sale_line_items.size", label))?,
            ),
            None => None,
        };

        Ok(SaleLineItem {
            item_id: self.item_id,
            name: self.name,
            size,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            line_total_cents: self.line_total_cents,
        })
    }
}

const SALE_COLUMNS: &str = r#"
    s.id, s.owner_id, s.sale_date,
    s.subtotal_cents, s.discount_cents, s.total_cents,
    s.payment_method, s.customer_name, s.customer_contact, s.notes,
    s.voided_at, s.created_at, s.updated_at
"#;

const LINE_COLUMNS: &str = r#"
    l.sale_id, l.item_id, l.name, l.size,
    l.quantity, l.unit_price_cents, l.line_total_cents
"#;

/// Owner, optional inclusive bounds, optional active-only.
/// Bound as ?1 owner, ?2 start, ?3 end, ?4 active_only.
const SALE_FILTER: &str = r#"
    s.owner_id = ?1
    AND (?2 IS NULL OR s.sale_date >= ?2)
    AND (?3 IS NULL OR s.sale_date <= ?3)
    AND (?4 = 0 OR s.voided_at IS NULL)
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a sale with its lines in one transaction.
    ///
    /// ## Snapshot Pattern
    /// Lines carry the item name, size and unit price as they were at the
    /// time of sale; `item_id` has no foreign key, so deleting an item
    /// leaves its sales readable.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(
            id = %sale.id,
            owner_id = %sale.owner_id,
            lines = sale.lines.len(),
            total_cents = sale.total_cents,
            "Inserting sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, owner_id, sale_date,
                subtotal_cents, discount_cents, total_cents,
                payment_method, customer_name, customer_contact, notes,
                voided_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.owner_id)
        .bind(sale.sale_date)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(&sale.customer_name)
        .bind(&sale.customer_contact)
        .bind(&sale.notes)
        .bind(sale.state.voided_at())
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in sale.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_line_items (
                    sale_id, position, item_id, name, size,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&sale.id)
            .bind(position as i64)
            .bind(&line.item_id)
            .bind(&line.name)
            .bind(line.size.map(|size| size.as_str()))
            .bind(line.quantity)
            .bind(line.unit_price_cents)
            .bind(line.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets a sale by ID, scoped to its owner.
    pub async fn find_owned(&self, owner_id: &str, id: &str) -> DbResult<Option<Sale>> {
        debug!(id = %id, owner_id = %owner_id, "Fetching sale");

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales s WHERE s.id = ?1 AND s.owner_id = ?2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, LineRow>(&format!(
            "SELECT {LINE_COLUMNS} FROM sale_line_items l WHERE l.sale_id = ?1 ORDER BY l.position"
        ))
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(LineRow::into_line)
        .collect::<DbResult<Vec<_>>>()?;

        Ok(Some(row.into_sale(lines)))
    }

    /// Sets `voided_at` if, and only if, the sale is still active.
    ///
    /// ```text
    /// UPDATE sales SET voided_at = ?
    ///  WHERE id = ? AND owner_id = ? AND voided_at IS NULL
    /// ```
    pub async fn conditional_void(
        &self,
        owner_id: &str,
        id: &str,
        at: DateTime<Utc>,
    ) -> DbResult<VoidOutcome> {
        debug!(id = %id, owner_id = %owner_id, "Conditionally voiding sale");

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET
                voided_at = ?3,
                updated_at = ?3
            WHERE id = ?1 AND owner_id = ?2 AND voided_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(if result.rows_affected() > 0 {
            VoidOutcome::Matched
        } else {
            VoidOutcome::NotMatched
        })
    }

    /// Lists an owner's sales in `range`, newest first.
    ///
    /// Lines for every matched sale come back in a single second query.
    pub async fn query(
        &self,
        owner_id: &str,
        range: &DateRange,
        active_only: bool,
    ) -> DbResult<Vec<Sale>> {
        debug!(
            owner_id = %owner_id,
            start = ?range.start,
            end = ?range.end,
            active_only = active_only,
            "Querying sales"
        );

        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales s WHERE {SALE_FILTER} ORDER BY s.sale_date DESC, s.id"
        ))
        .bind(owner_id)
        .bind(range.start)
        .bind(range.end)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let line_rows = sqlx::query_as::<_, LineRow>(&format!(
            r#"
            SELECT {LINE_COLUMNS}
            FROM sale_line_items l
            JOIN sales s ON s.id = l.sale_id
            WHERE {SALE_FILTER}
            ORDER BY l.sale_id, l.position
            "#
        ))
        .bind(owner_id)
        .bind(range.start)
        .bind(range.end)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_sale: HashMap<String, Vec<SaleLineItem>> = HashMap::new();
        for row in line_rows {
            let sale_id = row.sale_id.clone();
            lines_by_sale
                .entry(sale_id)
                .or_default()
                .push(row.into_line()?);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let lines = lines_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(lines)
            })
            .collect())
    }
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};

    async fn setup() -> SaleRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().sales()
    }

    fn sale(owner_id: &str, sale_date: DateTime<Utc>, lines: Vec<SaleLineItem>) -> Sale {
        let subtotal_cents = lines.iter().map(|l| l.line_total_cents).sum();
        Sale {
            id: generate_sale_id(),
            owner_id: owner_id.to_string(),
            sale_date,
            lines,
            subtotal_cents,
            discount_cents: 0,
            total_cents: subtotal_cents,
            payment_method: PaymentMethod::Gcash,
            customer_name: Some("Maria".to_string()),
            customer_contact: None,
            notes: None,
            state: SaleState::Active,
            created_at: sale_date,
            updated_at: sale_date,
        }
    }

    fn line(name: &str, size: Option<Size>, quantity: i64) -> SaleLineItem {
        SaleLineItem {
            item_id: format!("item-{name}"),
            name: name.to_string(),
            size,
            quantity,
            unit_price_cents: 1_000,
            line_total_cents: quantity * 1_000,
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, d, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_round_trip() {
        let repo = setup().await;
        let recorded = sale(
            "alice",
            day(1),
            vec![line("Tee", Some(Size::S), 2), line("Old Stock", None, 1)],
        );
        repo.insert(&recorded).await.unwrap();

        let found = repo.find_owned("alice", &recorded.id).await.unwrap().unwrap();
        assert_eq!(found.lines, recorded.lines);
        assert_eq!(found.sale_date, recorded.sale_date);
        assert_eq!(found.payment_method, PaymentMethod::Gcash);
        assert_eq!(found.customer_name.as_deref(), Some("Maria"));
        assert!(found.is_active());

        assert!(repo.find_owned("bob", &recorded.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conditional_void_matches_once() {
        let repo = setup().await;
        let recorded = sale("alice", day(1), vec![line("Tee", Some(Size::S), 1)]);
        repo.insert(&recorded).await.unwrap();

        let at = day(2);
        assert_eq!(
            repo.conditional_void("bob", &recorded.id, at).await.unwrap(),
            VoidOutcome::NotMatched
        );
        assert_eq!(
            repo.conditional_void("alice", &recorded.id, at).await.unwrap(),
            VoidOutcome::Matched
        );
        assert_eq!(
            repo.conditional_void("alice", &recorded.id, at + Duration::hours(1))
                .await
                .unwrap(),
            VoidOutcome::NotMatched
        );

        let found = repo.find_owned("alice", &recorded.id).await.unwrap().unwrap();
        assert_eq!(found.state, SaleState::Voided { at });
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let repo = setup().await;
        let first = sale("alice", day(1), vec![line("Tee", Some(Size::S), 1)]);
        let second = sale("alice", day(5), vec![line("Jeans", Some(Size::L), 2)]);
        let third = sale("alice", day(9), vec![line("Cap", None, 3)]);
        let other_owner = sale("bob", day(5), vec![line("Tee", Some(Size::S), 1)]);
        for s in [&first, &second, &third, &other_owner] {
            repo.insert(s).await.unwrap();
        }
        repo.conditional_void("alice", &third.id, day(10)).await.unwrap();

        let all = repo.query("alice", &DateRange::all(), false).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);
        assert_eq!(all[1].lines, second.lines);

        let active = repo.query("alice", &DateRange::all(), true).await.unwrap();
        assert_eq!(active.len(), 2);

        // Bounds are inclusive.
        let window = DateRange::between(day(1), day(5));
        let in_window = repo.query("alice", &window, false).await.unwrap();
        assert_eq!(in_window.len(), 2);

        let empty = repo
            .query("alice", &DateRange::between(day(20), day(21)), false)
            .await
            .unwrap();
        assert!(empty.is_empty());
    }
}
