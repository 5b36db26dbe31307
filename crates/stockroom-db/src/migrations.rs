//! # Database Migrations
//!
//! Embedded SQL migrations for Stockroom.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  Database::new()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Check _sqlx_migrations table (created on first run)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare embedded migrations vs applied                                │
//! │       │                                                                 │
//! │       └── 001_initial_schema.sql   inventory_items, sales,            │
//! │                                    sale_line_items                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Run pending migrations in order, record each one                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_item_sku.sql`)
//! 3. **NEVER** modify an applied migration, add a new one instead

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Embedded migrations from the workspace `migrations/sqlite` directory.
///
/// `sqlx::migrate!()` embeds the SQL files into the binary at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent: already-applied migrations are skipped by checksum.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(
        embedded = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Migration counts for diagnostics.
///
/// ## Returns
/// Tuple of (embedded_migrations, applied_migrations). A database that
/// was never migrated reports zero applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = match sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
    {
        Ok(count) => count,
        Err(err) => {
            debug!(error = %err, "No migration table yet");
            0
        }
    };

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================
