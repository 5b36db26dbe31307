//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SalesError::Storage (stockroom-sales)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller reports it as a storage failure                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - A row read back right after a write has vanished
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Re-inserting an item or sale with an existing id
    /// - Duplicate line position within a sale
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation {
        field: String,
        value: String,
    },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a line for a sale_id that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
    },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration version conflict
    /// - Schema incompatibility
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - An update would push `quantity` below zero
    /// - Negative price, cost or discount slipped past validation
    #[error("Check constraint failed: {constraint}")]
    CheckViolation { constraint: String },

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be mapped back to a domain type.
    ///
    /// ## When This Occurs
    /// - Unknown size label in `sale_line_items.size`
    #[error("Corrupt {column} value: '{value}'")]
    CorruptValue { column: String, value: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a CorruptValue error.
    pub fn corrupt(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::CorruptValue {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → constraint kind from the SQLite message
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// SQLite reports constraint failures as
/// `"<KIND> constraint failed: <table>.<column>"`.
fn from_sqlite_message(msg: &str) -> DbError {
    let detail = |prefix: &str| {
        msg.split(prefix)
            .nth(1)
            .unwrap_or("unknown")
            .trim()
            .to_string()
    };

    if msg.contains("UNIQUE constraint failed") {
        DbError::UniqueViolation {
            field: detail("UNIQUE constraint failed:"),
            value: "unknown".to_string(),
        }
    } else if msg.contains("FOREIGN KEY constraint failed") {
        DbError::ForeignKeyViolation {
            message: msg.to_string(),
        }
    } else if msg.contains("CHECK constraint failed") {
        DbError::CheckViolation {
            constraint: detail("CHECK constraint failed:"),
        }
    } else {
        DbError::QueryFailed(msg.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_sqlite_constraint_messages() {
        assert!(matches!(
            from_sqlite_message("UNIQUE constraint failed: sales.id"),
            DbError::UniqueViolation { ref field, .. } if field == "sales.id"
        ));
        assert!(matches!(
            from_sqlite_message("CHECK constraint failed: quantity >= 0"),
            DbError::CheckViolation { ref constraint } if constraint == "quantity >= 0"
        ));
        assert!(matches!(
            from_sqlite_message("FOREIGN KEY constraint failed"),
            DbError::ForeignKeyViolation { .. }
        ));
        assert!(matches!(
            from_sqlite_message("no such table: nope"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_helper_messages() {
        assert_eq!(
            DbError::not_found("Sale", "abc").to_string(),
            "Sale not found: abc"
        );
        assert_eq!(
            DbError::corrupt("size", "XXXXL").to_string(),
            "Corrupt size value: 'XXXXL'"
        );
    }
}
