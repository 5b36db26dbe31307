//! # Sales Configuration
//!
//! Configuration for the sales service: where the database lives, which
//! reservation strategy the coordinator uses, and the log filter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKROOM_DATABASE_PATH=/srv/stockroom.db                          │
//! │     STOCKROOM_MAX_CONNECTIONS=8                                        │
//! │     STOCKROOM_RESERVATION_STRATEGY=two_phase                           │
//! │     STOCKROOM_LOG=debug,sqlx=warn                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, or                                                  │
//! │     ~/.config/stockroom/stockroom.toml (Linux)                         │
//! │     ~/Library/Application Support/com.stockroom.stockroom/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/stockroom/stockroom.db"
//! max_connections = 5
//!
//! [sales]
//! reservation_strategy = "best_effort_sequential"  # or "two_phase"
//!
//! [logging]
//! filter = "info,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use stockroom_db::DbConfig;

use crate::error::ConfigError;

pub const ENV_DATABASE_PATH: &str = "STOCKROOM_DATABASE_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "STOCKROOM_MAX_CONNECTIONS";
pub const ENV_RESERVATION_STRATEGY: &str = "STOCKROOM_RESERVATION_STRATEGY";
pub const ENV_LOG: &str = "STOCKROOM_LOG";

// =============================================================================
// Reservation Strategy
// =============================================================================

/// How `create_sale` reserves stock for a multi-line cart.
///
/// ## Strategy Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: [Shirt × 2, Jeans × 1, Cap × 9]   (only 3 caps on hand)          │
/// │                                                                         │
/// │  BEST_EFFORT_SEQUENTIAL (Default)   │  TWO_PHASE                        │
/// │  ────────────────────────────────   │  ─────────────────────────        │
/// │  reserve Shirt × 2  ✓               │  check Shirt, Jeans, Cap          │
/// │  reserve Jeans × 1  ✓               │  Cap: 3 < 9 → InsufficientStock   │
/// │  reserve Cap × 9    ✗ → error       │  nothing was touched              │
/// │                                     │                                   │
/// │  Shirt and Jeans stay decremented.  │  If a reserve still loses a race, │
/// │  A warning is logged.               │  every applied line is released.  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStrategy {
    /// Reserve line by line and stop at the first failure, leaving earlier
    /// lines applied.
    #[default]
    BestEffortSequential,

    /// Check every line first, then reserve; release applied lines if
    /// anything fails afterwards.
    TwoPhase,
}

impl std::fmt::Display for ReservationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationStrategy::BestEffortSequential => write!(f, "best_effort_sequential"),
            ReservationStrategy::TwoPhase => write!(f, "two_phase"),
        }
    }
}

impl std::str::FromStr for ReservationStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "best_effort_sequential" | "sequential" => Ok(ReservationStrategy::BestEffortSequential),
            "two_phase" => Ok(ReservationStrategy::TwoPhase),
            other => Err(ConfigError::Invalid(format!(
                "Unknown reservation strategy: '{}'. Valid options: best_effort_sequential, two_phase",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Pool size.
    /// Default: 5
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "stockroom", "stockroom")
        .map(|dirs| dirs.data_dir().join("stockroom.db"))
        .unwrap_or_else(|| PathBuf::from("stockroom.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[sales]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesSettings {
    #[serde(default)]
    pub reservation_strategy: ReservationStrategy,
}

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives.
    /// Default: "info,sqlx=warn"
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

impl LoggingSettings {
    /// Installs a `fmt` subscriber with this filter.
    ///
    /// A second call in the same process leaves the first subscriber in place.
    pub fn init_tracing(&self) -> Result<(), ConfigError> {
        let filter = EnvFilter::try_new(&self.filter)
            .map_err(|e| ConfigError::Invalid(format!("log filter '{}': {}", self.filter, e)))?;

        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_err()
        {
            debug!("Tracing subscriber already installed");
        }
        Ok(())
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete sales service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub sales: SalesSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl SalesConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform `stockroom.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections fall back to defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Config for an isolated in-memory database (tests, demos).
    pub fn in_memory() -> Self {
        SalesConfig {
            database: DatabaseSettings {
                path: PathBuf::from(":memory:"),
                max_connections: 1,
            },
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must not be empty".into()));
        }

        Ok(())
    }

    /// Pool settings for [`stockroom_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        if self.database.path.as_os_str() == ":memory:" {
            return DbConfig::in_memory();
        }
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable values are logged
    /// and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid {}", ENV_MAX_CONNECTIONS),
            }
        }

        if let Some(strategy) = lookup(ENV_RESERVATION_STRATEGY) {
            match strategy.parse() {
                Ok(parsed) => {
                    debug!(strategy = %strategy, "Overriding reservation strategy from environment");
                    self.sales.reservation_strategy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring {}", ENV_RESERVATION_STRATEGY),
            }
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "stockroom")
            .map(|dirs| dirs.config_dir().join("stockroom.toml"))
    }

    pub fn reservation_strategy(&self) -> ReservationStrategy {
        self.sales.reservation_strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "best_effort_sequential".parse::<ReservationStrategy>().unwrap(),
            ReservationStrategy::BestEffortSequential
        );
        assert_eq!(
            "Two-Phase".parse::<ReservationStrategy>().unwrap(),
            ReservationStrategy::TwoPhase
        );
        assert!("optimistic".parse::<ReservationStrategy>().is_err());
        assert_eq!(ReservationStrategy::TwoPhase.to_string(), "two_phase");
    }

    #[test]
    fn test_default_config() {
        let config = SalesConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(
            config.reservation_strategy(),
            ReservationStrategy::BestEffortSequential
        );
        assert!(config.database.path.ends_with("stockroom.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SalesConfig::from_toml_str(
            r#"
            [sales]
            reservation_strategy = "two_phase"
            "#,
        )
        .unwrap();
        assert_eq!(config.reservation_strategy(), ReservationStrategy::TwoPhase);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, "info,sqlx=warn");

        assert!(matches!(
            SalesConfig::from_toml_str("[sales]\nreservation_strategy = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DATABASE_PATH, "/tmp/override.db"),
            (ENV_MAX_CONNECTIONS, "not-a-number"),
            (ENV_RESERVATION_STRATEGY, "two_phase"),
            (ENV_LOG, "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = SalesConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/override.db"));
        // Invalid value ignored.
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.reservation_strategy(), ReservationStrategy::TwoPhase);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_validation() {
        let mut config = SalesConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = SalesConfig::default();
        config.logging.filter = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_config() {
        assert!(SalesConfig::in_memory().db_config().is_in_memory());

        let mut config = SalesConfig::default();
        config.database.path = PathBuf::from("/tmp/shop.db");
        config.database.max_connections = 3;
        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(db.max_connections, 3);
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&SalesConfig::default()).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("reservation_strategy = \"best_effort_sequential\""));
    }
}
