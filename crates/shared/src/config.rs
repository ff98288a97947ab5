//! Application configuration management.

use serde::Deserialize;

use crate::types::CategoryId;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Statistics report configuration.
    #[serde(default)]
    pub statistics: StatisticsConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info,spendwise_core=debug,spendwise_db=debug,sea_orm=warn".to_string()
}

/// Statistics report configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsConfig {
    /// Payment method whose share of expenses is reported.
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    /// Category whose share of expenses is reported, if any.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            payment_method: default_payment_method(),
            category_id: None,
        }
    }
}

fn default_payment_method() -> String {
    "credit card".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `SPENDWISE__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SPENDWISE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("SPENDWISE__DATABASE__URL", Some("postgres://localhost/spendwise")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/spendwise");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(
                    config.logging.filter,
                    "info,spendwise_core=debug,spendwise_db=debug,sea_orm=warn"
                );
                assert_eq!(config.statistics.payment_method, "credit card");
                assert!(config.statistics.category_id.is_none());
            },
        );
    }

    #[test]
    fn test_environment_overrides_statistics_section() {
        temp_env::with_vars(
            [
                ("SPENDWISE__DATABASE__URL", Some("postgres://localhost/spendwise")),
                ("SPENDWISE__STATISTICS__PAYMENT_METHOD", Some("debit card")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.statistics.payment_method, "debit card");
            },
        );
    }

    #[test]
    fn test_missing_database_url_is_an_error() {
        temp_env::with_vars(
            [
                ("SPENDWISE__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
