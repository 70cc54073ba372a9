//! Order service configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use stockwise_db::DbConfig;
use tracing_subscriber::EnvFilter;

/// Deployment environment. Selects the log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Environment::Local),
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Local => "local",
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        })
    }
}

/// Order service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (`STOCKWISE_ENV`)
    pub environment: Environment,

    /// SQLite file (`STOCKWISE_DB_PATH`)
    pub database_path: PathBuf,

    /// Pool size (`STOCKWISE_DB_MAX_CONNECTIONS`)
    pub db_max_connections: u32,

    /// Pool acquire timeout in seconds (`STOCKWISE_DB_CONNECT_TIMEOUT_SECS`)
    pub db_connect_timeout_secs: u64,

    /// Return line quantities to stock on refund (`STOCKWISE_RESTOCK_ON_REFUND`)
    pub restock_on_refund: bool,

    /// Tracing filter override (`STOCKWISE_LOG`)
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            environment: parse_var(&lookup, "STOCKWISE_ENV", "local")?,

            database_path: lookup("STOCKWISE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./stockwise.db")),

            db_max_connections: parse_var(&lookup, "STOCKWISE_DB_MAX_CONNECTIONS", "5")?,

            db_connect_timeout_secs: parse_var(&lookup, "STOCKWISE_DB_CONNECT_TIMEOUT_SECS", "30")?,

            restock_on_refund: match lookup("STOCKWISE_RESTOCK_ON_REFUND") {
                None => false,
                Some(raw) => parse_bool(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue("STOCKWISE_RESTOCK_ON_REFUND".to_string()))?,
            },

            log_filter: match lookup("STOCKWISE_LOG").filter(|f| !f.trim().is_empty()) {
                None => None,
                Some(directives) => {
                    EnvFilter::try_new(&directives)
                        .map_err(|_| ConfigError::InvalidValue("STOCKWISE_LOG".to_string()))?;
                    Some(directives)
                }
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "STOCKWISE_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.db_max_connections)
            .acquire_timeout(Duration::from_secs(self.db_connect_timeout_secs))
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use stockwise_db::DbLocation;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.database_path, PathBuf::from("./stockwise.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.db_connect_timeout_secs, 30);
        assert!(!config.restock_on_refund);
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("STOCKWISE_ENV", "PROD"),
            ("STOCKWISE_DB_PATH", "/var/lib/stockwise/data.db"),
            ("STOCKWISE_DB_MAX_CONNECTIONS", "12"),
            ("STOCKWISE_RESTOCK_ON_REFUND", "true"),
            ("STOCKWISE_LOG", "debug"),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Prod);
        assert!(config.restock_on_refund);
        assert_eq!(config.log_filter.as_deref(), Some("debug"));

        let config = config_from(&[("STOCKWISE_LOG", "info,stockwise_db=trace,sqlx=warn")]).unwrap();
        assert!(config.log_filter.is_some());

        let db = config.db_config();
        assert_eq!(db.max_connections, 12);
        assert_eq!(
            db.location,
            DbLocation::File(PathBuf::from("/var/lib/stockwise/data.db"))
        );
        assert_eq!(db.acquire_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [
            ("STOCKWISE_ENV", "staging"),
            ("STOCKWISE_DB_MAX_CONNECTIONS", "lots"),
            ("STOCKWISE_DB_MAX_CONNECTIONS", "0"),
            ("STOCKWISE_DB_CONNECT_TIMEOUT_SECS", "-1"),
            ("STOCKWISE_RESTOCK_ON_REFUND", "maybe"),
            ("STOCKWISE_LOG", "stockwise=loudest"),
        ] {
            match config_from(&[(name, value)]) {
                Err(ConfigError::InvalidValue(var)) => assert_eq!(var, name),
                Ok(_) => panic!("{name}={value} should be rejected"),
            }
        }
    }
}
