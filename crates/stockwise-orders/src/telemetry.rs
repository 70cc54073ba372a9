//! Logging setup.
//!
//! ## Filter Precedence
//! ```text
//! STOCKWISE_LOG  →  RUST_LOG  →  "info,stockwise=debug,sqlx=warn"
//! ```
//!
//! `local` writes human-readable lines; `dev` and `prod` write JSON lines.

use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Environment};

/// Filter used when neither `STOCKWISE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info,stockwise=debug,sqlx=warn";

/// Builds the filter for `config`.
///
/// `log_filter` was already checked by [`AppConfig::from_lookup`]; an
/// unparseable `RUST_LOG` falls back to the default.
pub fn env_filter(config: &AppConfig) -> EnvFilter {
    config
        .log_filter
        .as_deref()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Call once at startup.
///
/// A second call (or a subscriber installed by someone else) is ignored.
pub fn init_tracing(config: &AppConfig) {
    let filter = env_filter(config);

    let installed = match config.environment {
        Environment::Local => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        Environment::Dev | Environment::Prod => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(environment = %config.environment, "Tracing initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_filter_wins() {
        let config = AppConfig::from_lookup(|name| match name {
            "STOCKWISE_LOG" => Some("warn".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(
            env_filter(&config).to_string(),
            EnvFilter::new("warn").to_string()
        );
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        init_tracing(&config);
        init_tracing(&config);
    }
}
