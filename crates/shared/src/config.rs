//! Application configuration management.
//!
//! Sources are layered in this order (later wins):
//! 1. `config/default.toml`
//! 2. `config/{RUN_MODE}.toml`
//! 3. `KASA__*` environment variables (`KASA__LEDGER__MAX_RETRIES=12`)

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Exchange rate provider settings.
    #[serde(default)]
    pub exchange_rates: ExchangeRateConfig,
    /// Maintenance surface settings.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
///
/// Without a `url` the server runs on the in-memory store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on startup.
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            run_migrations: false,
        }
    }
}

/// Ledger behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Optimistic-concurrency retries before `CONCURRENT_UPDATE_CONFLICT`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff between retries, in milliseconds. Jitter is added on top.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Allow debits to drive a balance slot below zero.
    #[serde(default)]
    pub allow_negative_balance: bool,
    /// Currencies accounts may be opened in.
    #[serde(default = "default_currencies")]
    pub currencies: Vec<Currency>,
    /// Prefix of generated transaction numbers.
    #[serde(default = "default_transaction_number_prefix")]
    pub transaction_number_prefix: String,
}

fn default_max_retries() -> u32 {
    8
}

fn default_retry_backoff_ms() -> u64 {
    5
}

fn default_currencies() -> Vec<Currency> {
    Currency::ALL.to_vec()
}

fn default_transaction_number_prefix() -> String {
    "TRX".to_string()
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            allow_negative_balance: false,
            currencies: default_currencies(),
            transaction_number_prefix: default_transaction_number_prefix(),
        }
    }
}

/// Exchange rate provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRateConfig {
    /// Base URL of the upstream rate API. No URL means cached/manual rates only.
    #[serde(default)]
    pub upstream_url: Option<String>,
    /// Seconds a cached rate is considered fresh.
    #[serde(default = "default_rate_ttl")]
    pub ttl_secs: u64,
    /// Seconds a stale rate may still be served while upstream is down.
    #[serde(default = "default_rate_max_stale")]
    pub max_stale_secs: u64,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_rate_timeout")]
    pub request_timeout_secs: u64,
}

fn default_rate_ttl() -> u64 {
    3600 // 1 hour
}

fn default_rate_max_stale() -> u64 {
    86400 // 1 day
}

fn default_rate_timeout() -> u64 {
    10
}

impl Default for ExchangeRateConfig {
    fn default() -> Self {
        Self {
            upstream_url: None,
            ttl_secs: default_rate_ttl(),
            max_stale_secs: default_rate_max_stale(),
            request_timeout_secs: default_rate_timeout(),
        }
    }
}

/// Maintenance surface settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Lifetime of a destructive-operation confirmation token, in seconds.
    #[serde(default = "default_confirmation_ttl")]
    pub confirmation_ttl_secs: u64,
}

fn default_confirmation_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            confirmation_ttl_secs: default_confirmation_ttl(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "kasa_server=info,kasa_db=info,kasa_api=info,tower_http=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("KASA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints `serde` cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Invalid` describing the first violation.
    pub fn validate(&self) -> AppResult<()> {
        if self.ledger.currencies.is_empty() {
            return Err(AppError::Invalid(
                "ledger.currencies must list at least one currency".to_string(),
            ));
        }
        let prefix = &self.ledger.transaction_number_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::Invalid(format!(
                "ledger.transaction_number_prefix must be non-empty ASCII alphanumeric, got '{prefix}'"
            )));
        }
        if self.exchange_rates.ttl_secs == 0 {
            return Err(AppError::Invalid(
                "exchange_rates.ttl_secs must be positive".to_string(),
            ));
        }
        if self.exchange_rates.max_stale_secs < self.exchange_rates.ttl_secs {
            return Err(AppError::Invalid(
                "exchange_rates.max_stale_secs must not be shorter than ttl_secs".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.max_retries, 8);
        assert!(!config.ledger.allow_negative_balance);
        assert_eq!(config.ledger.currencies.len(), Currency::ALL.len());
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_currencies() {
        let mut config = AppConfig::default();
        config.ledger.currencies.clear();
        assert!(matches!(
            config.validate(),
            Err(AppError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let mut config = AppConfig::default();
        config.ledger.transaction_number_prefix = "TR-X".to_string();
        assert!(config.validate().is_err());

        config.ledger.transaction_number_prefix = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_stale_window_shorter_than_ttl() {
        let mut config = AppConfig::default();
        config.exchange_rates.ttl_secs = 600;
        config.exchange_rates.max_stale_secs = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_reads_environment_overrides() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test")),
                ("KASA__LEDGER__MAX_RETRIES", Some("3")),
                ("KASA__LEDGER__ALLOW_NEGATIVE_BALANCE", Some("true")),
                ("KASA__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.max_retries, 3);
                assert!(config.ledger.allow_negative_balance);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.ledger.transaction_number_prefix, "TRX");
            },
        );
    }
}
