//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
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

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Tolerance used when comparing supposed vs actual remittance.
    #[serde(default = "default_reconcile_epsilon")]
    pub reconcile_epsilon: Decimal,
    /// Zero-pad width for generated official receipt numbers.
    #[serde(default = "default_receipt_pad_width")]
    pub receipt_pad_width: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reconcile_epsilon: default_reconcile_epsilon(),
            receipt_pad_width: default_receipt_pad_width(),
        }
    }
}

fn default_reconcile_epsilon() -> Decimal {
    // One centavo: decimal totals only diverge by rounding of cash counts.
    Decimal::new(1, 2)
}

fn default_receipt_pad_width() -> usize {
    7
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COOPRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_config_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.reconcile_epsilon, dec!(0.01));
        assert_eq!(ledger.receipt_pad_width, 7);
    }

    #[test]
    fn test_connection_defaults() {
        assert_eq!(default_max_connections(), 10);
        assert_eq!(default_min_connections(), 1);
    }
}
