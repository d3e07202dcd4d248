use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use validator::Validate;

use crate::error::{StockboardError, StockboardResult};
use crate::inventory::NormalizerConfig;
use crate::validation::validate_model;

/// Low-stock threshold shipped with the default configuration.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Stock workbook read at startup and on reload.
    pub data_file: PathBuf,
    /// Serve the placeholder dataset when a load fails.
    pub fallback_to_placeholder: bool,
    pub ranking_limit: usize,
    /// Extensions accepted by the upload endpoint.
    pub allowed_extensions: Vec<String>,
    pub normalizer: NormalizerConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Local overrides (gitignored)
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("STOCKBOARD").separator("__"));

        config.build()?.try_deserialize()
    }

    /// Reject configurations the normalizer cannot work with.
    pub fn validate(&self) -> StockboardResult<()> {
        validate_model(&self.inventory.normalizer)?;
        if self.inventory.ranking_limit == 0 {
            return Err(StockboardError::validation(
                "inventory.ranking_limit",
                "Ranking limit must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                max_request_size: 16 * 1024 * 1024, // 16MB
                timeout_seconds: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_path: None,
            },
            inventory: InventoryConfig {
                data_file: PathBuf::from("data.xlsx"),
                fallback_to_placeholder: true,
                ranking_limit: crate::inventory::DEFAULT_RANKING_LIMIT,
                allowed_extensions: vec!["xlsx".to_string(), "xls".to_string(), "csv".to_string()],
                normalizer: NormalizerConfig::spreadsheet_layout(DEFAULT_LOW_STOCK_THRESHOLD),
            },
        }
    }
}

impl InventoryConfig {
    pub fn allowed_extensions(&self) -> Vec<&str> {
        self.allowed_extensions.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.inventory.normalizer.low_stock_threshold, 1000);
        assert_eq!(config.inventory.normalizer.skip_rows, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AppConfig::default();
        config.inventory.normalizer.default_unit = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.inventory.ranking_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_toml_source() {
        let toml = r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            max_request_size = 1024
            timeout_seconds = 5

            [logging]
            level = "debug"
            format = "pretty"

            [inventory]
            data_file = "stock.xlsx"
            fallback_to_placeholder = false
            ranking_limit = 50
            allowed_extensions = ["xlsx"]

            [inventory.normalizer]
            skip_rows = 1
            low_stock_threshold = 10
            exclude_sources = ["summary"]

            [inventory.normalizer.columns]
            specification = "spec"
            category = "type"
            quantity = ["stock", 7]
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.inventory.normalizer.low_stock_threshold, 10);
        assert_eq!(config.inventory.normalizer.default_unit, "pcs");
        assert_eq!(config.inventory.normalizer.columns.quantity.len(), 2);
        assert!(config.validate().is_ok());
    }
}
