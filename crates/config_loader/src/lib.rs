//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `BulkConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("bulk.toml")).unwrap();
//! println!("Sinks: {}", config.sinks.len());
//! ```

mod parser;
mod validator;

pub use contracts::BulkConfig;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Loads sink configuration for the batcher
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a configuration file.
    ///
    /// The format follows the extension (`.toml` or `.json`).
    pub fn load_from_path(path: &Path) -> Result<BulkConfig, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| ContractError::ConfigParse {
            message: format!("cannot read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate configuration text
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<BulkConfig, ContractError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }

    pub fn to_toml(config: &BulkConfig) -> Result<String, ContractError> {
        Self::render(config, ConfigFormat::Toml)
    }

    pub fn to_json(config: &BulkConfig) -> Result<String, ContractError> {
        Self::render(config, ConfigFormat::Json)
    }

    /// Serialize a configuration in the given format
    pub fn render(config: &BulkConfig, format: ConfigFormat) -> Result<String, ContractError> {
        let rendered = match format {
            ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
        };
        rendered.map_err(|e| ContractError::config_parse(format!("{format} serialize error: {e}")))
    }
}
