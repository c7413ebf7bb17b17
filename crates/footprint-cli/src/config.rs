//! Configuration management for the CLI.

use crate::cli::ConfigKey;
use crate::error::{CliError, Result};
use footprint_domain::Quantity;
use footprint_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalogue to load instead of the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Engine settings and impact constants
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".footprint").join("config.toml"))
    }

    /// Load configuration from the default path, or defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, or defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.engine.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Change one setting from its textual value.
    ///
    /// The configuration is left untouched when the new value is rejected.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.engine.validate().map_err(CliError::InvalidInput)?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::Pue => {
                self.engine.constants.pue = parse_value(key, value)?;
            }
            ConfigKey::ElectricityMix => {
                let mix: Quantity = value
                    .parse()
                    .map_err(|e| CliError::InvalidInput(format!("{}", e)))?;
                self.engine.constants.electricity_mix = mix;
            }
            ConfigKey::ValidateOnEstimate => {
                self.engine.validate_on_estimate = parse_value(key, value)?;
            }
            ConfigKey::Format => {
                self.settings.format = match value.to_lowercase().as_str() {
                    "table" => OutputFormat::Table,
                    "json" => OutputFormat::Json,
                    "quiet" => OutputFormat::Quiet,
                    other => {
                        return Err(CliError::InvalidInput(format!(
                            "Unknown output format '{}'",
                            other
                        )))
                    }
                };
            }
            ConfigKey::Color => {
                self.settings.color = parse_value(key, value)?;
            }
            ConfigKey::Catalog => {
                self.catalog = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: ConfigKey, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidInput(format!("Invalid value '{}' for {:?}", value, key)))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            settings: Settings::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.catalog.is_none());
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_set_values() {
        let mut config = Config::default();
        config.set(ConfigKey::Pue, "1.2").unwrap();
        config.set(ConfigKey::Format, "JSON").unwrap();
        config.set(ConfigKey::Color, "false").unwrap();
        config.set(ConfigKey::Catalog, "/tmp/sources.json").unwrap();

        assert_eq!(config.engine.constants.pue, 1.2);
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(!config.settings.color);
        assert_eq!(config.catalog, Some(PathBuf::from("/tmp/sources.json")));

        config.set(ConfigKey::Catalog, "").unwrap();
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set(ConfigKey::Pue, "fast").is_err());
        assert!(config.set(ConfigKey::Pue, "0.5").is_err());
        assert!(config.set(ConfigKey::Format, "xml").is_err());
        assert!(config.set(ConfigKey::ElectricityMix, "3 server").is_err());
        assert_eq!(config, Config::default());
        assert!(config.set(ConfigKey::ElectricityMix, "0.1 kg_co2e / kWh").is_ok());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }
}
