//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command against the file at `path`.
pub fn execute_config(
    args: ConfigArgs,
    config: &mut Config,
    path: &Path,
    formatter: &Formatter,
) -> Result<String> {
    match args.action {
        ConfigAction::Show => toml::to_string_pretty(config)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e))),
        ConfigAction::Path => Ok(path.display().to_string()),
        ConfigAction::Set { key, value } => {
            config.set(key, &value)?;
            config.save_to(path)?;
            Ok(formatter.success(&format!("Set {:?} to '{}'", key, value)))
        }
        ConfigAction::Reset => {
            *config = Config::default();
            config.save_to(path)?;
            Ok(formatter.success("Configuration reset to defaults"))
        }
    }
}
