//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Footprint CLI - Estimate the environmental impact of a project.
#[derive(Debug, Parser)]
#[command(name = "footprint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FOOTPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Impact source catalogue (JSON); the built-in catalogue otherwise
    #[arg(long, global = true, env = "FOOTPRINT_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Log debug information to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (bare values)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List impact sources, or show the resolved impact of one
    Sources(SourcesArgs),

    /// Estimate the impact of a task tree
    Estimate(EstimateArgs),

    /// Check every resource of a task tree
    Validate(ValidateArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the sources command.
#[derive(Debug, Parser)]
pub struct SourcesArgs {
    /// Impact source to resolve
    pub id: Option<String>,
}

/// Arguments for the estimate command.
#[derive(Debug, Parser)]
pub struct EstimateArgs {
    /// Task tree document (JSON), `-` for stdin
    pub file: PathBuf,

    /// Also break the impact down by impact source
    #[arg(long)]
    pub by_source: bool,

    /// Validate every resource before estimating
    #[arg(long)]
    pub strict: bool,

    /// Override the configured power usage effectiveness
    #[arg(long)]
    pub pue: Option<f64>,
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Task tree document (JSON), `-` for stdin
    pub file: PathBuf,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Change one setting
    Set {
        /// Setting name
        #[arg(value_enum)]
        key: ConfigKey,
        /// New value
        value: String,
    },

    /// Restore the default configuration
    Reset,
}

/// Settable configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigKey {
    /// Power usage effectiveness
    Pue,
    /// Electricity carbon intensity, e.g. "0.0599 kg_co2e / kWh"
    ElectricityMix,
    /// Validate trees before estimating (true/false)
    ValidateOnEstimate,
    /// Default output format (table/json/quiet)
    Format,
    /// Colored output (true/false)
    Color,
    /// Catalogue path, empty for the built-in one
    Catalog,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_command() {
        let cli = Cli::parse_from(["footprint", "estimate", "project.json", "--by-source", "--pue", "1.2"]);
        match cli.command {
            Command::Estimate(args) => {
                assert_eq!(args.file, PathBuf::from("project.json"));
                assert!(args.by_source);
                assert!(!args.strict);
                assert_eq!(args.pue, Some(1.2));
            }
            _ => panic!("Expected Estimate command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["footprint", "sources", "server", "--format", "json", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Sources(args) => assert_eq!(args.id.as_deref(), Some("server")),
            _ => panic!("Expected Sources command"),
        }
    }

    #[test]
    fn test_config_set_parses_key() {
        let cli = Cli::parse_from(["footprint", "config", "set", "electricity-mix", "0.1 kg_co2e / kWh"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Set { key, value },
            }) => {
                assert_eq!(key, ConfigKey::ElectricityMix);
                assert_eq!(value, "0.1 kg_co2e / kWh");
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["footprint"]).is_err());
    }
}
