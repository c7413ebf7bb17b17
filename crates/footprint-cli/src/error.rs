//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalogue error
    #[error("Catalogue error: {0}")]
    Catalog(#[from] footprint_catalog::CatalogError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] footprint_engine::EngineError),

    /// Domain error
    #[error(transparent)]
    Domain(#[from] footprint_domain::FootprintError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A task tree failed validation; `output` holds the formatted reports
    #[error("{count} invalid resource(s) in '{task}'")]
    InvalidResources {
        /// Task tree name
        task: String,
        /// Number of invalid resources
        count: usize,
        /// Formatted validation reports
        output: String,
    },
}

impl From<footprint_domain::DimensionalityError> for CliError {
    fn from(err: footprint_domain::DimensionalityError) -> Self {
        CliError::Domain(err.into())
    }
}
