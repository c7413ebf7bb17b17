//! Configuration for the estimation engine

use footprint_domain::ImpactConstants;
use serde::{Deserialize, Serialize};

/// Configuration for the Estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Validate resources before they are attached to a task
    pub validate_on_insert: bool,

    /// Validate the whole tree again before every estimate
    pub validate_on_estimate: bool,

    /// PUE and electricity mix used to price electricity
    pub constants: ImpactConstants,
}

impl Default for EngineConfig {
    /// Validation at insertion time only
    fn default() -> Self {
        Self {
            validate_on_insert: true,
            validate_on_estimate: false,
            constants: ImpactConstants::default(),
        }
    }
}

impl EngineConfig {
    /// Strict preset: trees loaded from documents are validated before estimation
    pub fn strict() -> Self {
        Self {
            validate_on_estimate: true,
            ..Self::default()
        }
    }

    /// Permissive preset: no validation, dimension errors surface during estimation
    pub fn permissive() -> Self {
        Self {
            validate_on_insert: false,
            validate_on_estimate: false,
            ..Self::default()
        }
    }

    /// Replace the impact constants
    pub fn with_constants(mut self, constants: ImpactConstants) -> Self {
        self.constants = constants;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.constants.validate()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(EngineConfig::strict().validate().is_ok());
        assert!(EngineConfig::permissive().validate().is_ok());
    }

    #[test]
    fn test_presets_toggle_validation() {
        let strict = EngineConfig::strict();
        assert!(strict.validate_on_insert && strict.validate_on_estimate);
        let permissive = EngineConfig::permissive();
        assert!(!permissive.validate_on_insert && !permissive.validate_on_estimate);
    }

    #[test]
    fn test_invalid_pue() {
        let config = EngineConfig::default().with_constants(ImpactConstants::default().with_pue(0.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::strict()
            .with_constants(ImpactConstants::default().with_pue(1.2));
        let toml_str = config.to_toml().unwrap();
        let parsed = EngineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = EngineConfig::from_toml("validate_on_estimate = true\n").unwrap();
        assert!(parsed.validate_on_insert);
        assert!(parsed.validate_on_estimate);
        assert_eq!(parsed.constants, ImpactConstants::default());

        let parsed = EngineConfig::from_toml("[constants]\npue = 1.3\n").unwrap();
        assert_eq!(parsed.constants.pue, 1.3);
        assert_eq!(
            parsed.constants.electricity_mix,
            ImpactConstants::default().electricity_mix
        );
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineConfig::from_toml("validate_on_insert = \"maybe\"").unwrap_err();
        assert!(err.starts_with("Failed to parse TOML"));
    }
}
