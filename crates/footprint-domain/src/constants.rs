//! Ambient constants used when resolving electricity-driven impacts

use crate::quantity::Quantity;
use crate::unit::aliases;
use serde::{Deserialize, Serialize};

/// Immutable constants threaded into every impact resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConstants {
    /// Power usage effectiveness of the hosting datacenter
    pub pue: f64,
    /// Carbon intensity of the electricity grid
    pub electricity_mix: Quantity,
}

impl Default for ImpactConstants {
    fn default() -> Self {
        Self {
            pue: 1.5,
            electricity_mix: Quantity::new(0.0599, aliases::electricity_mix()),
        }
    }
}

impl ImpactConstants {
    /// Replace the PUE
    pub fn with_pue(mut self, pue: f64) -> Self {
        self.pue = pue;
        self
    }

    /// Replace the electricity mix
    pub fn with_electricity_mix(mut self, electricity_mix: Quantity) -> Self {
        self.electricity_mix = electricity_mix;
        self
    }

    /// Validate the constants
    pub fn validate(&self) -> Result<(), String> {
        if !self.pue.is_finite() || self.pue < 1.0 {
            return Err("pue must be a finite number >= 1.0".to_string());
        }
        if self.electricity_mix.dimension() != aliases::electricity_mix().dimension() {
            return Err(format!(
                "electricity_mix must be a carbon intensity (kg_co2e / kilowatt_hour), got '{}'",
                self.electricity_mix
            ));
        }
        if self.electricity_mix.magnitude() < 0.0 {
            return Err("electricity_mix must not be negative".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ImpactConstants::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_pue_below_one() {
        assert!(ImpactConstants::default().with_pue(0.8).validate().is_err());
    }

    #[test]
    fn test_accepts_equivalent_mix_units() {
        let constants = ImpactConstants::default()
            .with_electricity_mix("59.9 g_co2e / kWh".parse().unwrap());
        assert!(constants.validate().is_ok());

        let wrong = ImpactConstants::default().with_electricity_mix("1 kg_co2e".parse().unwrap());
        assert!(wrong.validate().is_err());
    }
}
