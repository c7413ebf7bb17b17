//! Impact categories

use crate::error::ParseError;
use crate::unit::{aliases, Unit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environmental indicator, bound to exactly one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactCategory {
    /// Global warming potential
    ClimateChange,
    /// Abiotic resource depletion
    ResourceDepletion,
    /// Acidification
    Acidification,
    /// Fine particle emissions
    FineParticles,
    /// Ionizing radiations
    IonizingRadiations,
    /// Water depletion
    WaterDepletion,
    /// Electronic waste
    ElectronicWaste,
    /// Primary energy consumption
    PrimaryEnergy,
    /// Raw material input
    RawMaterials,
}

impl ImpactCategory {
    /// Every category, in declaration order
    pub const ALL: [ImpactCategory; 9] = [
        ImpactCategory::ClimateChange,
        ImpactCategory::ResourceDepletion,
        ImpactCategory::Acidification,
        ImpactCategory::FineParticles,
        ImpactCategory::IonizingRadiations,
        ImpactCategory::WaterDepletion,
        ImpactCategory::ElectronicWaste,
        ImpactCategory::PrimaryEnergy,
        ImpactCategory::RawMaterials,
    ];

    /// Canonical unit of the category
    pub fn unit(&self) -> Unit {
        match self {
            ImpactCategory::ClimateChange => aliases::kg_co2e(),
            ImpactCategory::ResourceDepletion => aliases::kg_sbe(),
            ImpactCategory::Acidification => aliases::mol_hpos(),
            ImpactCategory::FineParticles => aliases::disease_incidence(),
            ImpactCategory::IonizingRadiations => aliases::kg_bq_u235e(),
            ImpactCategory::WaterDepletion => aliases::cubic_meter(),
            ImpactCategory::ElectronicWaste => aliases::kilogram(),
            ImpactCategory::PrimaryEnergy => aliases::megajoule(),
            ImpactCategory::RawMaterials => aliases::kg_mips(),
        }
    }

    /// Identifier used in serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactCategory::ClimateChange => "CLIMATE_CHANGE",
            ImpactCategory::ResourceDepletion => "RESOURCE_DEPLETION",
            ImpactCategory::Acidification => "ACIDIFICATION",
            ImpactCategory::FineParticles => "FINE_PARTICLES",
            ImpactCategory::IonizingRadiations => "IONIZING_RADIATIONS",
            ImpactCategory::WaterDepletion => "WATER_DEPLETION",
            ImpactCategory::ElectronicWaste => "ELECTRONIC_WASTE",
            ImpactCategory::PrimaryEnergy => "PRIMARY_ENERGY",
            ImpactCategory::RawMaterials => "RAW_MATERIALS",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            ImpactCategory::ClimateChange => "Climate change",
            ImpactCategory::ResourceDepletion => "Natural resources depletion",
            ImpactCategory::Acidification => "Acidification",
            ImpactCategory::FineParticles => "Fine particles",
            ImpactCategory::IonizingRadiations => "Ionizing radiations",
            ImpactCategory::WaterDepletion => "Water depletion",
            ImpactCategory::ElectronicWaste => "Electronic waste",
            ImpactCategory::PrimaryEnergy => "Primary energy consumption",
            ImpactCategory::RawMaterials => "Raw materials",
        }
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImpactCategory {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        ImpactCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseError::new(s, "unknown impact category"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_distinct_unit() {
        let mut units: Vec<String> = ImpactCategory::ALL.iter().map(|c| c.unit().to_string()).collect();
        units.sort();
        units.dedup();
        assert_eq!(units.len(), ImpactCategory::ALL.len());
    }

    #[test]
    fn test_parse_category() {
        assert_eq!("CLIMATE_CHANGE".parse::<ImpactCategory>().unwrap(), ImpactCategory::ClimateChange);
        assert_eq!("climate-change".parse::<ImpactCategory>().unwrap(), ImpactCategory::ClimateChange);
        assert!("OZONE".parse::<ImpactCategory>().is_err());
    }

    #[test]
    fn test_serde_name_matches_display() {
        for category in ImpactCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category));
        }
    }
}
