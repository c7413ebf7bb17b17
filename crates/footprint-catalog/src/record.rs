//! Serialized form of a catalogue entry

use footprint_domain::{
    EnvironmentalImpact, ImpactSource, ImpactSourceId, ImpactSourceUsage, Quantity, Unit,
};
use serde::{Deserialize, Serialize};

/// Catalogue entry as stored on disk
///
/// Impacts are absolute figures for one unit (`1.13 kg_co2e` for one
/// `server * day`); [`ImpactSource`] stores them per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSourceRecord {
    /// Catalogue id
    pub id: ImpactSourceId,
    /// Display name
    pub name: String,
    /// Unit the impacts are given for
    pub unit: Unit,
    /// Impacts of one unit
    #[serde(default)]
    pub environmental_impact: EnvironmentalImpact,
    /// Other sources consumed by one unit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<ImpactSourceUsage>,
    /// Electricity consumed by one unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity: Option<Quantity>,
    /// Provenance
    #[serde(default)]
    pub source: String,
    /// Methodology
    #[serde(default)]
    pub methodology: String,
}

impl From<ImpactSourceRecord> for ImpactSource {
    fn from(record: ImpactSourceRecord) -> Self {
        let source = ImpactSource::new(
            record.id,
            record.name,
            record.unit,
            record.environmental_impact,
        )
        .with_uses(record.uses)
        .with_provenance(record.source, record.methodology);
        match record.electricity {
            Some(electricity) => source.with_electricity(electricity),
            None => source,
        }
    }
}

impl From<&ImpactSource> for ImpactSourceRecord {
    fn from(source: &ImpactSource) -> Self {
        Self {
            id: source.id.clone(),
            name: source.name.clone(),
            unit: source.unit.clone(),
            environmental_impact: source.own_impact_absolute(),
            uses: source.uses.clone(),
            electricity: source.electricity.clone(),
            source: source.source.clone(),
            methodology: source.methodology.clone(),
        }
    }
}
