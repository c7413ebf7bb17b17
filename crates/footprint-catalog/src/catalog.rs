//! In-memory catalogue of impact sources

use crate::error::{CatalogError, IntegrityIssue};
use crate::record::ImpactSourceRecord;
use footprint_domain::traits::ImpactSourceRepository;
use footprint_domain::{ImpactSource, ImpactSourceId};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

const BUILTIN: &str = include_str!("../data/impact_sources.json");

/// Read-only set of impact sources, keyed by id
///
/// Every constructor runs the integrity check, so a `Catalog` never holds a
/// dangling `uses` reference or a `uses` cycle.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sources: BTreeMap<ImpactSourceId, ImpactSource>,
}

impl Catalog {
    /// Empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue shipped with the crate
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN)
    }

    /// Load a JSON array of records from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!("Reading impact sources from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse a JSON array of records
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let records: Vec<ImpactSourceRecord> = serde_json::from_str(raw)?;
        Self::from_records(records)
    }

    /// Build from serialized records
    pub fn from_records(records: Vec<ImpactSourceRecord>) -> Result<Self, CatalogError> {
        Self::from_sources(records.into_iter().map(ImpactSource::from))
    }

    /// Build from domain sources
    pub fn from_sources<I>(sources: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ImpactSource>,
    {
        let mut map = BTreeMap::new();
        for source in sources {
            if map.contains_key(&source.id) {
                return Err(CatalogError::DuplicateId(source.id));
            }
            debug!("Registered impact source {} ({})", source.id, source.unit);
            map.insert(source.id.clone(), source);
        }

        let catalog = Self { sources: map };
        let issues = catalog.integrity_issues();
        if !issues.is_empty() {
            for issue in &issues {
                warn!("Rejected catalogue: {}", issue);
            }
            return Err(CatalogError::Integrity(issues));
        }

        info!("Loaded {} impact sources", catalog.len());
        Ok(catalog)
    }

    /// Number of sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when no source is registered
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources in id order
    pub fn iter(&self) -> impl Iterator<Item = &ImpactSource> {
        self.sources.values()
    }

    /// Serializable form of every source
    pub fn records(&self) -> Vec<ImpactSourceRecord> {
        self.iter().map(ImpactSourceRecord::from).collect()
    }

    /// Every inconsistency in the catalogue, empty when sound
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        for source in self.sources.values() {
            self.check_units(source, &mut issues);
            for usage in &source.uses {
                match self.sources.get(&usage.impact_source_id) {
                    None => issues.push(IntegrityIssue::DanglingUsage {
                        source_id: source.id.clone(),
                        missing: usage.impact_source_id.clone(),
                    }),
                    Some(used) if usage.quantity.dimension() != used.unit.dimension() => {
                        issues.push(IntegrityIssue::UsageUnit {
                            source_id: source.id.clone(),
                            used: used.id.clone(),
                            quantity: usage.quantity.to_string(),
                            expected: used.unit.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        issues.extend(
            self.find_cycles()
                .into_iter()
                .map(|path| IntegrityIssue::Cycle { path }),
        );
        issues
    }

    fn check_units(&self, source: &ImpactSource, issues: &mut Vec<IntegrityIssue>) {
        for (category, value) in source.own_impact_absolute().get_total() {
            let expected = category.unit();
            let components = value.manufacture.iter().chain(value.usage.iter());
            for quantity in components {
                if quantity.dimension() != expected.dimension() {
                    issues.push(IntegrityIssue::CategoryUnit {
                        source_id: source.id.clone(),
                        category: *category,
                        unit: quantity.unit().to_string(),
                        expected: expected.to_string(),
                    });
                }
            }
        }

        if let Some(electricity) = &source.electricity {
            let energy = footprint_domain::aliases::kwh().dimension();
            if electricity.dimension() != energy {
                issues.push(IntegrityIssue::ElectricityUnit {
                    source_id: source.id.clone(),
                    value: electricity.to_string(),
                });
            }
        }
    }

    // Depth-first walk of the uses graph; each cycle is reported once
    fn find_cycles(&self) -> Vec<Vec<ImpactSourceId>> {
        let mut finished = BTreeSet::new();
        let mut cycles = Vec::new();
        for id in self.sources.keys() {
            let mut stack = Vec::new();
            self.visit(id, &mut stack, &mut finished, &mut cycles);
        }
        cycles
    }

    fn visit(
        &self,
        id: &ImpactSourceId,
        stack: &mut Vec<ImpactSourceId>,
        finished: &mut BTreeSet<ImpactSourceId>,
        cycles: &mut Vec<Vec<ImpactSourceId>>,
    ) {
        if finished.contains(id) {
            return;
        }
        if let Some(start) = stack.iter().position(|s| s == id) {
            let mut path = stack[start..].to_vec();
            path.push(id.clone());
            cycles.push(path);
            return;
        }
        let Some(source) = self.sources.get(id) else {
            return;
        };

        stack.push(id.clone());
        for usage in &source.uses {
            self.visit(&usage.impact_source_id, stack, finished, cycles);
        }
        stack.pop();
        finished.insert(id.clone());
    }
}

impl ImpactSourceRepository for Catalog {
    fn get(&self, id: &str) -> Option<&ImpactSource> {
        self.sources.get(id)
    }

    fn ids(&self) -> Vec<&ImpactSourceId> {
        self.sources.keys().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint_domain::aliases::*;
    use footprint_domain::{EnvironmentalImpact, ImpactCategory, ImpactValue, Quantity};

    fn q(raw: &str) -> Quantity {
        raw.parse().unwrap()
    }

    fn plain(id: &str) -> ImpactSource {
        ImpactSource::new(id, id, server(), EnvironmentalImpact::new())
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.len() >= 10);
        assert!(catalog.contains("server"));
        assert!(catalog.integrity_issues().is_empty());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let err = Catalog::from_sources(vec![plain("a"), plain("a")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id.as_str() == "a"));
    }

    #[test]
    fn test_dangling_usage_is_reported() {
        let source = plain("vm").with_usage("ghost", q("1 server"));
        match Catalog::from_sources(vec![source]).unwrap_err() {
            CatalogError::Integrity(issues) => assert_eq!(
                issues,
                vec![IntegrityIssue::DanglingUsage {
                    source_id: "vm".into(),
                    missing: "ghost".into(),
                }]
            ),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_cycle_is_reported_once() {
        let a = plain("a").with_usage("b", q("1 server"));
        let b = plain("b").with_usage("c", q("1 server"));
        let c = plain("c").with_usage("a", q("1 server"));
        match Catalog::from_sources(vec![a, b, c]).unwrap_err() {
            CatalogError::Integrity(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(
                    issues[0].to_string(),
                    "uses cycle: a -> b -> c -> a"
                );
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_category_unit_mismatch_is_reported() {
        let impact: EnvironmentalImpact = [(
            ImpactCategory::WaterDepletion,
            ImpactValue::usage(q("3 kg_co2e")),
        )]
        .into_iter()
        .collect();
        let source = ImpactSource::new("dam", "Dam", server(), impact);
        let err = Catalog::from_sources(vec![source]).unwrap_err();
        assert!(err.to_string().contains("dam declares WATER_DEPLETION in 'kg_co2e'"));
    }

    #[test]
    fn test_usage_unit_mismatch_is_reported() {
        let laptop_source = ImpactSource::new("laptop", "Laptop", laptop(), EnvironmentalImpact::new());
        let vm = plain("vm").with_usage("laptop", q("2 server"));
        let err = Catalog::from_sources(vec![laptop_source, vm]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Integrity(ref issues)
                if matches!(issues[0], IntegrityIssue::UsageUnit { .. })
        ));
    }

    #[test]
    fn test_records_round_trip_through_json() {
        let catalog = Catalog::builtin().unwrap();
        let json = serde_json::to_string(&catalog.records()).unwrap();
        let reloaded = Catalog::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
        for source in catalog.iter() {
            let other = reloaded.get(source.id.as_str()).unwrap();
            assert!(source.own_impact().approx_eq(other.own_impact(), 1e-12));
            assert_eq!(source.uses, other.uses);
        }
    }
}
