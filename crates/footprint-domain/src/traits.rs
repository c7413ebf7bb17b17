//! Trait definitions for external interactions
//!
//! The catalogue of impact sources is loaded by another crate; the domain
//! only needs a lookup by id.

use crate::error::FootprintError;
use crate::source::{ImpactSource, ImpactSourceId};
use std::collections::{BTreeMap, HashMap};

/// Read-only lookup of impact sources by id
///
/// Implemented by the infrastructure layer (footprint-catalog)
pub trait ImpactSourceRepository {
    /// Get a source by id
    fn get(&self, id: &str) -> Option<&ImpactSource>;

    /// Every known id, sorted
    fn ids(&self) -> Vec<&ImpactSourceId>;

    /// Get a source by id, failing with `UnknownImpactSource` when absent
    fn impact_source(&self, id: &str) -> Result<&ImpactSource, FootprintError> {
        self.get(id)
            .ok_or_else(|| FootprintError::UnknownImpactSource(ImpactSourceId::new(id)))
    }

    /// True when the id resolves
    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

impl ImpactSourceRepository for BTreeMap<ImpactSourceId, ImpactSource> {
    fn get(&self, id: &str) -> Option<&ImpactSource> {
        BTreeMap::get(self, id)
    }

    fn ids(&self) -> Vec<&ImpactSourceId> {
        self.keys().collect()
    }
}

impl ImpactSourceRepository for HashMap<ImpactSourceId, ImpactSource> {
    fn get(&self, id: &str) -> Option<&ImpactSource> {
        HashMap::get(self, id)
    }

    fn ids(&self) -> Vec<&ImpactSourceId> {
        let mut ids: Vec<_> = self.keys().collect();
        ids.sort();
        ids
    }
}
