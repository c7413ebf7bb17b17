//! Impact sources and their recursive resolution
//!
//! An impact source describes the footprint of one unit of an activity
//! (`1 server * day`, `1 man_day`, ...). Part of that footprint may come from
//! consuming other sources: a virtual machine uses a fraction of a server, a
//! server uses electricity. Resolving a source walks its `uses` graph
//! depth-first, rescales every sub-impact into the unit of the consumer and
//! sums it with the source's own impact.

use crate::category::ImpactCategory;
use crate::constants::ImpactConstants;
use crate::error::{DimensionalityError, FootprintError};
use crate::impact::{EnvironmentalImpact, ImpactValue};
use crate::quantity::Quantity;
use crate::traits::ImpactSourceRepository;
use crate::unit::{aliases, Unit};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Catalogue identifier of an impact source
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImpactSourceId(String);

impl ImpactSourceId {
    /// Wrap an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImpactSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for ImpactSourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImpactSourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Consumption of another source by one unit of the consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSourceUsage {
    /// Consumed source
    #[serde(alias = "resource_id")]
    pub impact_source_id: ImpactSourceId,
    /// Amount consumed, in a unit convertible to the consumed source's unit
    pub quantity: Quantity,
}

impl ImpactSourceUsage {
    /// Build a usage entry
    pub fn new(impact_source_id: impl Into<ImpactSourceId>, quantity: Quantity) -> Self {
        Self {
            impact_source_id: impact_source_id.into(),
            quantity,
        }
    }
}

/// Resolved impact of a source, keeping track of where it comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSourceImpact {
    /// Source this breakdown belongs to
    pub impact_source_id: ImpactSourceId,
    /// Direct impact (including electricity), per unit of the consumer
    pub own_impact: EnvironmentalImpact,
    /// Contributions of consumed sources, grouped by source
    pub sub_impacts: BTreeMap<ImpactSourceId, ImpactSourceImpact>,
    /// `own_impact` plus every sub-impact total
    pub total: EnvironmentalImpact,
}

impl ImpactSourceImpact {
    fn map(&self, f: &impl Fn(&EnvironmentalImpact) -> EnvironmentalImpact) -> ImpactSourceImpact {
        ImpactSourceImpact {
            impact_source_id: self.impact_source_id.clone(),
            own_impact: f(&self.own_impact),
            sub_impacts: self
                .sub_impacts
                .iter()
                .map(|(id, sub)| (id.clone(), sub.map(f)))
                .collect(),
            total: f(&self.total),
        }
    }

    /// The whole breakdown multiplied by `factor`
    pub fn multiplied_by(&self, factor: &Quantity) -> ImpactSourceImpact {
        self.map(&|impact: &EnvironmentalImpact| impact.multiplied_by(factor))
    }

    /// The whole breakdown expressed per `unit`
    pub fn divided_by(&self, unit: &Unit) -> ImpactSourceImpact {
        self.map(&|impact: &EnvironmentalImpact| impact.divided_by(unit))
    }

    /// The whole breakdown with same-dimension factors folded together
    pub fn to_reduced_units(&self) -> ImpactSourceImpact {
        self.map(&EnvironmentalImpact::to_reduced_units)
    }

    /// Merge another breakdown of the same source
    pub fn add(&mut self, other: &ImpactSourceImpact) -> Result<(), DimensionalityError> {
        self.own_impact.add(&other.own_impact)?;
        self.total.add(&other.total)?;
        for (id, sub) in &other.sub_impacts {
            match self.sub_impacts.entry(id.clone()) {
                Entry::Occupied(mut entry) => entry.get_mut().add(sub)?,
                Entry::Vacant(entry) => {
                    entry.insert(sub.clone());
                }
            }
        }
        Ok(())
    }
}

/// Catalogued footprint of one unit of an activity
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactSource {
    /// Catalogue id
    pub id: ImpactSourceId,
    /// Display name
    pub name: String,
    /// Unit the impact is expressed for, e.g. `server * day`
    pub unit: Unit,
    own_impact: EnvironmentalImpact,
    /// Other sources consumed by one unit of this one
    pub uses: Vec<ImpactSourceUsage>,
    /// Electricity consumed by one unit of this source
    pub electricity: Option<Quantity>,
    /// Provenance of the figures
    pub source: String,
    /// How the figures were obtained
    pub methodology: String,
}

impl ImpactSource {
    /// Build a source from the impact of one unit
    ///
    /// `impact` is absolute (`1776 kg_co2e` for one server); it is stored per
    /// unit (`1776 kg_co2e / server`).
    pub fn new(
        id: impl Into<ImpactSourceId>,
        name: impl Into<String>,
        unit: Unit,
        impact: EnvironmentalImpact,
    ) -> Self {
        let own_impact = impact.divided_by(&unit);
        Self {
            id: id.into(),
            name: name.into(),
            unit,
            own_impact,
            uses: Vec::new(),
            electricity: None,
            source: String::new(),
            methodology: String::new(),
        }
    }

    /// Add a consumed source
    pub fn with_usage(mut self, impact_source_id: impl Into<ImpactSourceId>, quantity: Quantity) -> Self {
        self.uses.push(ImpactSourceUsage::new(impact_source_id, quantity));
        self
    }

    /// Replace the consumed sources
    pub fn with_uses(mut self, uses: Vec<ImpactSourceUsage>) -> Self {
        self.uses = uses;
        self
    }

    /// Set the electricity consumed by one unit
    pub fn with_electricity(mut self, electricity: Quantity) -> Self {
        self.electricity = Some(electricity);
        self
    }

    /// Set provenance strings
    pub fn with_provenance(mut self, source: impl Into<String>, methodology: impl Into<String>) -> Self {
        self.source = source.into();
        self.methodology = methodology.into();
        self
    }

    /// Own impact per unit, without `uses` or electricity
    pub fn own_impact(&self) -> &EnvironmentalImpact {
        &self.own_impact
    }

    /// Own impact for one unit, in absolute terms
    pub fn own_impact_absolute(&self) -> EnvironmentalImpact {
        self.own_impact
            .multiplied_by(&Quantity::new(1.0, self.unit.clone()))
            .to_reduced_units()
    }

    /// True when the unit carries a `[time]` factor (`server * day`)
    pub fn has_time_input(&self) -> bool {
        self.unit.has_time_factor()
    }

    /// Impact of one unit of this source, `uses` and electricity included
    pub fn get_environmental_impact<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<EnvironmentalImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        Ok(self.impact_breakdown(repository, constants)?.total)
    }

    /// Impact of one unit of this source, split by origin
    pub fn impact_breakdown<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<ImpactSourceImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let mut resolving = Vec::new();
        self.resolve(repository, constants, &mut resolving)
    }

    fn resolve<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
        resolving: &mut Vec<ImpactSourceId>,
    ) -> Result<ImpactSourceImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        if resolving.contains(&self.id) {
            let mut path = resolving.clone();
            path.push(self.id.clone());
            return Err(FootprintError::ImpactSourceCycle { path });
        }

        resolving.push(self.id.clone());
        let result = self.resolve_uses(repository, constants, resolving);
        resolving.pop();
        result
    }

    fn resolve_uses<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
        resolving: &mut Vec<ImpactSourceId>,
    ) -> Result<ImpactSourceImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let mut own_impact = self.own_impact.clone();
        if let Some(electricity) = &self.electricity {
            let usage = self.electricity_impact(electricity, constants)?;
            own_impact.add_impact(ImpactCategory::ClimateChange, &ImpactValue::usage(usage))?;
        }

        let mut sub_impacts: BTreeMap<ImpactSourceId, ImpactSourceImpact> = BTreeMap::new();
        for usage in &self.uses {
            let other = repository.impact_source(usage.impact_source_id.as_str())?;
            let contribution = other
                .resolve(repository, constants, resolving)?
                .multiplied_by(&usage.quantity)
                .divided_by(&self.unit)
                .to_reduced_units();

            match sub_impacts.entry(other.id.clone()) {
                Entry::Occupied(mut entry) => entry.get_mut().add(&contribution)?,
                Entry::Vacant(entry) => {
                    entry.insert(contribution);
                }
            }
        }

        let mut total = own_impact.clone();
        for sub in sub_impacts.values() {
            total.add(&sub.total)?;
        }

        Ok(ImpactSourceImpact {
            impact_source_id: self.id.clone(),
            own_impact,
            sub_impacts,
            total,
        })
    }

    // electricity * pue * mix, per unit of this source
    fn electricity_impact(
        &self,
        electricity: &Quantity,
        constants: &ImpactConstants,
    ) -> Result<Quantity, DimensionalityError> {
        let emitted = (&(electricity * constants.pue) * &constants.electricity_mix)
            .to(&aliases::kg_co2e())?;
        Ok(&emitted / &self.unit)
    }
}
