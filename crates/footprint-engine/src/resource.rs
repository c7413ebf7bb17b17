//! Resources: usage of an impact source attached to a task

use crate::ids::{ResourceId, TaskId};
use footprint_domain::{
    EnvironmentalImpact, FootprintError, ImpactCategory, ImpactConstants, ImpactSource,
    ImpactSourceId, ImpactSourceRepository, Quantity,
};
use serde::{Deserialize, Serialize};

/// Consumption of one impact source by a task
///
/// The consumed quantity is `amount * duration / frequency * period`, each
/// optional factor defaulting to one. `duration`, `frequency` and `period`
/// only accept `[time]` quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResourceRecord")]
pub struct Resource {
    /// Resource id
    pub id: ResourceId,
    /// Display name
    pub name: String,
    /// Consumed impact source
    pub impact_source_id: ImpactSourceId,
    /// Amount consumed each time
    pub amount: Quantity,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency: Option<Quantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    period: Option<Quantity>,
    /// Owning task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<TaskId>,
}

#[derive(Deserialize)]
struct ResourceRecord {
    #[serde(default)]
    id: ResourceId,
    #[serde(default)]
    name: String,
    impact_source_id: ImpactSourceId,
    amount: Quantity,
    #[serde(default)]
    duration: Option<Quantity>,
    #[serde(default)]
    frequency: Option<Quantity>,
    #[serde(default)]
    period: Option<Quantity>,
    #[serde(default)]
    parent_task_id: Option<TaskId>,
}

impl TryFrom<ResourceRecord> for Resource {
    type Error = FootprintError;

    fn try_from(record: ResourceRecord) -> Result<Self, Self::Error> {
        let mut resource = Resource::new(record.name, record.impact_source_id, record.amount);
        resource.id = record.id;
        resource.parent_task_id = record.parent_task_id;
        resource.set_duration(record.duration)?;
        resource.set_frequency(record.frequency)?;
        resource.set_period(record.period)?;
        Ok(resource)
    }
}

fn time_quantity(field: &'static str, value: Option<Quantity>) -> Result<Option<Quantity>, FootprintError> {
    match value {
        Some(quantity) if !quantity.is_time() => Err(FootprintError::InvalidTimeQuantity {
            field,
            value: quantity.to_string(),
        }),
        other => Ok(other),
    }
}

impl Resource {
    /// New resource with a fresh id and no time factors
    pub fn new(
        name: impl Into<String>,
        impact_source_id: impl Into<ImpactSourceId>,
        amount: Quantity,
    ) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            impact_source_id: impact_source_id.into(),
            amount,
            duration: None,
            frequency: None,
            period: None,
            parent_task_id: None,
        }
    }

    /// Time spent per occurrence
    pub fn duration(&self) -> Option<&Quantity> {
        self.duration.as_ref()
    }

    /// Time between two occurrences
    pub fn frequency(&self) -> Option<&Quantity> {
        self.frequency.as_ref()
    }

    /// Total span over which the resource is consumed
    pub fn period(&self) -> Option<&Quantity> {
        self.period.as_ref()
    }

    /// Set or clear the duration
    pub fn set_duration(&mut self, duration: Option<Quantity>) -> Result<(), FootprintError> {
        self.duration = time_quantity("duration", duration)?;
        Ok(())
    }

    /// Set or clear the frequency
    pub fn set_frequency(&mut self, frequency: Option<Quantity>) -> Result<(), FootprintError> {
        self.frequency = time_quantity("frequency", frequency)?;
        Ok(())
    }

    /// Set or clear the period
    pub fn set_period(&mut self, period: Option<Quantity>) -> Result<(), FootprintError> {
        self.period = time_quantity("period", period)?;
        Ok(())
    }

    /// Builder form of [`Resource::set_duration`]
    pub fn with_duration(mut self, duration: Quantity) -> Result<Self, FootprintError> {
        self.set_duration(Some(duration))?;
        Ok(self)
    }

    /// Builder form of [`Resource::set_frequency`]
    pub fn with_frequency(mut self, frequency: Quantity) -> Result<Self, FootprintError> {
        self.set_frequency(Some(frequency))?;
        Ok(self)
    }

    /// Builder form of [`Resource::set_period`]
    pub fn with_period(mut self, period: Quantity) -> Result<Self, FootprintError> {
        self.set_period(Some(period))?;
        Ok(self)
    }

    /// `amount * (duration or 1) / (frequency or 1) * (period or 1)`, in reduced units
    pub fn value(&self) -> Quantity {
        let mut value = self.amount.clone();
        if let Some(duration) = &self.duration {
            value = &value * duration;
        }
        if let Some(frequency) = &self.frequency {
            value = &value / frequency;
        }
        if let Some(period) = &self.period {
            value = &value * period;
        }
        value.to_reduced_units()
    }

    /// Absolute impact of this resource, in category units
    pub fn get_environmental_impact<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<EnvironmentalImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let source = repository.impact_source(self.impact_source_id.as_str())?;
        let per_unit = source.get_environmental_impact(repository, constants)?;
        self.scale(source, &per_unit)
    }

    /// Scale an already resolved per-unit impact of `source` by [`Resource::value`]
    pub fn scale(
        &self,
        source: &ImpactSource,
        per_unit: &EnvironmentalImpact,
    ) -> Result<EnvironmentalImpact, FootprintError> {
        let value = self.value().to(&source.unit)?;
        if !value.magnitude().is_finite() {
            return Err(FootprintError::NonFiniteQuantity(value.to_string()));
        }
        Ok(per_unit.multiplied_by(&value).in_category_units()?)
    }

    /// `manufacture + use` of one category, zero when the source has none
    pub fn get_category_impact<R>(
        &self,
        category: ImpactCategory,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<Quantity, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let impact = self.get_environmental_impact(repository, constants)?;
        Ok(impact.category_total(category)?)
    }

    /// Copy with a fresh id, detached from any task
    pub fn duplicate(&self) -> Resource {
        Resource {
            id: ResourceId::new(),
            parent_task_id: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint_domain::aliases::*;
    use footprint_domain::ImpactValue;
    use std::collections::BTreeMap;

    fn q(raw: &str) -> Quantity {
        raw.parse().unwrap()
    }

    fn catalog() -> BTreeMap<ImpactSourceId, ImpactSource> {
        let impact: EnvironmentalImpact = [(
            ImpactCategory::ClimateChange,
            ImpactValue::new(Some(q("2332 kg_co2e")), Some(q("12332 kg_co2e"))),
        )]
        .into_iter()
        .collect();
        let server = ImpactSource::new("server", "Server", &server() * &day(), impact.clone());
        let laptop = ImpactSource::new("laptop", "Laptop", laptop(), impact);
        [server, laptop].into_iter().map(|s| (s.id.clone(), s)).collect()
    }

    #[test]
    fn test_value_without_time_factors() {
        let resource = Resource::new("r", "laptop", q("3 laptop"));
        assert_eq!(resource.value(), q("3 laptop"));
    }

    #[test]
    fn test_value_combines_time_factors() {
        let resource = Resource::new("r", "server", q("2 server"))
            .with_duration(q("12 hour")).unwrap()
            .with_frequency(q("1 day")).unwrap()
            .with_period(q("10 day")).unwrap();
        let value = resource.value().to(&(&server() * &day())).unwrap();
        assert!(value.approx_eq(&q("10 server * day"), 1e-12));
    }

    #[test]
    fn test_time_fields_reject_non_time() {
        let mut resource = Resource::new("r", "server", q("2 server"));
        let err = resource.set_period(Some(q("3 laptop"))).unwrap_err();
        assert!(matches!(err, FootprintError::InvalidTimeQuantity { field: "period", .. }));
        assert!(resource.set_duration(Some(q("2 man_day"))).is_err());
        assert!(resource.set_frequency(Some(q("1 week"))).is_ok());
        assert!(resource.set_frequency(None).is_ok());
    }

    #[test]
    fn test_impact_scales_with_value() {
        let store = catalog();
        let resource = Resource::new("r", "laptop", q("12321.423 laptop"));
        let impact = resource
            .get_environmental_impact(&store, &ImpactConstants::default())
            .unwrap();
        let manufacture = impact
            .get(ImpactCategory::ClimateChange)
            .and_then(|v| v.manufacture.clone())
            .unwrap();
        assert!(manufacture.approx_eq(&q("28733558.436 kg_co2e"), 1e-12));
        assert_eq!(manufacture.unit(), &kg_co2e());
    }

    #[test]
    fn test_category_impact_sums_manufacture_and_use() {
        let store = catalog();
        let resource = Resource::new("r", "laptop", q("1 laptop"));
        let total = resource
            .get_category_impact(ImpactCategory::ClimateChange, &store, &ImpactConstants::default())
            .unwrap();
        assert_eq!(total, q("14664 kg_co2e"));

        let water = resource
            .get_category_impact(ImpactCategory::WaterDepletion, &store, &ImpactConstants::default())
            .unwrap();
        assert_eq!(water.magnitude(), 0.0);
    }

    #[test]
    fn test_incompatible_amount_is_dimensionality_error() {
        let store = catalog();
        let resource = Resource::new("r", "server", q("4 laptop"));
        let err = resource
            .get_environmental_impact(&store, &ImpactConstants::default())
            .unwrap_err();
        assert!(matches!(err, FootprintError::Dimensionality(_)));
    }

    #[test]
    fn test_unknown_source() {
        let store = catalog();
        let resource = Resource::new("r", "printer", q("1 device"));
        let err = resource
            .get_environmental_impact(&store, &ImpactConstants::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "No corresponding impact source: printer");
    }

    #[test]
    fn test_deserialize_rejects_non_time_period() {
        let json = r#"{"impact_source_id": "server", "amount": "1 server", "period": "2 kg"}"#;
        assert!(serde_json::from_str::<Resource>(json).is_err());

        let json = r#"{"impact_source_id": "server", "amount": "1 server", "period": "2 month"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.period(), Some(&q("2 month")));
    }

    #[test]
    fn test_duplicate_gets_fresh_id() {
        let mut resource = Resource::new("r", "server", q("1 server"));
        resource.parent_task_id = Some(TaskId::new());
        let copy = resource.duplicate();
        assert_ne!(copy.id, resource.id);
        assert_eq!(copy.parent_task_id, None);
        assert_eq!(copy.amount, resource.amount);
    }
}
