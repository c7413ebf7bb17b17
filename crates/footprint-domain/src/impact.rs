//! Impact values and per-category aggregates

use crate::category::ImpactCategory;
use crate::error::DimensionalityError;
use crate::quantity::Quantity;
use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Embodied (`manufacture`) and operational (`use`) impact for one category
///
/// A missing component is the additive identity, so an `ImpactValue` with
/// both fields empty is logically zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactValue {
    /// Embodied impact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacture: Option<Quantity>,
    /// Operational impact
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Quantity>,
}

fn sum_component(
    current: &Option<Quantity>,
    other: &Option<Quantity>,
) -> Result<Option<Quantity>, DimensionalityError> {
    match (current, other) {
        (Some(current), Some(value)) => Ok(Some(current.checked_add(value)?)),
        (None, value) => Ok(value.clone()),
        (current, None) => Ok(current.clone()),
    }
}

fn component_approx_eq(a: Option<&Quantity>, b: Option<&Quantity>, tolerance: f64) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), None) | (None, Some(x)) => x.magnitude().abs() <= tolerance,
        (Some(x), Some(y)) => x.approx_eq(y, tolerance),
    }
}

impl ImpactValue {
    /// Value with both components
    pub fn new(manufacture: Option<Quantity>, usage: Option<Quantity>) -> Self {
        Self { manufacture, usage }
    }

    /// Embodied impact only
    pub fn manufacture(value: Quantity) -> Self {
        Self::new(Some(value), None)
    }

    /// Operational impact only
    pub fn usage(value: Quantity) -> Self {
        Self::new(None, Some(value))
    }

    /// True when no component is set
    pub fn is_empty(&self) -> bool {
        self.manufacture.is_none() && self.usage.is_none()
    }

    /// Component-wise sum
    pub fn summed(&self, other: &ImpactValue) -> Result<ImpactValue, DimensionalityError> {
        Ok(ImpactValue {
            manufacture: sum_component(&self.manufacture, &other.manufacture)?,
            usage: sum_component(&self.usage, &other.usage)?,
        })
    }

    /// Component-wise in-place sum; unchanged on error
    pub fn add(&mut self, other: &ImpactValue) -> Result<(), DimensionalityError> {
        *self = self.summed(other)?;
        Ok(())
    }

    fn map(&self, f: impl Fn(&Quantity) -> Quantity) -> ImpactValue {
        ImpactValue {
            manufacture: self.manufacture.as_ref().map(&f),
            usage: self.usage.as_ref().map(&f),
        }
    }

    fn try_map(
        &self,
        f: impl Fn(&Quantity) -> Result<Quantity, DimensionalityError>,
    ) -> Result<ImpactValue, DimensionalityError> {
        Ok(ImpactValue {
            manufacture: self.manufacture.as_ref().map(&f).transpose()?,
            usage: self.usage.as_ref().map(&f).transpose()?,
        })
    }

    /// Both components multiplied by a quantity; units multiply too
    pub fn multiplied_by(&self, factor: &Quantity) -> ImpactValue {
        self.map(|q| q * factor)
    }

    /// Both components multiplied by a pure number
    pub fn scaled(&self, factor: f64) -> ImpactValue {
        self.map(|q| q * factor)
    }

    /// Both components expressed per `unit`
    pub fn divided_by(&self, unit: &Unit) -> ImpactValue {
        self.map(|q| q / unit)
    }

    /// Both components with same-dimension factors folded together
    pub fn to_reduced_units(&self) -> ImpactValue {
        self.map(Quantity::to_reduced_units)
    }

    /// Both components converted to `unit`
    pub fn to(&self, unit: &Unit) -> Result<ImpactValue, DimensionalityError> {
        self.try_map(|q| q.to(unit))
    }

    /// `manufacture + use`, or `None` when both are missing
    pub fn total(&self) -> Result<Option<Quantity>, DimensionalityError> {
        match (&self.manufacture, &self.usage) {
            (Some(m), Some(u)) => m.checked_add(u).map(Some),
            (Some(q), None) | (None, Some(q)) => Ok(Some(q.clone())),
            (None, None) => Ok(None),
        }
    }

    /// Component-wise comparison, a missing component equals zero
    pub fn approx_eq(&self, other: &ImpactValue, tolerance: f64) -> bool {
        component_approx_eq(self.manufacture.as_ref(), other.manufacture.as_ref(), tolerance)
            && component_approx_eq(self.usage.as_ref(), other.usage.as_ref(), tolerance)
    }
}

/// One category of an [`ImpactSummary`] map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// `manufacture + use` in the category unit, rounded to two decimals
    pub value: f64,
    /// Category unit
    pub unit: String,
}

/// `{CATEGORY: {value, unit}}`
pub type ImpactSummary = BTreeMap<ImpactCategory, CategorySummary>;

/// Per-category impacts; only categories that received a contribution are present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentalImpact(BTreeMap<ImpactCategory, ImpactValue>);

impl EnvironmentalImpact {
    /// No category
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `value` into the entry for `category`, creating it if absent
    pub fn add_impact(
        &mut self,
        category: ImpactCategory,
        value: &ImpactValue,
    ) -> Result<(), DimensionalityError> {
        let merged = self.merged_value(category, value)?;
        self.0.insert(category, merged);
        Ok(())
    }

    /// Merge every category of `other`; unchanged on error
    pub fn add(&mut self, other: &EnvironmentalImpact) -> Result<(), DimensionalityError> {
        let merged = other
            .0
            .iter()
            .map(|(category, value)| {
                self.merged_value(*category, value)
                    .map(|merged| (*category, merged))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.0.extend(merged);
        Ok(())
    }

    fn merged_value(
        &self,
        category: ImpactCategory,
        value: &ImpactValue,
    ) -> Result<ImpactValue, DimensionalityError> {
        match self.0.get(&category) {
            Some(current) => current.summed(value),
            None => Ok(value.clone()),
        }
    }

    /// The whole mapping
    pub fn get_total(&self) -> &BTreeMap<ImpactCategory, ImpactValue> {
        &self.0
    }

    /// Value of one category
    pub fn get(&self, category: ImpactCategory) -> Option<&ImpactValue> {
        self.0.get(&category)
    }

    /// Categories with a contribution
    pub fn categories(&self) -> impl Iterator<Item = ImpactCategory> + '_ {
        self.0.keys().copied()
    }

    /// True when nothing was contributed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `manufacture + use` of one category in its canonical unit, zero when absent
    pub fn category_total(&self, category: ImpactCategory) -> Result<Quantity, DimensionalityError> {
        let unit = category.unit();
        match self.0.get(&category) {
            Some(value) => match value.total()? {
                Some(total) => total.to(&unit),
                None => Ok(Quantity::zero(unit)),
            },
            None => Ok(Quantity::zero(unit)),
        }
    }

    fn map(&self, f: impl Fn(&ImpactValue) -> ImpactValue) -> EnvironmentalImpact {
        EnvironmentalImpact(self.0.iter().map(|(c, v)| (*c, f(v))).collect())
    }

    /// Every value multiplied by `factor`
    pub fn multiplied_by(&self, factor: &Quantity) -> EnvironmentalImpact {
        self.map(|v| v.multiplied_by(factor))
    }

    /// Every value multiplied by a pure number
    pub fn scaled(&self, factor: f64) -> EnvironmentalImpact {
        self.map(|v| v.scaled(factor))
    }

    /// Every value expressed per `unit`
    pub fn divided_by(&self, unit: &Unit) -> EnvironmentalImpact {
        self.map(|v| v.divided_by(unit))
    }

    /// Every value with same-dimension factors folded together
    pub fn to_reduced_units(&self) -> EnvironmentalImpact {
        self.map(ImpactValue::to_reduced_units)
    }

    /// Every value converted to its category unit
    ///
    /// Fails when a value is still expressed per some unit, e.g. `kg_co2e / server`.
    pub fn in_category_units(&self) -> Result<EnvironmentalImpact, DimensionalityError> {
        let mut converted = BTreeMap::new();
        for (category, value) in &self.0 {
            converted.insert(*category, value.to(&category.unit())?);
        }
        Ok(EnvironmentalImpact(converted))
    }

    /// `{CATEGORY: {value, unit}}` with values rounded to two decimals
    pub fn summary(&self) -> Result<ImpactSummary, DimensionalityError> {
        let mut summary = ImpactSummary::new();
        for category in self.categories() {
            let total = self.category_total(category)?.rounded(2);
            summary.insert(
                category,
                CategorySummary {
                    value: total.magnitude(),
                    unit: total.unit().to_string(),
                },
            );
        }
        Ok(summary)
    }

    /// Category-by-category comparison with a relative tolerance
    pub fn approx_eq(&self, other: &EnvironmentalImpact, tolerance: f64) -> bool {
        let empty = ImpactValue::default();
        self.0
            .keys()
            .chain(other.0.keys())
            .all(|category| {
                let left = self.0.get(category).unwrap_or(&empty);
                let right = other.0.get(category).unwrap_or(&empty);
                left.approx_eq(right, tolerance)
            })
    }
}

impl FromIterator<(ImpactCategory, ImpactValue)> for EnvironmentalImpact {
    fn from_iter<I: IntoIterator<Item = (ImpactCategory, ImpactValue)>>(iter: I) -> Self {
        EnvironmentalImpact(iter.into_iter().collect())
    }
}

impl IntoIterator for EnvironmentalImpact {
    type Item = (ImpactCategory, ImpactValue);
    type IntoIter = std::collections::btree_map::IntoIter<ImpactCategory, ImpactValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::aliases::*;

    fn q(raw: &str) -> Quantity {
        raw.parse().unwrap()
    }

    #[test]
    fn test_add_treats_none_as_identity() {
        let mut value = ImpactValue::manufacture(q("1000 kg_co2e"));
        value.add(&ImpactValue::usage(q("776 kg_co2e"))).unwrap();
        assert_eq!(value.manufacture, Some(q("1000 kg_co2e")));
        assert_eq!(value.usage, Some(q("776 kg_co2e")));
        assert_eq!(value.total().unwrap(), Some(q("1776 kg_co2e")));
    }

    #[test]
    fn test_add_rejects_mismatched_units() {
        let mut value = ImpactValue::manufacture(q("1 kg_co2e"));
        assert!(value.add(&ImpactValue::manufacture(q("1 kg_Sbe"))).is_err());
    }

    #[test]
    fn test_failed_add_leaves_value_untouched() {
        let mut value = ImpactValue::new(Some(q("1 kg_co2e")), Some(q("2 kg_co2e")));
        let before = value.clone();
        let other = ImpactValue::new(Some(q("3 kg_co2e")), Some(q("1 kg_Sbe")));
        assert!(value.add(&other).is_err());
        assert_eq!(value, before);
    }

    #[test]
    fn test_failed_merge_leaves_impact_untouched() {
        let mut impact = EnvironmentalImpact::new();
        impact
            .add_impact(ImpactCategory::ClimateChange, &ImpactValue::manufacture(q("1 kg_co2e")))
            .unwrap();
        impact
            .add_impact(ImpactCategory::ResourceDepletion, &ImpactValue::usage(q("1 kg_Sbe")))
            .unwrap();
        let before = impact.clone();

        // the first category merges cleanly, the second does not
        let mut other = EnvironmentalImpact::new();
        other
            .add_impact(ImpactCategory::ClimateChange, &ImpactValue::manufacture(q("5 kg_co2e")))
            .unwrap();
        other
            .add_impact(ImpactCategory::ResourceDepletion, &ImpactValue::usage(q("5 kg_co2e")))
            .unwrap();

        assert!(impact.add(&other).is_err());
        assert_eq!(impact, before);

        assert!(impact
            .add_impact(ImpactCategory::ResourceDepletion, &ImpactValue::usage(q("1 day")))
            .is_err());
        assert_eq!(impact, before);
    }

    #[test]
    fn test_multiply_then_divide() {
        let value = ImpactValue::new(Some(q("10 kg_co2e / server")), None);
        let absolute = value.multiplied_by(&q("3 server"));
        assert_eq!(absolute.manufacture, Some(q("30 kg_co2e")));
        let per_day = absolute.divided_by(&day());
        assert_eq!(per_day.manufacture.unwrap().unit(), &(&kg_co2e() / &day()));
    }

    #[test]
    fn test_merge_keeps_every_category() {
        let mut a = EnvironmentalImpact::new();
        a.add_impact(ImpactCategory::ClimateChange, &ImpactValue::manufacture(q("1 kg_co2e")))
            .unwrap();
        let mut b = EnvironmentalImpact::new();
        b.add_impact(ImpactCategory::WaterDepletion, &ImpactValue::usage(q("2 m3")))
            .unwrap();
        a.add(&b).unwrap();
        let categories: Vec<_> = a.categories().collect();
        assert_eq!(
            categories,
            vec![ImpactCategory::ClimateChange, ImpactCategory::WaterDepletion]
        );
    }

    #[test]
    fn test_category_total_defaults_to_zero() {
        let impact = EnvironmentalImpact::new();
        let total = impact.category_total(ImpactCategory::PrimaryEnergy).unwrap();
        assert_eq!(total, Quantity::zero(megajoule()));
    }

    #[test]
    fn test_summary_rounds_and_names_unit() {
        let impact: EnvironmentalImpact = [(
            ImpactCategory::ClimateChange,
            ImpactValue::new(Some(q("1.004 kg_co2e")), Some(q("2000 g_co2e"))),
        )]
        .into_iter()
        .collect();
        let summary = impact.summary().unwrap();
        let climate = &summary[&ImpactCategory::ClimateChange];
        assert_eq!(climate.value, 3.0);
        assert_eq!(climate.unit, "kg_co2e");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["CLIMATE_CHANGE"]["unit"], "kg_co2e");
    }

    #[test]
    fn test_serde_uses_use_key() {
        let impact: EnvironmentalImpact = [(
            ImpactCategory::ClimateChange,
            ImpactValue::new(Some(q("1000 kg_co2e")), Some(q("776 kg_co2e"))),
        )]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&impact).unwrap();
        assert_eq!(json["CLIMATE_CHANGE"]["manufacture"], "1000 kg_co2e");
        assert_eq!(json["CLIMATE_CHANGE"]["use"], "776 kg_co2e");
        let back: EnvironmentalImpact = serde_json::from_value(json).unwrap();
        assert_eq!(back, impact);
    }
}
