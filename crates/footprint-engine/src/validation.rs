//! Resource validation
//!
//! Checks that the quantities of a resource can be reconciled with the unit
//! of its impact source before the resource is accepted into a task:
//!
//! - amount already in the source unit: `period` and `frequency` come as a
//!   pair, and the amount is not a time
//! - source unit with two factors, one of them a time (`server * day`):
//!   `period` is mandatory, `duration` and `frequency` come as a pair
//! - any other unit mismatch is reported on `amount`

use crate::ids::ResourceId;
use crate::resource::Resource;
use crate::task::Task;
use footprint_domain::ImpactSourceRepository;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Field a validation error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceField {
    /// `amount`
    Amount,
    /// `duration`
    Duration,
    /// `frequency`
    Frequency,
    /// `period`
    Period,
    /// The resolved impact source itself
    ImpactSource,
    /// `impact_source_id`
    ImpactSourceId,
}

impl ResourceField {
    /// Field name as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceField::Amount => "amount",
            ResourceField::Duration => "duration",
            ResourceField::Frequency => "frequency",
            ResourceField::Period => "period",
            ResourceField::ImpactSource => "impact_source",
            ResourceField::ImpactSourceId => "impact_source_id",
        }
    }
}

impl fmt::Display for ResourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One broken rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field
    pub field: ResourceField,
    /// Human readable explanation
    pub message: String,
}

/// Outcome of validating one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Validated resource
    pub resource_id: ResourceId,
    /// Broken rules, empty when valid
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    /// True when no rule is broken
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when `field` carries at least one error
    pub fn has_error(&self, field: ResourceField) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Errors attached to `field`
    pub fn field_errors(&self, field: ResourceField) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    fn push(&mut self, field: ResourceField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource {}", self.resource_id)?;
        for error in &self.errors {
            write!(f, "; {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

/// Validates resources against a catalogue
pub struct ResourceValidator<'a, R: ?Sized> {
    repository: &'a R,
}

impl<'a, R> ResourceValidator<'a, R>
where
    R: ImpactSourceRepository + ?Sized,
{
    /// Create a validator reading from `repository`
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Check one resource
    pub fn validate(&self, resource: &Resource) -> ValidationReport {
        let mut report = ValidationReport {
            resource_id: resource.id,
            errors: Vec::new(),
        };

        let Some(source) = self.repository.get(resource.impact_source_id.as_str()) else {
            report.push(
                ResourceField::ImpactSourceId,
                format!("Wrong impact_source_id: {}", resource.impact_source_id),
            );
            warn!("Resource {} rejected: {}", resource.id, report);
            return report;
        };

        let unit = &source.unit;
        let period = resource.period();
        let frequency = resource.frequency();
        let duration = resource.duration();

        if resource.amount.unit() == unit {
            if period.is_none() && frequency.is_some() {
                report.push(
                    ResourceField::Period,
                    format!(
                        "period should not be empty if frequency is set, as there is no [time] in the impact source unit ({})",
                        unit
                    ),
                );
            }
            if frequency.is_none() && period.is_some() {
                report.push(
                    ResourceField::Frequency,
                    format!(
                        "frequency should not be empty if period is set, as there is no [time] in the impact source unit ({})",
                        unit
                    ),
                );
            }
            if resource.amount.is_time() {
                report.push(ResourceField::Amount, "impact source input can't be time");
            }
        } else {
            match unit.factor_count() {
                n if n > 2 => {
                    report.push(
                        ResourceField::ImpactSource,
                        format!("impact source unit {} has more than two factors", unit),
                    );
                }
                2 if unit.has_time_factor() => {
                    if period.is_none() {
                        report.push(
                            ResourceField::Period,
                            format!("impact source unit is {}, period is needed", unit),
                        );
                    } else if duration.is_some() && frequency.is_none() {
                        report.push(
                            ResourceField::Frequency,
                            "if duration is set, frequency should be set",
                        );
                    } else if duration.is_none() && frequency.is_some() {
                        report.push(
                            ResourceField::Duration,
                            "if frequency is set, duration should be set",
                        );
                    }
                }
                _ => {
                    report.push(ResourceField::Amount, format!("amount unit should be {}", unit));
                }
            }
        }

        if let Some(frequency) = frequency {
            let magnitude = frequency.magnitude();
            if magnitude.is_nan() || magnitude <= 0.0 {
                report.push(ResourceField::Frequency, "frequency must be greater than zero");
            }
        }

        // rules satisfied, the combined quantity must still land on the source unit
        if report.is_valid() {
            let value = resource.value();
            match value.to(unit) {
                Err(_) => report.push(
                    ResourceField::Amount,
                    format!("resource quantity {} cannot be expressed in {}", value, unit),
                ),
                Ok(converted) if !converted.magnitude().is_finite() => report.push(
                    ResourceField::Amount,
                    format!("resource quantity {} is not finite", value),
                ),
                Ok(_) => {}
            }
        }

        if report.is_valid() {
            debug!("Resource {} is valid", resource.id);
        } else {
            warn!("Resource {} rejected: {}", resource.id, report);
        }
        report
    }

    /// Reports of every invalid resource in the tree
    pub fn validate_tree(&self, task: &Task) -> Vec<ValidationReport> {
        task.iter()
            .flat_map(|t| t.resources().iter())
            .map(|resource| self.validate(resource))
            .filter(|report| !report.is_valid())
            .collect()
    }
}
