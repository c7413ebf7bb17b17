//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use footprint_catalog::ImpactSourceRecord;
use footprint_domain::{EnvironmentalImpact, ImpactSourceImpact, Quantity, Unit};
use footprint_engine::{TaskImpact, ValidationReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the catalogue listing.
    pub fn format_sources(&self, records: &[ImpactSourceRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
            OutputFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if records.is_empty() {
                    return Ok(self.colorize("No impact sources found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Name", "Unit", "Uses", "Electricity"]);
                for record in records {
                    let uses = record
                        .uses
                        .iter()
                        .map(|u| u.impact_source_id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let electricity = record
                        .electricity
                        .as_ref()
                        .map(format_quantity)
                        .unwrap_or_default();
                    builder.push_record([
                        record.id.as_str(),
                        record.name.as_str(),
                        &record.unit.to_string(),
                        &uses,
                        &electricity,
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format the resolved impact of one unit of a source.
    pub fn format_source_impact(&self, unit: &Unit, breakdown: &ImpactSourceImpact) -> Result<String> {
        let one_unit = Quantity::new(1.0, unit.clone());
        let absolute = breakdown.multiplied_by(&one_unit).to_reduced_units();
        let total = absolute.total.in_category_units()?;

        match self.format {
            OutputFormat::Json => {
                let sub_impacts = absolute
                    .sub_impacts
                    .iter()
                    .map(|(id, sub)| -> Result<(String, serde_json::Value)> {
                        let summary = sub.total.in_category_units()?.summary()?;
                        Ok((id.to_string(), serde_json::to_value(summary)?))
                    })
                    .collect::<Result<serde_json::Map<_, _>>>()?;
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "impact_source_id": breakdown.impact_source_id,
                    "unit": unit.to_string(),
                    "impact": total.summary()?,
                    "own_impact": absolute.own_impact.in_category_units()?.summary()?,
                    "sub_impacts": sub_impacts,
                }))?)
            }
            OutputFormat::Quiet => self.summary_lines(&total),
            OutputFormat::Table => {
                let mut output = self.colorize(
                    &format!("{} per 1 {}", breakdown.impact_source_id, unit),
                    "cyan",
                );
                output.push('\n');
                output.push_str(&self.impact_table(&total)?);

                if !absolute.sub_impacts.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Uses", "Category", "Total"]);
                    for (id, sub) in &absolute.sub_impacts {
                        let sub_total = sub.total.in_category_units()?;
                        for category in sub_total.categories() {
                            builder.push_record([
                                id.as_str(),
                                category.label(),
                                &format_quantity(&sub_total.category_total(category)?),
                            ]);
                        }
                    }
                    output.push('\n');
                    output.push_str(&self.table(builder));
                }
                Ok(output)
            }
        }
    }

    /// Format an estimate.
    pub fn format_report(&self, report: &TaskImpact, by_source: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let subtasks = report
                    .subtasks
                    .iter()
                    .map(|(id, impact)| -> Result<(String, serde_json::Value)> {
                        Ok((id.to_string(), serde_json::to_value(impact.summary()?)?))
                    })
                    .collect::<Result<serde_json::Map<_, _>>>()?;
                let mut value = serde_json::json!({
                    "task_id": report.task_id,
                    "impact": report.summary()?,
                    "subtasks": subtasks,
                });
                if by_source {
                    value["resources"] = serde_json::to_value(report.resource_summaries()?)?;
                }
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => self.summary_lines(&report.total),
            OutputFormat::Table => {
                if report.total.is_empty() {
                    return Ok(self.colorize("No impact: the task has no resources.", "yellow"));
                }
                let mut output = self.impact_table(&report.total)?;

                if by_source {
                    let mut builder = Builder::default();
                    builder.push_record(["Impact source", "Category", "Total"]);
                    for (id, impact) in &report.resources {
                        for category in impact.categories() {
                            builder.push_record([
                                id.as_str(),
                                category.label(),
                                &format_quantity(&impact.category_total(category)?),
                            ]);
                        }
                    }
                    output.push('\n');
                    output.push_str(&self.table(builder));
                }
                Ok(output)
            }
        }
    }

    /// Format validation reports; `checked` is the number of resources inspected.
    pub fn format_validation(&self, reports: &[ValidationReport], checked: usize) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "checked": checked,
                "invalid": reports,
            }))?),
            OutputFormat::Quiet => Ok(reports
                .iter()
                .map(|r| r.resource_id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if reports.is_empty() {
                    return Ok(self.success(&format!("{} resource(s) valid", checked)));
                }
                let mut builder = Builder::default();
                builder.push_record(["Resource", "Field", "Problem"]);
                for report in reports {
                    let id = report.resource_id.to_string();
                    for error in &report.errors {
                        builder.push_record([&id[..8], error.field.as_str(), &error.message]);
                    }
                }
                Ok(format!(
                    "{}\n{}",
                    self.table(builder),
                    self.error(&format!("{} of {} resource(s) invalid", reports.len(), checked))
                ))
            }
        }
    }

    fn impact_table(&self, impact: &EnvironmentalImpact) -> Result<String> {
        let impact = impact.in_category_units()?;
        let mut builder = Builder::default();
        builder.push_record(["Category", "Manufacture", "Use", "Total"]);
        for (category, value) in impact.get_total() {
            builder.push_record([
                category.label(),
                &value.manufacture.as_ref().map(format_quantity).unwrap_or_default(),
                &value.usage.as_ref().map(format_quantity).unwrap_or_default(),
                &format_quantity(&impact.category_total(*category)?),
            ]);
        }
        Ok(self.table(builder))
    }

    fn summary_lines(&self, impact: &EnvironmentalImpact) -> Result<String> {
        Ok(impact
            .in_category_units()?
            .summary()?
            .iter()
            .map(|(category, summary)| format!("{} {} {}", category, summary.value, summary.unit))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Quantity rounded for display; tiny values switch to scientific notation.
pub fn format_quantity(quantity: &Quantity) -> String {
    let magnitude = quantity.magnitude();
    if magnitude != 0.0 && magnitude.abs() < 0.01 {
        format!("{:.3e} {}", magnitude, quantity.unit())
    } else {
        format!("{:.2} {}", magnitude, quantity.unit())
    }
}
