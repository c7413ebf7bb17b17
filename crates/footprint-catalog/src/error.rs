//! Catalogue errors

use footprint_domain::{FootprintError, ImpactCategory, ImpactSourceId};
use thiserror::Error;

/// Errors that can occur while loading a catalogue
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Domain error (malformed quantity, unit mismatch, ...)
    #[error("Domain error: {0}")]
    Domain(#[from] FootprintError),

    /// Two records share an id
    #[error("Duplicate impact source id: {0}")]
    DuplicateId(ImpactSourceId),

    /// Catalogue document could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalogue file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Records parsed but do not form a consistent catalogue
    #[error("Catalogue integrity check failed:\n{}", format_issues(.0))]
    Integrity(Vec<IntegrityIssue>),
}

/// One inconsistency found by the integrity check
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    /// A `uses` entry points at an id the catalogue does not contain
    #[error("{source_id} uses unknown impact source {missing}")]
    DanglingUsage {
        /// Consumer
        source_id: ImpactSourceId,
        /// Missing id
        missing: ImpactSourceId,
    },

    /// A `uses` chain loops back on itself
    #[error("uses cycle: {}", format_path(.path))]
    Cycle {
        /// Ids along the cycle, closed by the first one
        path: Vec<ImpactSourceId>,
    },

    /// A `uses` quantity cannot be expressed in the used source's unit
    #[error("{source_id} uses {used} with quantity '{quantity}', expected a quantity of '{expected}'")]
    UsageUnit {
        /// Consumer
        source_id: ImpactSourceId,
        /// Consumed source
        used: ImpactSourceId,
        /// Declared quantity
        quantity: String,
        /// Unit of the consumed source
        expected: String,
    },

    /// A category value is not expressed in a unit of the category's dimension
    #[error("{source_id} declares {category} in '{unit}', expected a quantity of '{expected}'")]
    CategoryUnit {
        /// Offending source
        source_id: ImpactSourceId,
        /// Category
        category: ImpactCategory,
        /// Declared unit
        unit: String,
        /// Category unit
        expected: String,
    },

    /// Electricity is not an energy
    #[error("{source_id} declares electricity '{value}', expected an energy")]
    ElectricityUnit {
        /// Offending source
        source_id: ImpactSourceId,
        /// Declared value
        value: String,
    },
}

fn format_path(path: &[ImpactSourceId]) -> String {
    path.iter()
        .map(ImpactSourceId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_issues(issues: &[IntegrityIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {}", issue))
        .collect::<Vec<_>>()
        .join("\n")
}
