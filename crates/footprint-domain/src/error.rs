//! Domain error taxonomy

use crate::source::ImpactSourceId;
use thiserror::Error;

/// A serialized quantity or unit expression could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse '{input}': {reason}")]
pub struct ParseError {
    /// The offending input
    pub input: String,
    /// What went wrong
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Arithmetic or conversion between quantities of incompatible dimensions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert from '{from}' ({from_dimension}) to '{to}' ({to_dimension})")]
pub struct DimensionalityError {
    /// Unit of the left-hand (or source) operand
    pub from: String,
    /// Dimension of the left-hand operand
    pub from_dimension: String,
    /// Unit of the right-hand (or target) operand
    pub to: String,
    /// Dimension of the right-hand operand
    pub to_dimension: String,
}

/// Errors raised while computing environmental impacts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FootprintError {
    /// Malformed serialized quantity
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Incompatible units
    #[error(transparent)]
    Dimensionality(#[from] DimensionalityError),

    /// Referenced impact source is absent from the catalogue
    #[error("No corresponding impact source: {0}")]
    UnknownImpactSource(ImpactSourceId),

    /// A `uses` chain revisits a source that is still being resolved
    #[error("Impact source cycle detected: {}", format_path(.path))]
    ImpactSourceCycle {
        /// Sources on the resolution stack, closed by the revisited one
        path: Vec<ImpactSourceId>,
    },

    /// Duration, frequency and period only accept `[time]` quantities
    #[error("{field} must be a quantity with a dimensionality of [time], got '{value}'")]
    InvalidTimeQuantity {
        /// Resource field name
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// A resource quantity evaluated to infinity or NaN, e.g. through a zero frequency
    #[error("resource quantity '{0}' is not finite")]
    NonFiniteQuantity(String),
}

fn format_path(path: &[ImpactSourceId]) -> String {
    path.iter()
        .map(ImpactSourceId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
