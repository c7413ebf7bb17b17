//! Footprint Domain Layer
//!
//! Pure model of environmental impacts: dimensioned quantities, impact
//! categories, per-category impact values and the catalogue of impact
//! sources with their recursive resolution. No I/O and no logging happen
//! here; loading the catalogue and aggregating task trees live in other crates.
//!
//! ## Key Concepts
//!
//! - **Quantity**: a magnitude with a unit expression; adding incompatible
//!   dimensions is an error, never a silent coercion
//! - **Impact category**: an environmental indicator bound to one unit
//! - **ImpactValue**: embodied (`manufacture`) and operational (`use`) split
//! - **EnvironmentalImpact**: per-category values with commutative merge
//! - **ImpactSource**: footprint of one unit of an activity, possibly defined
//!   through the consumption of other sources

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod constants;
pub mod error;
pub mod impact;
pub mod quantity;
pub mod source;
pub mod traits;
pub mod unit;
pub mod units;

// Re-exports for convenience
pub use category::ImpactCategory;
pub use constants::ImpactConstants;
pub use error::{DimensionalityError, FootprintError, ParseError};
pub use impact::{CategorySummary, EnvironmentalImpact, ImpactSummary, ImpactValue};
pub use quantity::Quantity;
pub use source::{ImpactSource, ImpactSourceId, ImpactSourceImpact, ImpactSourceUsage};
pub use traits::ImpactSourceRepository;
pub use unit::{aliases, Unit};
pub use units::{BaseDimension, Dimension};
