//! Footprint Catalogue
//!
//! Loads impact sources from JSON records and serves them through the
//! `ImpactSourceRepository` trait. Loading is all-or-nothing: duplicate ids,
//! dangling `uses` references, `uses` cycles and impacts declared in the
//! wrong unit reject the whole catalogue.
//!
//! # Examples
//!
//! ```
//! use footprint_catalog::Catalog;
//! use footprint_domain::{ImpactConstants, ImpactSourceRepository};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let server = catalog.impact_source("server").unwrap();
//! let per_unit = server
//!     .get_environmental_impact(&catalog, &ImpactConstants::default())
//!     .unwrap();
//! assert!(!per_unit.is_empty());
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod record;

pub use catalog::Catalog;
pub use error::{CatalogError, IntegrityIssue};
pub use record::ImpactSourceRecord;
