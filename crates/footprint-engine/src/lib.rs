//! Footprint Engine
//!
//! Aggregates the environmental impact of task trees.
//!
//! The engine provides:
//! - Resources: consumption of an impact source over time
//! - Task trees with add/remove/reparent/duplicate mutations
//! - Aggregation by tree position and by impact source type
//! - Dimensional validation of resources before they enter a tree
//!
//! # Examples
//!
//! ```
//! use footprint_catalog::Catalog;
//! use footprint_domain::{ImpactCategory, Quantity};
//! use footprint_engine::{EngineConfig, Estimator, Resource, Task};
//!
//! let catalog = Catalog::builtin().unwrap();
//! let estimator = Estimator::new(&catalog, EngineConfig::default()).unwrap();
//!
//! let mut project = Task::new("Hosting");
//! let root = project.id;
//! let servers = Resource::new("Servers", "server", "2 server".parse::<Quantity>().unwrap())
//!     .with_period("1 year".parse().unwrap())
//!     .unwrap();
//! estimator.add_resource(&mut project, root, servers).unwrap();
//!
//! let report = estimator.estimate(&project).unwrap();
//! let climate = report.total.category_total(ImpactCategory::ClimateChange).unwrap();
//! assert!(climate.magnitude() > 0.0);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod estimator;
pub mod ids;
pub mod report;
pub mod resource;
pub mod task;
pub mod validation;

pub use config::EngineConfig;
pub use error::EngineError;
pub use estimator::Estimator;
pub use ids::{ResourceId, TaskId};
pub use report::TaskImpact;
pub use resource::Resource;
pub use task::{Task, TaskIter};
pub use validation::{FieldError, ResourceField, ResourceValidator, ValidationReport};
