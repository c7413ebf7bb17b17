//! Estimator: validated mutations and estimates over a catalogue

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::ids::{ResourceId, TaskId};
use crate::report::TaskImpact;
use crate::resource::Resource;
use crate::task::Task;
use crate::validation::{ResourceValidator, ValidationReport};
use footprint_domain::{EnvironmentalImpact, ImpactCategory, ImpactSourceRepository, Quantity};
use tracing::{debug, info};

/// Entry point of the engine
///
/// Binds a catalogue to an [`EngineConfig`], validates resources on their
/// way into a tree and computes estimates with the configured constants.
pub struct Estimator<'a, R: ?Sized> {
    repository: &'a R,
    config: EngineConfig,
}

impl<'a, R> Estimator<'a, R>
where
    R: ImpactSourceRepository + ?Sized,
{
    /// Create an estimator, rejecting an invalid configuration
    pub fn new(repository: &'a R, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::Config)?;
        debug!(
            "Estimator ready (pue {}, electricity mix {})",
            config.constants.pue, config.constants.electricity_mix
        );
        Ok(Self { repository, config })
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn validator(&self) -> ResourceValidator<'a, R> {
        ResourceValidator::new(self.repository)
    }

    /// Validation report of one resource
    pub fn validate_resource(&self, resource: &Resource) -> ValidationReport {
        self.validator().validate(resource)
    }

    /// Reports of every invalid resource of a tree
    pub fn validate_tree(&self, task: &Task) -> Vec<ValidationReport> {
        self.validator().validate_tree(task)
    }

    fn ensure_valid(&self, resource: &Resource) -> Result<(), EngineError> {
        let report = self.validate_resource(resource);
        if report.is_valid() {
            Ok(())
        } else {
            Err(EngineError::Validation(report))
        }
    }

    /// Attach `resource` to the task `parent_id` of `tree`
    pub fn add_resource(
        &self,
        tree: &mut Task,
        parent_id: TaskId,
        resource: Resource,
    ) -> Result<ResourceId, EngineError> {
        if self.config.validate_on_insert {
            self.ensure_valid(&resource)?;
        }
        let parent = tree
            .find_mut(parent_id)
            .ok_or(EngineError::TaskNotFound(parent_id))?;
        let id = parent.add_resource(resource);
        info!("Added resource {} to task {}", id, parent_id);
        Ok(id)
    }

    /// Replace the resource with the same id, keeping its position in the tree
    pub fn update_resource(&self, tree: &mut Task, mut resource: Resource) -> Result<(), EngineError> {
        if self.config.validate_on_insert {
            self.ensure_valid(&resource)?;
        }
        let existing = tree
            .find_resource_mut(resource.id)
            .ok_or(EngineError::ResourceNotFound(resource.id))?;
        resource.parent_task_id = existing.parent_task_id;
        *existing = resource;
        info!("Updated resource {}", existing.id);
        Ok(())
    }

    /// Impact of one resource
    pub fn resource_impact(&self, resource: &Resource) -> Result<EnvironmentalImpact, EngineError> {
        Ok(resource.get_environmental_impact(self.repository, &self.config.constants)?)
    }

    /// One category of a subtree
    pub fn category_impact(&self, task: &Task, category: ImpactCategory) -> Result<Quantity, EngineError> {
        Ok(task.get_category_impact(category, self.repository, &self.config.constants)?)
    }

    /// Full report of a subtree
    pub fn estimate(&self, task: &Task) -> Result<TaskImpact, EngineError> {
        if self.config.validate_on_estimate {
            if let Some(report) = self.validate_tree(task).into_iter().next() {
                return Err(EngineError::Validation(report));
            }
        }
        let report = task.impact_report(self.repository, &self.config.constants)?;
        info!(
            "Estimated task {} over {} resource(s) and {} source type(s)",
            task.id,
            task.all_resources().count(),
            report.resources.len()
        );
        Ok(report)
    }
}
