//! Task trees and their aggregation
//!
//! A [`Task`] owns its resources and subtasks; removing a task drops its whole
//! subtree. Aggregation walks the tree with an explicit stack, so depth is
//! bounded by memory rather than by the call stack, and resolves each impact
//! source at most once per walk.

use crate::error::EngineError;
use crate::ids::{ResourceId, TaskId};
use crate::report::TaskImpact;
use crate::resource::Resource;
use footprint_domain::{
    EnvironmentalImpact, FootprintError, ImpactCategory, ImpactConstants, ImpactSourceId,
    ImpactSourceRepository, Quantity,
};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Node of a task tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRecord")]
pub struct Task {
    /// Task id
    pub id: TaskId,
    /// Display name
    pub name: String,
    /// Parent task, `None` for a root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<TaskId>,
    resources: Vec<Resource>,
    subtasks: Vec<Task>,
}

#[derive(Deserialize)]
struct TaskRecord {
    #[serde(default)]
    id: TaskId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parent_task_id: Option<TaskId>,
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    subtasks: Vec<Task>,
}

// Parent links are derived from nesting, whatever the document said
impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let mut task = Task {
            id: record.id,
            name: record.name,
            parent_task_id: record.parent_task_id,
            resources: Vec::with_capacity(record.resources.len()),
            subtasks: Vec::with_capacity(record.subtasks.len()),
        };
        for resource in record.resources {
            task.add_resource(resource);
        }
        for subtask in record.subtasks {
            task.add_subtask(subtask);
        }
        task
    }
}

/// Pre-order iterator over a task and its descendants
pub struct TaskIter<'a> {
    stack: Vec<&'a Task>,
}

impl<'a> Iterator for TaskIter<'a> {
    type Item = &'a Task;

    fn next(&mut self) -> Option<Self::Item> {
        let task = self.stack.pop()?;
        self.stack.extend(task.subtasks.iter().rev());
        Some(task)
    }
}

impl Task {
    /// Empty task with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            parent_task_id: None,
            resources: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    /// Resources attached directly to this task
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Direct subtasks
    pub fn subtasks(&self) -> &[Task] {
        &self.subtasks
    }

    /// This task followed by every descendant, depth first
    pub fn iter(&self) -> TaskIter<'_> {
        TaskIter { stack: vec![self] }
    }

    /// Every resource of the subtree
    pub fn all_resources(&self) -> impl Iterator<Item = &Resource> {
        self.iter().flat_map(|task| task.resources.iter())
    }

    /// Attach a resource to this task
    pub fn add_resource(&mut self, mut resource: Resource) -> ResourceId {
        resource.parent_task_id = Some(self.id);
        let id = resource.id;
        self.resources.push(resource);
        id
    }

    /// Attach a subtask to this task
    pub fn add_subtask(&mut self, mut task: Task) -> TaskId {
        task.parent_task_id = Some(self.id);
        let id = task.id;
        self.subtasks.push(task);
        id
    }

    /// Task with `id` in this subtree
    pub fn find(&self, id: TaskId) -> Option<&Task> {
        self.iter().find(|task| task.id == id)
    }

    /// Mutable access to the task with `id` in this subtree
    pub fn find_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        let mut stack = vec![self];
        while let Some(task) = stack.pop() {
            if task.id == id {
                return Some(task);
            }
            stack.extend(task.subtasks.iter_mut());
        }
        None
    }

    /// Resource with `id` anywhere in this subtree
    pub fn find_resource(&self, id: ResourceId) -> Option<&Resource> {
        self.all_resources().find(|resource| resource.id == id)
    }

    /// Mutable access to the resource with `id` anywhere in this subtree
    pub fn find_resource_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        let mut stack = vec![self];
        while let Some(task) = stack.pop() {
            if let Some(resource) = task.resources.iter_mut().find(|r| r.id == id) {
                return Some(resource);
            }
            stack.extend(task.subtasks.iter_mut());
        }
        None
    }

    /// Detach the task with `id` from this subtree, together with its own subtree
    pub fn remove_subtask(&mut self, id: TaskId) -> Result<Task, EngineError> {
        if id == self.id {
            return Err(EngineError::RootTask(id));
        }
        let mut stack = vec![self];
        while let Some(task) = stack.pop() {
            if let Some(position) = task.subtasks.iter().position(|t| t.id == id) {
                let mut removed = task.subtasks.remove(position);
                removed.parent_task_id = None;
                info!(
                    "Removed task {} with {} descendant(s)",
                    id,
                    removed.iter().count() - 1
                );
                return Ok(removed);
            }
            stack.extend(task.subtasks.iter_mut());
        }
        Err(EngineError::TaskNotFound(id))
    }

    /// Detach the resource with `id` from this subtree
    pub fn remove_resource(&mut self, id: ResourceId) -> Result<Resource, EngineError> {
        let mut stack = vec![self];
        while let Some(task) = stack.pop() {
            if let Some(position) = task.resources.iter().position(|r| r.id == id) {
                let mut removed = task.resources.remove(position);
                removed.parent_task_id = None;
                info!("Removed resource {} from task {}", id, task.id);
                return Ok(removed);
            }
            stack.extend(task.subtasks.iter_mut());
        }
        Err(EngineError::ResourceNotFound(id))
    }

    /// Move the task `task_id` under `new_parent_id`
    ///
    /// Both must belong to this tree. The root cannot move, and a task cannot
    /// move under itself or one of its descendants.
    pub fn reparent(&mut self, task_id: TaskId, new_parent_id: TaskId) -> Result<(), EngineError> {
        if task_id == self.id {
            return Err(EngineError::RootTask(task_id));
        }
        let moving = self.find(task_id).ok_or(EngineError::TaskNotFound(task_id))?;
        if moving.find(new_parent_id).is_some() {
            return Err(EngineError::ReparentCycle {
                task_id,
                new_parent_id,
            });
        }
        if self.find(new_parent_id).is_none() {
            return Err(EngineError::TaskNotFound(new_parent_id));
        }

        let detached = self.remove_subtask(task_id)?;
        let parent = self
            .find_mut(new_parent_id)
            .ok_or(EngineError::TaskNotFound(new_parent_id))?;
        parent.add_subtask(detached);
        info!("Moved task {} under {}", task_id, new_parent_id);
        Ok(())
    }

    /// Deep copy with fresh task and resource ids, detached from any parent
    pub fn duplicate(&self) -> Task {
        let mut copy = Task::new(self.name.clone());
        for resource in &self.resources {
            copy.add_resource(resource.duplicate());
        }
        for subtask in &self.subtasks {
            copy.add_subtask(subtask.duplicate());
        }
        copy
    }

    /// Impact of every resource in the subtree, in category units
    pub fn get_environmental_impact<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<EnvironmentalImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let mut resolver = SourceResolver::new(repository, constants);
        let total = resolver.subtree_impact(self)?;
        debug!("Task {} aggregated over {} source(s)", self.id, resolver.resolved());
        Ok(total)
    }

    /// `manufacture + use` of one category over the subtree
    pub fn get_category_impact<R>(
        &self,
        category: ImpactCategory,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<Quantity, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let mut resolver = SourceResolver::new(repository, constants);
        let mut total = Quantity::zero(category.unit());
        for resource in self.all_resources() {
            let impact = resolver.resource_impact(resource)?;
            total = total.checked_add(&impact.category_total(category)?)?;
        }
        Ok(total)
    }

    /// Subtree impact grouped by the impact source of each resource
    pub fn get_impact_by_resource_type<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<BTreeMap<ImpactSourceId, EnvironmentalImpact>, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let mut resolver = SourceResolver::new(repository, constants);
        resolver.impact_by_source(self)
    }

    /// Total, per-subtask and per-source impact in one walk of the catalogue
    pub fn impact_report<R>(
        &self,
        repository: &R,
        constants: &ImpactConstants,
    ) -> Result<TaskImpact, FootprintError>
    where
        R: ImpactSourceRepository + ?Sized,
    {
        let mut resolver = SourceResolver::new(repository, constants);

        let resources = resolver.impact_by_source(self)?;
        let mut total = EnvironmentalImpact::new();
        for bucket in resources.values() {
            total.add(bucket)?;
        }

        let mut subtasks = BTreeMap::new();
        for subtask in &self.subtasks {
            subtasks.insert(subtask.id, resolver.subtree_impact(subtask)?);
        }

        Ok(TaskImpact {
            task_id: self.id,
            total,
            subtasks,
            resources,
        })
    }
}

// Per-unit impacts of the sources met during one aggregation
struct SourceResolver<'a, R: ?Sized> {
    repository: &'a R,
    constants: &'a ImpactConstants,
    per_unit: HashMap<ImpactSourceId, EnvironmentalImpact>,
}

impl<'a, R> SourceResolver<'a, R>
where
    R: ImpactSourceRepository + ?Sized,
{
    fn new(repository: &'a R, constants: &'a ImpactConstants) -> Self {
        Self {
            repository,
            constants,
            per_unit: HashMap::new(),
        }
    }

    fn resolved(&self) -> usize {
        self.per_unit.len()
    }

    fn resource_impact(&mut self, resource: &Resource) -> Result<EnvironmentalImpact, FootprintError> {
        let repository = self.repository;
        let source = repository.impact_source(resource.impact_source_id.as_str())?;
        let per_unit = match self.per_unit.entry(source.id.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("Resolving impact source {}", source.id);
                entry.insert(source.get_environmental_impact(repository, self.constants)?)
            }
        };
        resource.scale(source, per_unit)
    }

    fn subtree_impact(&mut self, task: &Task) -> Result<EnvironmentalImpact, FootprintError> {
        let mut total = EnvironmentalImpact::new();
        for resource in task.all_resources() {
            total.add(&self.resource_impact(resource)?)?;
        }
        Ok(total)
    }

    fn impact_by_source(
        &mut self,
        task: &Task,
    ) -> Result<BTreeMap<ImpactSourceId, EnvironmentalImpact>, FootprintError> {
        let mut buckets: BTreeMap<ImpactSourceId, EnvironmentalImpact> = BTreeMap::new();
        for resource in task.all_resources() {
            let impact = self.resource_impact(resource)?;
            buckets
                .entry(resource.impact_source_id.clone())
                .or_default()
                .add(&impact)?;
        }
        Ok(buckets)
    }
}
