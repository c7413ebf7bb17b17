//! Error types for the engine

use crate::ids::{ResourceId, TaskId};
use crate::validation::ValidationReport;
use footprint_domain::FootprintError;
use thiserror::Error;

/// Errors that can occur while mutating or estimating a task tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Domain error (unit mismatch, unknown source, cycle, ...)
    #[error(transparent)]
    Domain(#[from] FootprintError),

    /// A resource broke the dimensional consistency rules
    #[error("Validation error: {0}")]
    Validation(ValidationReport),

    /// No task with this id in the tree
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// No resource with this id in the tree
    #[error("Resource not found: {0}")]
    ResourceNotFound(ResourceId),

    /// The root task cannot be removed or moved
    #[error("Operation not allowed on the root task {0}")]
    RootTask(TaskId),

    /// Moving the task would make it its own ancestor
    #[error("Cannot move task {task_id} under {new_parent_id}: it would become its own ancestor")]
    ReparentCycle {
        /// Task being moved
        task_id: TaskId,
        /// Requested parent
        new_parent_id: TaskId,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
