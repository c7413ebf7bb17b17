//! Command implementations.
//!
//! Each command returns the text to print so that callers decide where it goes.

pub mod config;
pub mod estimate;
pub mod sources;
pub mod validate;

pub use self::config::execute_config;
pub use self::estimate::execute_estimate;
pub use self::sources::execute_sources;
pub use self::validate::execute_validate;

use crate::error::Result;
use footprint_engine::Task;
use std::io::Read;
use std::path::Path;

/// Read a task tree document; `-` reads standard input.
pub fn load_task(path: &Path) -> Result<Task> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        raw
    } else {
        std::fs::read_to_string(path)?
    };
    let task: Task = serde_json::from_str(&raw)?;
    tracing::debug!("Loaded task '{}' from {}", task.name, path.display());
    Ok(task)
}
