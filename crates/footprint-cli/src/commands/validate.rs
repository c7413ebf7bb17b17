//! Validate command implementation.

use super::load_task;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use footprint_catalog::Catalog;
use footprint_engine::Estimator;

/// Execute the validate command.
///
/// Fails with [`CliError::InvalidResources`], carrying the formatted reports,
/// when any resource is invalid.
pub fn execute_validate(
    args: ValidateArgs,
    catalog: &Catalog,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    let estimator = Estimator::new(catalog, config.engine.clone())?;
    let task = load_task(&args.file)?;
    let checked = task.all_resources().count();
    let reports = estimator.validate_tree(&task);
    let output = formatter.format_validation(&reports, checked)?;

    if reports.is_empty() {
        Ok(output)
    } else {
        Err(CliError::InvalidResources {
            task: task.name,
            count: reports.len(),
            output,
        })
    }
}
