//! Estimate command implementation.

use super::load_task;
use crate::cli::EstimateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use footprint_catalog::Catalog;
use footprint_engine::Estimator;

/// Execute the estimate command.
pub fn execute_estimate(
    args: EstimateArgs,
    catalog: &Catalog,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    let mut engine_config = config.engine.clone();
    if args.strict {
        engine_config.validate_on_estimate = true;
    }
    if let Some(pue) = args.pue {
        engine_config.constants.pue = pue;
    }

    let estimator = Estimator::new(catalog, engine_config)?;
    let task = load_task(&args.file)?;
    let report = estimator.estimate(&task)?;
    formatter.format_report(&report, args.by_source)
}
