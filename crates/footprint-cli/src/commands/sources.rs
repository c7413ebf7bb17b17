//! Sources command implementation.

use crate::cli::SourcesArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use footprint_catalog::Catalog;
use footprint_domain::ImpactSourceRepository;

/// Execute the sources command.
pub fn execute_sources(
    args: SourcesArgs,
    catalog: &Catalog,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    match args.id {
        None => formatter.format_sources(&catalog.records()),
        Some(id) => {
            let source = catalog.impact_source(&id)?;
            let breakdown = source.impact_breakdown(catalog, &config.engine.constants)?;
            formatter.format_source_impact(&source.unit, &breakdown)
        }
    }
}
