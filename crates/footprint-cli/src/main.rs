//! Footprint CLI - Command-line interface for the environmental impact engine.

use clap::Parser;
use footprint_catalog::Catalog;
use footprint_cli::commands;
use footprint_cli::{Cli, CliError, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        if let CliError::InvalidResources { output, .. } = &e {
            println!("{}", output);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> footprint_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::path()?,
    };
    let mut config = Config::load_from(&config_path)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    // Configuration commands never need a catalogue
    if let Command::Config(args) = cli.command {
        let output = commands::execute_config(args, &mut config, &config_path, &formatter)?;
        println!("{}", output);
        return Ok(());
    }

    let catalog = match cli.catalog.as_ref().or(config.catalog.as_ref()) {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };

    let output = match cli.command {
        Command::Sources(args) => commands::execute_sources(args, &catalog, &config, &formatter)?,
        Command::Estimate(args) => commands::execute_estimate(args, &catalog, &config, &formatter)?,
        Command::Validate(args) => commands::execute_validate(args, &catalog, &config, &formatter)?,
        Command::Config(_) => unreachable!(),
    };
    println!("{}", output);

    Ok(())
}
