use evac_rust::config::{Cli, Command, Config, PlaceMarkersArgs, SimulateArgs};
use evac_rust::scenario::Scenario;
use evac_rust::simulation::Simulation;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate(args) => simulate(&args),
        Command::PlaceMarkers(args) => place_markers(&args),
    }
}

fn simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let config = if let Some(config_file) = args.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("cannot read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(args)?;

    let report_path = config.report_path.clone();
    let mut simulation = Simulation::from_config(config).context("cannot initialize simulation")?;
    let report = simulation.run().context("simulation aborted")?;

    if let Some(report_path) = report_path {
        let written = report
            .write_json(&report_path)
            .with_context(|| format!("cannot write report: {report_path}"))?;
        if written {
            info!("Report written to {report_path}");
        } else {
            warn!("No step succeeded, report {report_path} not written");
        }
    }
    Ok(())
}

fn place_markers(args: &PlaceMarkersArgs) -> anyhow::Result<()> {
    let input_path = Path::new(&args.input_dir).join(&args.filename);
    let content = std::fs::read_to_string(&input_path)
        .with_context(|| format!("check if '{}' exists in '{}/'", args.filename, args.input_dir))?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let scenario = Scenario::place_markers(&content, &mut rng)
        .with_context(|| format!("cannot place markers into {}", input_path.display()))?;
    let written = scenario.write_to_dir(&args.filename, &args.output_dir)?;

    info!("Map successfully saved to: {}", written.display());
    info!("Human position ('!'): {:?}", scenario.start);
    info!("Exit position ('X'): {:?}", scenario.exit);
    Ok(())
}
