//! # Solar Pump Sizer Entry Point
//!
//! Runs one sizing session from the command line: selects the intake and the
//! reservoir, resolves both elevations (online, or from `--offline` values),
//! stores the validated pump configuration and prints the sizing report.


mod cli;

use anyhow::{anyhow, Context};
use solar_pump_lib::acquisition::PointAcquisitionController;
use solar_pump_lib::config::{Config, CONFIG_FILE};
use solar_pump_lib::elevation::{ElevationResolver, OpenElevationClient, StaticElevations};
use solar_pump_lib::hydraulics::Report;
use solar_pump_lib::renderer::{describe_event, draw_ascii};
use solar_pump_lib::session::{SessionStore, Step};
use solar_pump_lib::workflow::acquire_points;
use std::env;
use tracing_subscriber::EnvFilter;

/// Drive the map → config → result steps for one session.
pub async fn run_session<R: ElevationResolver>(
    args: &cli::CliArgs,
    config: &Config,
    resolver: &R,
) -> anyhow::Result<Report> {
    let mut session = SessionStore::new();
    let mut controller = PointAcquisitionController::new(config.elevation.fallback);

    // Map step
    let geo = acquire_points(&mut controller, resolver, args.intake, args.reservoir).await;
    for event in controller.drain_events() {
        eprintln!("{}", describe_event(&event));
    }
    session.set_geo(geo?);

    // Config step
    if let Some(step) = session.redirect_for(Step::Config) {
        return Err(anyhow!("cannot configure the pump yet, back to {step:?}"));
    }
    session.set_config(args.pump);

    // Result step
    if let Some(step) = session.redirect_for(Step::Result) {
        return Err(anyhow!("cannot show results yet, back to {step:?}"));
    }
    session
        .report()
        .ok_or_else(|| anyhow!("sizing report unavailable"))
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = env::args().collect();
    if raw.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", cli::USAGE);
        return Ok(());
    }
    if raw.iter().any(|arg| arg == "--init-config") {
        Config::default()
            .save()
            .map_err(|e| anyhow!("failed to write configuration: {e}"))?;
        println!("Wrote default configuration to {CONFIG_FILE}");
        return Ok(());
    }
    let args = match cli::parse(&raw) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e:#}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(2);
        }
    };

    let config = match &args.config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    // Create Tokio runtime for the elevation lookups
    let rt = tokio::runtime::Runtime::new()?;

    let report = match args.offline {
        Some((intake_m, reservoir_m)) => {
            let table = StaticElevations::new()
                .with(args.intake, intake_m)
                .with(args.reservoir, reservoir_m);
            rt.block_on(run_session(&args, &config, &table))?
        }
        None => {
            let client = OpenElevationClient::new(
                &config.elevation.endpoint,
                config.elevation.timeout(),
            )
            .context("failed to create elevation client")?;
            rt.block_on(run_session(&args, &config, &client))?
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        draw_ascii(&report);
    }

    Ok(())
}
