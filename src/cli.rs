//! Command-line parsing for the sizing binary.

use anyhow::{anyhow, bail, Context, Result};
use solar_pump_lib::{ConfigData, Coordinate, PumpType};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: solar-pump-sizer <intake_lat> <intake_lon> <reservoir_lat> <reservoir_lon> \\
           --pump submerged|surface --depth <m> --tank <m> --flow <m3/h> \\
           [--offline <intake_elev>,<reservoir_elev>] [--json] [--config <path>]
       solar-pump-sizer --init-config   (write a default pump-config.toml)";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub intake: Coordinate,
    pub reservoir: Coordinate,
    pub pump: ConfigData,
    /// Known elevations (intake, reservoir) instead of querying the service
    pub offline: Option<(f64, f64)>,
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

/// Parse `args` (program name first, as from `std::env::args`).
pub fn parse(args: &[String]) -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut pump_type = None;
    let mut depth = None;
    let mut tank = None;
    let mut flow = None;
    let mut offline = None;
    let mut json = false;
    let mut config_path = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| anyhow!("missing value for {name}"))
        };
        match arg.as_str() {
            "--pump" => pump_type = Some(value("--pump")?.parse::<PumpType>()?),
            "--depth" => depth = Some(parse_number(&value("--depth")?, "--depth")?),
            "--tank" => tank = Some(parse_number(&value("--tank")?, "--tank")?),
            "--flow" => flow = Some(parse_number(&value("--flow")?, "--flow")?),
            "--offline" => offline = Some(parse_pair(&value("--offline")?)?),
            "--config" => config_path = Some(PathBuf::from(value("--config")?)),
            "--json" => json = true,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => positional.push(parse_number(arg, "coordinate")?),
        }
    }

    let &[intake_lat, intake_lon, reservoir_lat, reservoir_lon] = positional.as_slice() else {
        bail!("expected 4 coordinates, got {}", positional.len());
    };

    // Every form field is required before the configuration is accepted
    let pump = ConfigData::new(
        pump_type.ok_or_else(|| anyhow!("--pump is required"))?,
        depth.ok_or_else(|| anyhow!("--depth is required"))?,
        tank.ok_or_else(|| anyhow!("--tank is required"))?,
        flow.ok_or_else(|| anyhow!("--flow is required"))?,
    )?;

    Ok(CliArgs {
        intake: Coordinate::new(intake_lat, intake_lon)?,
        reservoir: Coordinate::new(reservoir_lat, reservoir_lon)?,
        pump,
        offline,
        json,
        config_path,
    })
}

fn parse_number(text: &str, what: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .with_context(|| format!("invalid number for {what}: {text:?}"))
}

fn parse_pair(text: &str) -> Result<(f64, f64)> {
    let (a, b) = text
        .split_once(',')
        .ok_or_else(|| anyhow!("--offline expects two comma-separated elevations"))?;
    Ok((parse_number(a, "--offline")?, parse_number(b, "--offline")?))
}
