//! # Hydraulic Sizing
//!
//! Turns the confirmed geographic data and the pump configuration into the
//! sizing report shown on the result step.
//!
//! ## Model
//! The model is intentionally flat rather than a pipe-network solution:
//! - **Piping length**: straight-line distance plus a 10% routing margin
//! - **Static head**: uphill elevation gain + well depth + tank height
//!   (a downhill run contributes no lift)
//! - **Friction loss**: 10% of the static head, independent of pipe length or diameter
//! - **Real flow**: nominal flow derated by 10% for pump efficiency
//! - **Daily volume**: real flow over [`SUN_HOURS`] of full sun

use crate::{ConfigData, GeoData};
use serde::{Deserialize, Serialize};

/// Average daily hours of full-intensity sunlight
pub const SUN_HOURS: f64 = 5.5;

/// Multiplier applied to the straight-line distance for bends and fittings
pub const PIPING_MARGIN: f64 = 1.1;

/// Friction loss as a fraction of static head
pub const FRICTION_LOSS_RATIO: f64 = 0.1;

/// Fraction of the nominal flow a pump actually delivers
pub const PUMP_EFFICIENCY: f64 = 0.9;

/// Liters per cubic meter
const LITERS_PER_M3: f64 = 1000.0;

/// Result of a sizing calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Label of the selected pump type
    pub pump_type_label: String,
    /// Straight-line distance with routing margin, meters
    pub piping_length_m: f64,
    /// Elevation gain from intake to reservoir, never negative, meters
    pub geo_height_m: f64,
    /// Head the pump lifts against, ignoring friction, meters
    pub static_head_m: f64,
    /// Estimated friction loss, meters
    pub friction_loss_m: f64,
    /// Total manometric head (static head + friction loss), meters
    pub total_head_m: f64,
    /// Nominal flow in liters per hour
    pub nominal_flow_l_per_hour: f64,
    /// Derated flow in m³/h
    pub real_flow_m3_per_hour: f64,
    /// Derated flow in liters per hour
    pub real_flow_l_per_hour: f64,
    /// Liters produced on an average sunny day
    pub daily_volume_l: f64,
    /// Geographic input echoed back for display
    pub geo: GeoData,
}

/// Compute the sizing report.
///
/// Pure and total for validated inputs: the same inputs always produce the same report.
///
/// # Example
/// ```
/// use solar_pump_lib::hydraulics::compute;
/// use solar_pump_lib::{ConfigData, Coordinate, GeoData, PumpType, ResolvedPoint};
///
/// let geo = GeoData {
///     intake: ResolvedPoint { coordinate: Coordinate::new(-15.3260, -49.1173).unwrap(), elevation_m: 700.0 },
///     reservoir: ResolvedPoint { coordinate: Coordinate::new(-15.3200, -49.1100).unwrap(), elevation_m: 750.0 },
///     straight_line_distance_m: 1000.0,
/// };
/// let config = ConfigData::new(PumpType::Submerged, 10.0, 5.0, 2.0).unwrap();
///
/// let report = compute(&geo, &config);
/// assert_eq!(report.static_head_m, 65.0);
/// assert!((report.daily_volume_l - 9900.0).abs() < 1e-9);
/// ```
pub fn compute(geo: &GeoData, config: &ConfigData) -> Report {
    let piping_length_m = geo.straight_line_distance_m * PIPING_MARGIN;

    let geo_height_m = (geo.reservoir.elevation_m - geo.intake.elevation_m).max(0.0);
    let static_head_m = geo_height_m + config.well_depth_m + config.tank_height_m;

    let friction_loss_m = static_head_m * FRICTION_LOSS_RATIO;
    let total_head_m = static_head_m + friction_loss_m;

    let real_flow_m3_per_hour = config.flow_rate_m3_per_hour * PUMP_EFFICIENCY;
    let daily_volume_l = real_flow_m3_per_hour * SUN_HOURS * LITERS_PER_M3;

    Report {
        pump_type_label: config.pump_type.label().to_string(),
        piping_length_m,
        geo_height_m,
        static_head_m,
        friction_loss_m,
        total_head_m,
        nominal_flow_l_per_hour: config.flow_rate_m3_per_hour * LITERS_PER_M3,
        real_flow_m3_per_hour,
        real_flow_l_per_hour: real_flow_m3_per_hour * LITERS_PER_M3,
        daily_volume_l,
        geo: *geo,
    }
}

/// Compute the report only when both inputs are present.
///
/// Returns `None` ("unavailable") when either the geo data or the configuration
/// has not been provided yet.
pub fn compute_optional(geo: Option<&GeoData>, config: Option<&ConfigData>) -> Option<Report> {
    match (geo, config) {
        (Some(geo), Some(config)) => Some(compute(geo, config)),
        _ => None,
    }
}
