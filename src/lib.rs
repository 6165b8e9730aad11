//! # Solar Pump Sizer Core Library
//!
//! This library provides the data structures and engines behind the solar pump
//! sizing workflow: the user picks an intake point and a reservoir point on a map,
//! each point's elevation is looked up, and the geographic data is combined with
//! the pump configuration into a hydraulic sizing report.
//!
//! ## Data Flow
//! 1. **Map step**: clicks feed [`acquisition::PointAcquisitionController`], which
//!    issues elevation lookups and keeps the straight-line distance in sync
//! 2. **Config step**: a validated [`ConfigData`] is stored next to the confirmed
//!    [`GeoData`] in a [`session::SessionStore`]
//! 3. **Result step**: [`hydraulics::compute`] turns both into a [`hydraulics::Report`]
//!
//! ## Core Types
//! - [`Coordinate`]: a latitude/longitude pair, range-checked on construction
//! - [`GeoPoint`]: a selected point whose elevation may still be pending
//! - [`ResolvedPoint`]: a point with a known elevation
//! - [`GeoData`]: both resolved points plus their surface distance
//! - [`ConfigData`]: pump type, well depth, tank height and nominal flow

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod acquisition;
pub mod config;
pub mod distance;
pub mod elevation;
pub mod hydraulics;
pub mod renderer;
pub mod session;
pub mod workflow;

/// Rejected user input, caught before it reaches the engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Pump configuration failed the form rules
    #[error("invalid configuration: {0}")]
    InvalidConfigInput(&'static str),
}

/// A geographic position in decimal degrees.
///
/// # Example
/// ```
/// use solar_pump_lib::Coordinate;
///
/// let intake = Coordinate::new(-15.3260, -49.1173).unwrap();
/// assert_eq!(intake.latitude, -15.3260);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InputError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if lat_ok && lon_ok {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InputError::InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }
}

/// Unchecked wire form of a [`Coordinate`].
#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InputError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// A point selected on the map.
///
/// `elevation_m` is `None` while the elevation lookup is still in flight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub coordinate: Coordinate,
    pub elevation_m: Option<f64>,
}

impl GeoPoint {
    /// A freshly clicked point, elevation pending.
    pub fn pending(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            elevation_m: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.elevation_m.is_some()
    }

    /// The resolved form of this point, if its elevation is known.
    pub fn resolved(&self) -> Option<ResolvedPoint> {
        self.elevation_m.map(|elevation_m| ResolvedPoint {
            coordinate: self.coordinate,
            elevation_m,
        })
    }
}

/// A point whose elevation lookup has completed (or fallen back).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub coordinate: Coordinate,
    /// Elevation above sea level in meters
    pub elevation_m: f64,
}

/// Geographic input to the hydraulic calculation.
///
/// Both points are resolved by construction, so a `GeoData` never carries a
/// pending elevation or a partial distance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoData {
    /// Water source (well, river, spring)
    pub intake: ResolvedPoint,
    /// Destination tank
    pub reservoir: ResolvedPoint,
    /// Great-circle distance between the two points in meters
    pub straight_line_distance_m: f64,
}

impl GeoData {
    /// Build geo data from two resolved points, computing their distance.
    pub fn from_points(intake: ResolvedPoint, reservoir: ResolvedPoint) -> Self {
        Self {
            intake,
            reservoir,
            straight_line_distance_m: distance::distance(intake.coordinate, reservoir.coordinate),
        }
    }
}

/// Pump installation type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PumpType {
    /// Pump sits inside the well
    Submerged,
    /// Pump sits at ground level next to the intake
    Surface,
}

impl PumpType {
    /// Human-readable label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            PumpType::Submerged => "Submerged pump",
            PumpType::Surface => "Surface pump",
        }
    }
}

impl std::str::FromStr for PumpType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "submerged" => Ok(PumpType::Submerged),
            "surface" => Ok(PumpType::Surface),
            _ => Err(InputError::InvalidConfigInput(
                "pump type must be 'submerged' or 'surface'",
            )),
        }
    }
}

/// Pump and tank parameters entered on the configuration step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    pub pump_type: PumpType,
    /// Depth of the water level inside the well, meters (>= 0)
    pub well_depth_m: f64,
    /// Height of the tank above ground, meters (>= 0)
    pub tank_height_m: f64,
    /// Nominal pump flow in m³/h (> 0)
    pub flow_rate_m3_per_hour: f64,
}

impl ConfigData {
    /// Validate form input: depth and height non-negative, flow strictly positive.
    ///
    /// # Example
    /// ```
    /// use solar_pump_lib::{ConfigData, PumpType};
    ///
    /// assert!(ConfigData::new(PumpType::Surface, 10.0, 5.0, 2.0).is_ok());
    /// assert!(ConfigData::new(PumpType::Surface, -1.0, 5.0, 2.0).is_err());
    /// assert!(ConfigData::new(PumpType::Surface, 10.0, 5.0, 0.0).is_err());
    /// ```
    pub fn new(
        pump_type: PumpType,
        well_depth_m: f64,
        tank_height_m: f64,
        flow_rate_m3_per_hour: f64,
    ) -> Result<Self, InputError> {
        if !(well_depth_m.is_finite() && tank_height_m.is_finite() && flow_rate_m3_per_hour.is_finite())
        {
            return Err(InputError::InvalidConfigInput("values must be finite numbers"));
        }
        if well_depth_m < 0.0 || tank_height_m < 0.0 {
            return Err(InputError::InvalidConfigInput(
                "well depth and tank height cannot be negative",
            ));
        }
        if flow_rate_m3_per_hour <= 0.0 {
            return Err(InputError::InvalidConfigInput(
                "flow rate must be greater than zero",
            ));
        }
        Ok(Self {
            pump_type,
            well_depth_m,
            tank_height_m,
            flow_rate_m3_per_hour,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(-90.1, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_deserialized_coordinates_are_range_checked() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude":-15.326,"longitude":-49.1173}"#).unwrap();
        assert_eq!(ok, Coordinate::new(-15.326, -49.1173).unwrap());

        assert!(serde_json::from_str::<Coordinate>(r#"{"latitude":95.0,"longitude":0.0}"#).is_err());

        let geo = r#"{
            "intake": {"coordinate": {"latitude": 10.0, "longitude": 200.0}, "elevation_m": 1.0},
            "reservoir": {"coordinate": {"latitude": 10.0, "longitude": 20.0}, "elevation_m": 2.0},
            "straight_line_distance_m": 5.0
        }"#;
        assert!(serde_json::from_str::<GeoData>(geo).is_err());
    }

    #[test]
    fn test_pump_type_parsing_and_labels() {
        assert_eq!("Submerged".parse::<PumpType>(), Ok(PumpType::Submerged));
        assert_eq!(" surface ".parse::<PumpType>(), Ok(PumpType::Surface));
        assert!("jet".parse::<PumpType>().is_err());
        assert_eq!(PumpType::Surface.label(), "Surface pump");
    }

    #[test]
    fn test_pump_type_serializes_lowercase() {
        let json = serde_json::to_string(&PumpType::Submerged).unwrap();
        assert_eq!(json, "\"submerged\"");
    }

    #[test]
    fn test_config_data_accepts_zero_depth_and_height() {
        let config = ConfigData::new(PumpType::Submerged, 0.0, 0.0, 0.5).unwrap();
        assert_eq!(config.well_depth_m, 0.0);
        assert_eq!(config.tank_height_m, 0.0);
    }

    #[test]
    fn test_config_data_rejects_bad_input() {
        assert!(ConfigData::new(PumpType::Submerged, 1.0, -0.1, 1.0).is_err());
        assert!(ConfigData::new(PumpType::Submerged, 1.0, 1.0, -2.0).is_err());
        assert!(ConfigData::new(PumpType::Submerged, f64::INFINITY, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_geo_point_resolution() {
        let coordinate = Coordinate::new(-15.0, -49.0).unwrap();
        let mut point = GeoPoint::pending(coordinate);
        assert!(!point.is_resolved());
        assert!(point.resolved().is_none());

        point.elevation_m = Some(700.0);
        let resolved = point.resolved().unwrap();
        assert_eq!(resolved.elevation_m, 700.0);
        assert_eq!(resolved.coordinate, coordinate);
    }
}
