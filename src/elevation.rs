//! # Elevation Lookup
//!
//! Resolves a coordinate to an elevation in meters. The acquisition controller
//! only depends on the [`ElevationResolver`] trait; this module provides:
//! - [`OpenElevationClient`]: HTTP client for Open-Elevation compatible services
//! - [`StaticElevations`]: fixed table of known points, for offline runs and tests
//!
//! ## Failure Policy
//! A failed lookup never leaves the workflow stuck. [`FallbackPolicy`] decides
//! whether the point resolves to a fixed fallback elevation or is dropped so the
//! user can pick it again.
//!
//! ## Wire Format
//! ```text
//! GET {endpoint}?locations=-15.326,-49.1173
//! {"results": [{"latitude": -15.326, "longitude": -49.1173, "elevation": 701.0}]}
//! ```

use crate::Coordinate;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from an elevation lookup.
#[derive(Error, Debug)]
pub enum ElevationError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("elevation service returned status {0}")]
    Status(u16),

    /// Response parsed but held no usable elevation
    #[error("elevation response had no usable result")]
    EmptyResponse,

    /// Offline table has no entry for the coordinate
    #[error("no elevation known for ({0})")]
    NotFound(Coordinate),
}

/// What to do when an elevation lookup fails.
///
/// Written as a table (`{ policy = "fallback", meters = 0.0 }`,
/// `{ policy = "fail" }`) or as a bare name (`"fail"`, or `"fallback"` for 0 m).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Resolve the point with a fixed elevation and carry on
    Fallback { meters: f64 },
    /// Drop the point from its slot so it can be selected again
    Fail,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Fallback { meters: 0.0 }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PolicySpelling {
    Name(String),
    Table(PolicyTable),
}

#[derive(Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
enum PolicyTable {
    Fallback {
        #[serde(default)]
        meters: f64,
    },
    Fail,
}

impl<'de> Deserialize<'de> for FallbackPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PolicySpelling::deserialize(deserializer)? {
            PolicySpelling::Name(name) => match name.as_str() {
                "fallback" => Ok(FallbackPolicy::default()),
                "fail" => Ok(FallbackPolicy::Fail),
                other => Err(de::Error::unknown_variant(other, &["fallback", "fail"])),
            },
            PolicySpelling::Table(PolicyTable::Fallback { meters }) => {
                Ok(FallbackPolicy::Fallback { meters })
            }
            PolicySpelling::Table(PolicyTable::Fail) => Ok(FallbackPolicy::Fail),
        }
    }
}

/// Source of elevation data for a coordinate.
#[allow(async_fn_in_trait)]
pub trait ElevationResolver {
    /// Elevation above sea level in meters.
    async fn elevation(&self, coordinate: Coordinate) -> Result<f64, ElevationError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: Option<f64>,
}

/// HTTP resolver for services speaking the Open-Elevation lookup API.
#[derive(Debug, Clone)]
pub struct OpenElevationClient {
    endpoint: String,
    client: reqwest::Client,
}

impl OpenElevationClient {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ElevationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Service endpoint this client queries.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn lookup_url(&self, coordinate: Coordinate) -> String {
        format!(
            "{}?locations={},{}",
            self.endpoint, coordinate.latitude, coordinate.longitude
        )
    }
}

impl ElevationResolver for OpenElevationClient {
    async fn elevation(&self, coordinate: Coordinate) -> Result<f64, ElevationError> {
        let url = self.lookup_url(coordinate);
        debug!(%url, "requesting elevation");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ElevationError::Status(status.as_u16()));
        }

        let body: LookupResponse = response.json().await?;
        parse_elevation(body)
    }
}

fn parse_elevation(body: LookupResponse) -> Result<f64, ElevationError> {
    body.results
        .first()
        .and_then(|result| result.elevation)
        .filter(|meters| meters.is_finite())
        .ok_or(ElevationError::EmptyResponse)
}

/// Resolver backed by a fixed table of coordinates.
///
/// # Example
/// ```
/// use solar_pump_lib::elevation::StaticElevations;
/// use solar_pump_lib::Coordinate;
///
/// let intake = Coordinate::new(-15.3260, -49.1173).unwrap();
/// let table = StaticElevations::new().with(intake, 700.0);
/// assert_eq!(table.lookup(intake), Some(700.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticElevations {
    entries: Vec<(Coordinate, f64)>,
}

impl StaticElevations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the elevation of `coordinate`.
    pub fn with(mut self, coordinate: Coordinate, meters: f64) -> Self {
        self.entries.retain(|(known, _)| *known != coordinate);
        self.entries.push((coordinate, meters));
        self
    }

    pub fn lookup(&self, coordinate: Coordinate) -> Option<f64> {
        self.entries
            .iter()
            .find(|(known, _)| *known == coordinate)
            .map(|(_, meters)| *meters)
    }
}

impl ElevationResolver for StaticElevations {
    async fn elevation(&self, coordinate: Coordinate) -> Result<f64, ElevationError> {
        self.lookup(coordinate)
            .ok_or(ElevationError::NotFound(coordinate))
    }
}
