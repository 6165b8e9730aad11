//! # Point Acquisition
//!
//! State machine behind the map step. The user selects exactly two points, the
//! intake and the reservoir; each point's elevation is looked up asynchronously
//! and the straight-line distance is recomputed as soon as both are known.
//!
//! ## States
//! ```text
//! Empty --add--> OneSelected --add--> TwoSelected
//!   ^               |    ^                 |
//!   +----remove-----+    +-----remove------+
//! any state --clear--> Empty        any state --restore--> TwoSelected
//! ```
//!
//! ## Lookups and Stale Results
//! The controller performs no I/O. [`PointAcquisitionController::add_point`] hands
//! back an [`ElevationTicket`]; the caller runs the lookup and passes the outcome to
//! [`PointAcquisitionController::apply_elevation`]. Every ticket carries the token
//! of the point it was issued for. A result is only applied when that token still
//! occupies the ticket's slot, so removing, clearing or re-adding a point while its
//! lookup is in flight discards the late result instead of corrupting a newer point.

use crate::elevation::{ElevationError, FallbackPolicy};
use crate::{distance, Coordinate, GeoData, GeoPoint, ResolvedPoint};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Which of the two points a value refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    /// Water source
    Intake,
    /// Destination tank
    Reservoir,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::Intake => Slot::Reservoir,
            Slot::Reservoir => Slot::Intake,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Intake => f.write_str("intake"),
            Slot::Reservoir => f.write_str("reservoir"),
        }
    }
}

/// Identity of one selected point. Never reused within a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointToken(u64);

/// A selected point together with its identity token.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackedPoint {
    pub point: GeoPoint,
    token: PointToken,
}

/// Current selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AcquisitionState {
    Empty,
    OneSelected {
        slot: Slot,
        point: TrackedPoint,
    },
    TwoSelected {
        intake: TrackedPoint,
        reservoir: TrackedPoint,
    },
}

/// Coarse view of [`AcquisitionState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    OneSelected,
    TwoSelected,
}

/// An elevation lookup the caller must perform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElevationTicket {
    pub slot: Slot,
    pub token: PointToken,
    pub coordinate: Coordinate,
}

/// What happened to a lookup result handed to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The point's elevation was set
    Applied,
    /// The point was removed or replaced since the ticket was issued; result dropped
    Stale,
}

/// Notifications for the map renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum AcquisitionEvent {
    PointAdded {
        slot: Slot,
        coordinate: Coordinate,
    },
    ElevationResolved {
        slot: Slot,
        elevation_m: f64,
        /// True when the fallback elevation was used after a failed lookup
        fallback: bool,
    },
    PointRemoved {
        slot: Slot,
    },
    DistanceUpdated {
        distance_m: f64,
    },
    Restored(GeoData),
    Cleared,
}

/// Rejected acquisition operations. None of these mutate the selection,
/// except a failed lookup under [`FallbackPolicy::Fail`], which drops the point.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// Operation needs a state the controller is not in
    #[error("precondition not met: {0}")]
    PreconditionNotMet(&'static str),

    /// Two points are already selected
    #[error("two points are already selected, remove one before adding another")]
    DuplicateSelection,

    /// Lookup failed and the policy is to drop the point
    #[error("elevation lookup for the {slot} point failed: {source}")]
    ElevationLookupFailed {
        slot: Slot,
        #[source]
        source: ElevationError,
    },
}

/// Owner of the two-point selection workflow.
///
/// # Example
/// ```
/// use solar_pump_lib::acquisition::{Phase, PointAcquisitionController};
/// use solar_pump_lib::Coordinate;
///
/// let mut controller = PointAcquisitionController::default();
/// let intake = controller.add_point(Coordinate::new(-15.3260, -49.1173).unwrap()).unwrap();
/// let reservoir = controller.add_point(Coordinate::new(-15.3200, -49.1100).unwrap()).unwrap();
///
/// // Results may arrive in any order
/// controller.apply_elevation(reservoir, Ok(750.0)).unwrap();
/// assert_eq!(controller.distance_m(), 0.0);
/// controller.apply_elevation(intake, Ok(700.0)).unwrap();
///
/// assert_eq!(controller.phase(), Phase::TwoSelected);
/// let geo = controller.confirm().unwrap();
/// assert_eq!(geo.reservoir.elevation_m - geo.intake.elevation_m, 50.0);
/// ```
#[derive(Debug)]
pub struct PointAcquisitionController {
    state: AcquisitionState,
    distance_m: f64,
    next_token: u64,
    fallback: FallbackPolicy,
    // Grows until drain_events() is called
    events: Vec<AcquisitionEvent>,
}

impl Default for PointAcquisitionController {
    fn default() -> Self {
        Self::new(FallbackPolicy::default())
    }
}

impl PointAcquisitionController {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self {
            state: AcquisitionState::Empty,
            distance_m: 0.0,
            next_token: 0,
            fallback,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            AcquisitionState::Empty => Phase::Empty,
            AcquisitionState::OneSelected { .. } => Phase::OneSelected,
            AcquisitionState::TwoSelected { .. } => Phase::TwoSelected,
        }
    }

    /// Straight-line distance in meters; 0 until both elevations are resolved.
    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// The point occupying `slot`, if any.
    pub fn point(&self, slot: Slot) -> Option<&GeoPoint> {
        self.tracked(slot).map(|tracked| &tracked.point)
    }

    /// Take all notifications queued since the last call.
    ///
    /// The queue is unbounded: every operation appends to it until the renderer
    /// drains it, so callers should drain after each user action.
    pub fn drain_events(&mut self) -> Vec<AcquisitionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Select a point. The intake slot is filled first, then whichever slot is vacant.
    ///
    /// Returns the lookup the caller must run for the new point, or
    /// [`AcquisitionError::DuplicateSelection`] when two points are already selected.
    pub fn add_point(&mut self, coordinate: Coordinate) -> Result<ElevationTicket, AcquisitionError> {
        let slot = match self.state {
            AcquisitionState::Empty => Slot::Intake,
            AcquisitionState::OneSelected { slot, .. } => slot.other(),
            AcquisitionState::TwoSelected { .. } => {
                warn!(%coordinate, "ignoring click, two points already selected");
                return Err(AcquisitionError::DuplicateSelection);
            }
        };

        let tracked = TrackedPoint {
            point: GeoPoint::pending(coordinate),
            token: self.issue_token(),
        };

        self.state = match self.state {
            AcquisitionState::OneSelected { slot: held, point } => match held {
                Slot::Intake => AcquisitionState::TwoSelected {
                    intake: point,
                    reservoir: tracked,
                },
                Slot::Reservoir => AcquisitionState::TwoSelected {
                    intake: tracked,
                    reservoir: point,
                },
            },
            _ => AcquisitionState::OneSelected {
                slot,
                point: tracked,
            },
        };

        info!(%slot, %coordinate, "point added");
        self.events.push(AcquisitionEvent::PointAdded { slot, coordinate });

        Ok(ElevationTicket {
            slot,
            token: tracked.token,
            coordinate,
        })
    }

    /// Record the outcome of the lookup described by `ticket`.
    ///
    /// Failed lookups follow the controller's [`FallbackPolicy`]. Once both points
    /// are resolved the distance is recomputed immediately.
    pub fn apply_elevation(
        &mut self,
        ticket: ElevationTicket,
        result: Result<f64, ElevationError>,
    ) -> Result<ApplyOutcome, AcquisitionError> {
        let fallback = self.fallback;
        let Some(tracked) = self.tracked_mut(ticket.slot) else {
            debug!(slot = %ticket.slot, "discarding elevation for an empty slot");
            return Ok(ApplyOutcome::Stale);
        };
        if tracked.token != ticket.token || tracked.point.is_resolved() {
            debug!(slot = %ticket.slot, "discarding stale elevation result");
            return Ok(ApplyOutcome::Stale);
        }

        let (elevation_m, used_fallback) = match result {
            Ok(meters) => (meters, false),
            Err(source) => match fallback {
                FallbackPolicy::Fallback { meters } => {
                    warn!(slot = %ticket.slot, error = %source, fallback_m = meters, "elevation lookup failed, using fallback");
                    (meters, true)
                }
                FallbackPolicy::Fail => {
                    warn!(slot = %ticket.slot, error = %source, "elevation lookup failed, dropping point");
                    self.remove_point(ticket.slot);
                    return Err(AcquisitionError::ElevationLookupFailed {
                        slot: ticket.slot,
                        source,
                    });
                }
            },
        };

        tracked.point.elevation_m = Some(elevation_m);
        debug!(slot = %ticket.slot, elevation_m, "elevation resolved");
        self.events.push(AcquisitionEvent::ElevationResolved {
            slot: ticket.slot,
            elevation_m,
            fallback: used_fallback,
        });

        if let Some(geo) = self.resolved_geo() {
            self.distance_m = geo.straight_line_distance_m;
            self.events.push(AcquisitionEvent::DistanceUpdated {
                distance_m: self.distance_m,
            });
        }

        Ok(ApplyOutcome::Applied)
    }

    /// Remove the point in `slot`. Returns `false` (and does nothing) if the slot is empty.
    pub fn remove_point(&mut self, slot: Slot) -> bool {
        let next = match self.state {
            AcquisitionState::Empty => return false,
            AcquisitionState::OneSelected { slot: held, .. } if held != slot => return false,
            AcquisitionState::OneSelected { .. } => AcquisitionState::Empty,
            AcquisitionState::TwoSelected { intake, reservoir } => {
                let (kept_slot, kept) = match slot {
                    Slot::Intake => (Slot::Reservoir, reservoir),
                    Slot::Reservoir => (Slot::Intake, intake),
                };
                AcquisitionState::OneSelected {
                    slot: kept_slot,
                    point: kept,
                }
            }
        };

        self.state = next;
        self.distance_m = 0.0;
        info!(%slot, "point removed");
        self.events.push(AcquisitionEvent::PointRemoved { slot });
        true
    }

    /// Rehydrate both points from previously confirmed geo data, skipping lookups.
    pub fn restore(&mut self, geo: &GeoData) {
        let intake = self.track_resolved(geo.intake);
        let reservoir = self.track_resolved(geo.reservoir);
        self.state = AcquisitionState::TwoSelected { intake, reservoir };
        self.distance_m = geo.straight_line_distance_m;
        info!(distance_m = self.distance_m, "selection restored");
        self.events.push(AcquisitionEvent::Restored(*geo));
    }

    /// Drop every point. Lookups still in flight become stale.
    pub fn clear(&mut self) {
        self.state = AcquisitionState::Empty;
        self.distance_m = 0.0;
        info!("selection cleared");
        self.events.push(AcquisitionEvent::Cleared);
    }

    /// Finish the map step.
    ///
    /// Requires two points with resolved elevations; otherwise fails with
    /// [`AcquisitionError::PreconditionNotMet`] and leaves the state untouched.
    pub fn confirm(&mut self) -> Result<GeoData, AcquisitionError> {
        if self.phase() != Phase::TwoSelected {
            return Err(AcquisitionError::PreconditionNotMet(
                "select both the intake and the reservoir first",
            ));
        }
        let geo = self.resolved_geo().ok_or(AcquisitionError::PreconditionNotMet(
            "elevation lookup still pending",
        ))?;
        self.distance_m = geo.straight_line_distance_m;
        info!(distance_m = geo.straight_line_distance_m, "selection confirmed");
        Ok(geo)
    }

    fn issue_token(&mut self) -> PointToken {
        self.next_token += 1;
        PointToken(self.next_token)
    }

    fn track_resolved(&mut self, resolved: ResolvedPoint) -> TrackedPoint {
        TrackedPoint {
            point: GeoPoint {
                coordinate: resolved.coordinate,
                elevation_m: Some(resolved.elevation_m),
            },
            token: self.issue_token(),
        }
    }

    fn tracked(&self, slot: Slot) -> Option<&TrackedPoint> {
        match &self.state {
            AcquisitionState::Empty => None,
            AcquisitionState::OneSelected { slot: held, point } => (*held == slot).then_some(point),
            AcquisitionState::TwoSelected { intake, reservoir } => Some(match slot {
                Slot::Intake => intake,
                Slot::Reservoir => reservoir,
            }),
        }
    }

    fn tracked_mut(&mut self, slot: Slot) -> Option<&mut TrackedPoint> {
        match &mut self.state {
            AcquisitionState::Empty => None,
            AcquisitionState::OneSelected { slot: held, point } => (*held == slot).then_some(point),
            AcquisitionState::TwoSelected { intake, reservoir } => Some(match slot {
                Slot::Intake => intake,
                Slot::Reservoir => reservoir,
            }),
        }
    }

    fn resolved_geo(&self) -> Option<GeoData> {
        match &self.state {
            AcquisitionState::TwoSelected { intake, reservoir } => {
                let intake = intake.point.resolved()?;
                let reservoir = reservoir.point.resolved()?;
                Some(GeoData {
                    intake,
                    reservoir,
                    straight_line_distance_m: distance::distance(
                        intake.coordinate,
                        reservoir.coordinate,
                    ),
                })
            }
            _ => None,
        }
    }
}
