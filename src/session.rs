//! # Session State
//!
//! Holds what must survive between the steps of one sizing session
//! (map → config → result): the confirmed [`GeoData`] and the submitted
//! [`ConfigData`]. A session is an ordinary value owned by whoever drives the
//! workflow; unrelated sessions never share one.

use crate::acquisition::PointAcquisitionController;
use crate::hydraulics::{self, Report};
use crate::{ConfigData, GeoData};
use tracing::debug;

/// Steps of the sizing workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Point selection on the map
    Map,
    /// Pump configuration form
    Config,
    /// Sizing report
    Result,
}

/// At most one geo data and one configuration, replaced wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionStore {
    geo: Option<GeoData>,
    config: Option<ConfigData>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_geo(&mut self, geo: GeoData) {
        debug!(distance_m = geo.straight_line_distance_m, "geo data stored");
        self.geo = Some(geo);
    }

    pub fn geo(&self) -> Option<&GeoData> {
        self.geo.as_ref()
    }

    pub fn set_config(&mut self, config: ConfigData) {
        debug!(pump = config.pump_type.label(), "configuration stored");
        self.config = Some(config);
    }

    pub fn config(&self) -> Option<&ConfigData> {
        self.config.as_ref()
    }

    pub fn has_geo(&self) -> bool {
        self.geo.is_some()
    }

    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }

    /// Forget both values, for a restart from scratch.
    pub fn reset(&mut self) {
        self.geo = None;
        self.config = None;
    }

    /// Sizing report, or `None` while either input is missing.
    pub fn report(&self) -> Option<Report> {
        hydraulics::compute_optional(self.geo(), self.config())
    }

    /// Where to send a user who tries to enter `step`, if they may not.
    ///
    /// The config step needs geo data; the result step needs a configuration.
    ///
    /// # Example
    /// ```
    /// use solar_pump_lib::session::{SessionStore, Step};
    ///
    /// let session = SessionStore::new();
    /// assert_eq!(session.redirect_for(Step::Map), None);
    /// assert_eq!(session.redirect_for(Step::Config), Some(Step::Map));
    /// assert_eq!(session.redirect_for(Step::Result), Some(Step::Config));
    /// ```
    pub fn redirect_for(&self, step: Step) -> Option<Step> {
        match step {
            Step::Map => None,
            Step::Config if !self.has_geo() => Some(Step::Map),
            Step::Result if !self.has_config() => Some(Step::Config),
            _ => None,
        }
    }

    /// Re-enter the map step: put the stored points back into `controller`.
    ///
    /// Returns `false` when no geo data has been stored yet.
    pub fn restore_into(&self, controller: &mut PointAcquisitionController) -> bool {
        match self.geo() {
            Some(geo) => {
                controller.restore(geo);
                true
            }
            None => false,
        }
    }
}
