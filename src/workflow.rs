//! Async glue between the acquisition controller and an elevation resolver.

use crate::acquisition::{AcquisitionError, ApplyOutcome, Phase, PointAcquisitionController};
use crate::elevation::ElevationResolver;
use crate::{Coordinate, GeoData};

/// Select one point and resolve its elevation.
pub async fn add_and_resolve<R: ElevationResolver>(
    controller: &mut PointAcquisitionController,
    resolver: &R,
    coordinate: Coordinate,
) -> Result<ApplyOutcome, AcquisitionError> {
    let ticket = controller.add_point(coordinate)?;
    let result = resolver.elevation(ticket.coordinate).await;
    controller.apply_elevation(ticket, result)
}

/// Select both points, look their elevations up concurrently and confirm.
///
/// The controller must be empty. Both lookups are issued back to back and each
/// result is applied as soon as its lookup completes, whichever finishes first.
/// Both results are always applied before a lookup failure is reported, so a
/// failed point never leaves its sibling pending.
pub async fn acquire_points<R: ElevationResolver>(
    controller: &mut PointAcquisitionController,
    resolver: &R,
    intake: Coordinate,
    reservoir: Coordinate,
) -> Result<GeoData, AcquisitionError> {
    if controller.phase() != Phase::Empty {
        return Err(AcquisitionError::PreconditionNotMet(
            "clear the map before selecting both points at once",
        ));
    }
    let intake_ticket = controller.add_point(intake)?;
    let reservoir_ticket = controller.add_point(reservoir)?;

    let intake_lookup = resolver.elevation(intake_ticket.coordinate);
    let reservoir_lookup = resolver.elevation(reservoir_ticket.coordinate);
    tokio::pin!(intake_lookup, reservoir_lookup);

    let mut intake_done = false;
    let mut reservoir_done = false;
    let mut first_error = None;
    while !(intake_done && reservoir_done) {
        let (ticket, result) = tokio::select! {
            result = &mut intake_lookup, if !intake_done => {
                intake_done = true;
                (intake_ticket, result)
            }
            result = &mut reservoir_lookup, if !reservoir_done => {
                reservoir_done = true;
                (reservoir_ticket, result)
            }
        };
        if let Err(e) = controller.apply_elevation(ticket, result) {
            first_error.get_or_insert(e);
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }
    controller.confirm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{AcquisitionEvent, Slot};
    use crate::elevation::{ElevationError, FallbackPolicy, StaticElevations};

    /// Resolver whose lookup for `slow` finishes only after a few scheduler turns.
    struct Delayed {
        table: StaticElevations,
        slow: Coordinate,
    }

    impl ElevationResolver for Delayed {
        async fn elevation(&self, coordinate: Coordinate) -> Result<f64, ElevationError> {
            if coordinate == self.slow {
                for _ in 0..5 {
                    tokio::task::yield_now().await;
                }
            }
            self.table.elevation(coordinate).await
        }
    }

    /// Slots in the order their elevations were applied.
    fn resolution_order(events: &[AcquisitionEvent]) -> Vec<Slot> {
        events
            .iter()
            .filter_map(|event| match event {
                AcquisitionEvent::ElevationResolved { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect()
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[tokio::test]
    async fn test_acquire_points_with_known_elevations() {
        let intake = coord(-15.3260, -49.1173);
        let reservoir = coord(-15.3200, -49.1100);
        let table = StaticElevations::new()
            .with(intake, 700.0)
            .with(reservoir, 750.0);

        let mut controller = PointAcquisitionController::default();
        let geo = acquire_points(&mut controller, &table, intake, reservoir)
            .await
            .unwrap();

        assert_eq!(geo.intake.elevation_m, 700.0);
        assert_eq!(geo.reservoir.elevation_m, 750.0);
        assert!(geo.straight_line_distance_m > 1000.0);
    }

    #[tokio::test]
    async fn test_unknown_point_falls_back_by_default() {
        let intake = coord(1.0, 1.0);
        let table = StaticElevations::new().with(intake, 120.0);

        let mut controller = PointAcquisitionController::default();
        let geo = acquire_points(&mut controller, &table, intake, coord(1.01, 1.0))
            .await
            .unwrap();
        assert_eq!(geo.reservoir.elevation_m, 0.0);
    }

    #[tokio::test]
    async fn test_fail_policy_surfaces_lookup_error() {
        let intake = coord(1.0, 1.0);
        let table = StaticElevations::new().with(intake, 120.0);

        let mut controller = PointAcquisitionController::new(FallbackPolicy::Fail);
        let result = acquire_points(&mut controller, &table, intake, coord(1.01, 1.0)).await;
        assert!(matches!(
            result,
            Err(AcquisitionError::ElevationLookupFailed {
                slot: Slot::Reservoir,
                ..
            })
        ));
        assert_eq!(controller.phase(), Phase::OneSelected);
        // The intake lookup succeeded and must not be left pending
        assert_eq!(controller.point(Slot::Intake).unwrap().elevation_m, Some(120.0));
    }

    #[tokio::test]
    async fn test_workflow_recovers_after_failed_lookup() {
        let intake = coord(1.0, 1.0);
        let replacement = coord(1.02, 1.0);
        let table = StaticElevations::new()
            .with(intake, 120.0)
            .with(replacement, 150.0);

        let mut controller = PointAcquisitionController::new(FallbackPolicy::Fail);
        assert!(acquire_points(&mut controller, &table, intake, coord(1.01, 1.0))
            .await
            .is_err());

        add_and_resolve(&mut controller, &table, replacement).await.unwrap();
        let geo = controller.confirm().unwrap();
        assert_eq!(geo.intake.elevation_m, 120.0);
        assert_eq!(geo.reservoir.elevation_m, 150.0);
    }

    #[tokio::test]
    async fn test_results_applied_in_completion_order() {
        let intake = coord(-15.3260, -49.1173);
        let reservoir = coord(-15.3200, -49.1100);
        let table = StaticElevations::new()
            .with(intake, 700.0)
            .with(reservoir, 750.0);

        let slow_intake = Delayed {
            table: table.clone(),
            slow: intake,
        };
        let mut controller = PointAcquisitionController::default();
        let geo = acquire_points(&mut controller, &slow_intake, intake, reservoir)
            .await
            .unwrap();
        assert_eq!(
            resolution_order(&controller.drain_events()),
            vec![Slot::Reservoir, Slot::Intake]
        );
        assert_eq!(geo.intake.elevation_m, 700.0);
        assert_eq!(geo.reservoir.elevation_m, 750.0);

        let slow_reservoir = Delayed {
            table,
            slow: reservoir,
        };
        let mut controller = PointAcquisitionController::default();
        let geo = acquire_points(&mut controller, &slow_reservoir, intake, reservoir)
            .await
            .unwrap();
        assert_eq!(
            resolution_order(&controller.drain_events()),
            vec![Slot::Intake, Slot::Reservoir]
        );
        assert_eq!(geo.intake.elevation_m, 700.0);
        assert_eq!(geo.reservoir.elevation_m, 750.0);
    }

    #[tokio::test]
    async fn test_acquire_points_requires_empty_map() {
        let point = coord(3.0, 3.0);
        let table = StaticElevations::new().with(point, 10.0);
        let mut controller = PointAcquisitionController::default();
        add_and_resolve(&mut controller, &table, point).await.unwrap();
        let before = *controller.state();

        let result = acquire_points(&mut controller, &table, coord(4.0, 4.0), coord(5.0, 5.0)).await;
        assert!(matches!(result, Err(AcquisitionError::PreconditionNotMet(_))));
        assert_eq!(*controller.state(), before);
    }

    #[tokio::test]
    async fn test_add_and_resolve_single_click() {
        let point = coord(2.0, 2.0);
        let table = StaticElevations::new().with(point, 55.0);
        let mut controller = PointAcquisitionController::default();

        let outcome = add_and_resolve(&mut controller, &table, point).await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(controller.point(Slot::Intake).unwrap().elevation_m, Some(55.0));
    }
}
