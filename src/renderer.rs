//! # Report Rendering
//!
//! Plain-text rendering of the sizing report and of the point notifications the
//! acquisition controller emits. Used by the binary for terminal output.

use crate::acquisition::AcquisitionEvent;
use crate::hydraulics::Report;
use crate::ResolvedPoint;
use chrono::{DateTime, Local};
use std::fmt::Write;

const RULE: &str = "----------------------------------------";

/// Render the full sizing report.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "SOLAR PUMP SIZING REPORT");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Pump type:            {}", report.pump_type_label);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Intake:               {}", format_point(&report.geo.intake));
    let _ = writeln!(out, "Reservoir:            {}", format_point(&report.geo.reservoir));
    let _ = writeln!(
        out,
        "Straight-line dist.:  {:.2} m",
        report.geo.straight_line_distance_m
    );
    let _ = writeln!(out, "Piping length (+10%): {:.2} m", report.piping_length_m);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Elevation gain:       {:.2} m", report.geo_height_m);
    let _ = writeln!(out, "Static head:          {:.2} m", report.static_head_m);
    let _ = writeln!(out, "Friction loss (10%):  {:.2} m", report.friction_loss_m);
    let _ = writeln!(out, "Total head (AMT):     {:.2} m", report.total_head_m);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Nominal flow:         {:.2} L/h", report.nominal_flow_l_per_hour);
    let _ = writeln!(out, "Real flow (-10%):     {:.2} L/h", report.real_flow_l_per_hour);
    let _ = writeln!(out, "Daily volume:         {:.2} L", report.daily_volume_l);
    out
}

/// Footer line with the time the report was produced.
pub fn render_footer(generated_at: DateTime<Local>) -> String {
    format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M"))
}

/// Print the report to stdout for terminal use.
pub fn draw_ascii(report: &Report) {
    print!("{}", render_report(report));
    println!("{RULE}");
    println!("{}", render_footer(Local::now()));
}

/// One-line description of an acquisition notification.
pub fn describe_event(event: &AcquisitionEvent) -> String {
    match event {
        AcquisitionEvent::PointAdded { slot, coordinate } => {
            format!("{slot} point selected at {coordinate}")
        }
        AcquisitionEvent::ElevationResolved {
            slot,
            elevation_m,
            fallback: false,
        } => format!("{slot} elevation: {elevation_m:.1} m"),
        AcquisitionEvent::ElevationResolved {
            slot,
            elevation_m,
            fallback: true,
        } => format!("{slot} elevation unavailable, using {elevation_m:.1} m"),
        AcquisitionEvent::PointRemoved { slot } => format!("{slot} point removed"),
        AcquisitionEvent::DistanceUpdated { distance_m } => {
            format!("distance between points: {distance_m:.2} m")
        }
        AcquisitionEvent::Restored(geo) => format!(
            "points restored, distance {:.2} m",
            geo.straight_line_distance_m
        ),
        AcquisitionEvent::Cleared => "map cleared".to_string(),
    }
}

fn format_point(point: &ResolvedPoint) -> String {
    format!("{} @ {:.1} m", point.coordinate, point.elevation_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::Slot;
    use crate::hydraulics::compute;
    use crate::{ConfigData, Coordinate, GeoData, PumpType};
    use chrono::TimeZone;

    fn report() -> Report {
        let geo = GeoData {
            intake: ResolvedPoint {
                coordinate: Coordinate::new(-15.3260, -49.1173).unwrap(),
                elevation_m: 700.0,
            },
            reservoir: ResolvedPoint {
                coordinate: Coordinate::new(-15.3200, -49.1100).unwrap(),
                elevation_m: 750.0,
            },
            straight_line_distance_m: 1000.0,
        };
        let config = ConfigData::new(PumpType::Submerged, 10.0, 5.0, 2.0).unwrap();
        compute(&geo, &config)
    }

    #[test]
    fn test_report_contains_key_figures() {
        let text = render_report(&report());
        assert!(text.contains("Submerged pump"));
        assert!(text.contains("Piping length (+10%): 1100.00 m"));
        assert!(text.contains("Static head:          65.00 m"));
        assert!(text.contains("Total head (AMT):     71.50 m"));
        assert!(text.contains("Real flow (-10%):     1800.00 L/h"));
        assert!(text.contains("Daily volume:         9900.00 L"));
        assert!(text.contains("-15.32600, -49.11730 @ 700.0 m"));
    }

    #[test]
    fn test_footer_format() {
        let at = Local.with_ymd_and_hms(2025, 7, 24, 8, 5, 0).unwrap();
        assert_eq!(render_footer(at), "Generated 2025-07-24 08:05");
    }

    #[test]
    fn test_describe_events() {
        let coordinate = Coordinate::new(1.0, 2.0).unwrap();
        assert_eq!(
            describe_event(&AcquisitionEvent::PointAdded {
                slot: Slot::Intake,
                coordinate
            }),
            "intake point selected at 1.00000, 2.00000"
        );
        assert_eq!(
            describe_event(&AcquisitionEvent::ElevationResolved {
                slot: Slot::Reservoir,
                elevation_m: 0.0,
                fallback: true
            }),
            "reservoir elevation unavailable, using 0.0 m"
        );
        assert_eq!(describe_event(&AcquisitionEvent::Cleared), "map cleared");
    }
}
