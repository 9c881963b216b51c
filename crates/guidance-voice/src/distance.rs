//! Voice-appropriate distance phrasing.
//!
//! Spoken instructions want approximate distances with long unit names:
//! "In 1.5 kilometers, ..." rather than "In 1,483 m, ...". Input values are
//! route distance units (meters).

/// Measurement system for spoken distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementUnits {
    Metric,
    Imperial,
}

const METERS_PER_MILE: f64 = 1609.34;
const FEET_PER_METER: f64 = 3.28084;

/// Formats distances for speech: approximate rounding, long unit names,
/// singular/plural handled.
#[derive(Debug, Clone)]
pub struct DistanceFormatter {
    units: MeasurementUnits,
}

impl Default for DistanceFormatter {
    fn default() -> Self {
        Self {
            units: MeasurementUnits::Metric,
        }
    }
}

impl DistanceFormatter {
    pub fn new(units: MeasurementUnits) -> Self {
        Self { units }
    }

    /// Render a distance in meters as an approximate spoken phrase.
    pub fn format(&self, meters: f64) -> String {
        let meters = meters.max(0.0);
        match self.units {
            MeasurementUnits::Metric => Self::format_metric(meters),
            MeasurementUnits::Imperial => Self::format_imperial(meters),
        }
    }

    fn format_metric(meters: f64) -> String {
        if meters < 1000.0 {
            // Nearest 50 meters below a kilometer
            let rounded = ((meters / 50.0).round() * 50.0).max(50.0) as i64;
            format!("{} meters", rounded)
        } else {
            let km = meters / 1000.0;
            if km < 10.0 {
                // Nearest half kilometer
                let rounded = (km * 2.0).round() / 2.0;
                if (rounded - rounded.trunc()).abs() < f64::EPSILON {
                    Self::whole(rounded as i64, "kilometer")
                } else {
                    format!("{:.1} kilometers", rounded)
                }
            } else {
                Self::whole(km.round() as i64, "kilometer")
            }
        }
    }

    fn format_imperial(meters: f64) -> String {
        let miles = meters / METERS_PER_MILE;
        if miles < 0.19 {
            // Nearest 100 feet below roughly a quarter mile
            let feet = meters * FEET_PER_METER;
            let rounded = ((feet / 100.0).round() * 100.0).max(100.0) as i64;
            format!("{} feet", rounded)
        } else if miles < 10.0 {
            // Nearest quarter mile
            let rounded = (miles * 4.0).round() / 4.0;
            match rounded {
                r if (r - 0.25).abs() < f64::EPSILON => "a quarter mile".to_string(),
                r if (r - 0.5).abs() < f64::EPSILON => "a half mile".to_string(),
                r if (r - 0.75).abs() < f64::EPSILON => "three quarters of a mile".to_string(),
                r if (r - r.trunc()).abs() < f64::EPSILON => Self::whole(r as i64, "mile"),
                r => format!("{:.2} miles", r),
            }
        } else {
            Self::whole(miles.round() as i64, "mile")
        }
    }

    fn whole(value: i64, unit: &str) -> String {
        if value == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", value, unit)
        }
    }
}
