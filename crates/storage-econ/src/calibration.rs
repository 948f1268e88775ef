//! Linear-density coefficients and their reference project.
//!
//! Each wall or kick-plate quantity scales linearly with net unit area (PUM),
//! and walls also with system height. The ratios come from one finished
//! project whose quantities were measured.

use crate::EconError;
use serde::{Deserialize, Serialize};

/// Assumed doors per m² of PUM; sizes the lintel area above doors.
pub const DOOR_DENSITY: f64 = 0.30;

/// Observed quantities of a built project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceProject {
    /// PUM, m².
    pub net_area: f64,
    /// System height, m.
    pub height: f64,
    /// Gray partition wall area, m².
    pub partition_area: f64,
    /// Solid white front wall area, m².
    pub front_area: f64,
    /// Kick plate length, m.
    pub kick_plate_length: f64,
}

impl Default for ReferenceProject {
    fn default() -> Self {
        Self {
            net_area: 84.0,
            height: 2.5,
            partition_area: 217.5,
            front_area: 73.48,
            kick_plate_length: 23.75,
        }
    }
}

/// Quantity per unit of PUM (and per metre of height for walls).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coefficients {
    pub gray_wall: f64,
    pub white_wall_lower: f64,
    pub kick_plate: f64,
    pub door_density: f64,
}

impl Coefficients {
    pub fn from_reference(reference: &ReferenceProject) -> Result<Self, EconError> {
        let scale = reference.net_area * reference.height;
        if !(reference.net_area > 0.0 && scale > 0.0 && scale.is_finite()) {
            return Err(EconError::InvalidReference);
        }
        Ok(Coefficients {
            gray_wall: reference.partition_area / scale,
            white_wall_lower: reference.front_area / scale,
            kick_plate: reference.kick_plate_length / reference.net_area,
            door_density: DOOR_DENSITY,
        })
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        let r = ReferenceProject::default();
        Coefficients {
            gray_wall: r.partition_area / (r.net_area * r.height),
            white_wall_lower: r.front_area / (r.net_area * r.height),
            kick_plate: r.kick_plate_length / r.net_area,
            door_density: DOOR_DENSITY,
        }
    }
}

/// Model minus observed, per calibrated quantity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub gray_wall_deviation: f64,
    pub white_wall_deviation: f64,
    pub kick_plate_deviation: f64,
}

impl CalibrationReport {
    pub fn within(&self, tolerance: f64) -> bool {
        self.gray_wall_deviation.abs() <= tolerance
            && self.white_wall_deviation.abs() <= tolerance
            && self.kick_plate_deviation.abs() <= tolerance
    }
}

/// Replays `coefficients` on the reference project's own PUM and height.
pub fn calibration_check(
    reference: &ReferenceProject,
    coefficients: &Coefficients,
) -> CalibrationReport {
    let pum = reference.net_area;
    let h = reference.height;
    CalibrationReport {
        gray_wall_deviation: pum * coefficients.gray_wall * h - reference.partition_area,
        white_wall_deviation: pum * coefficients.white_wall_lower * h - reference.front_area,
        kick_plate_deviation: pum * coefficients.kick_plate - reference.kick_plate_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_round_trips() {
        let r = ReferenceProject::default();
        let c = Coefficients::from_reference(&r).unwrap();
        assert_eq!(c, Coefficients::default());
        let report = calibration_check(&r, &c);
        assert!(report.within(1e-9), "{report:?}");
        assert!((84.0 * c.gray_wall * 2.5 - 217.5).abs() < 1e-9);
    }

    #[test]
    fn other_project_shows_deviation() {
        // Same coefficients replayed on a taller project with more partitions.
        let c = Coefficients::default();
        let other = ReferenceProject {
            net_area: 126.5,
            height: 3.0,
            partition_area: 400.0,
            front_area: 120.0,
            kick_plate_length: 30.0,
        };
        let report = calibration_check(&other, &c);
        assert!(report.gray_wall_deviation < 0.0);
        assert!(report.kick_plate_deviation > 0.0);
        assert!(!report.within(0.5));
    }

    #[test]
    fn degenerate_reference_is_rejected() {
        let r = ReferenceProject {
            net_area: 0.0,
            ..ReferenceProject::default()
        };
        assert_eq!(Coefficients::from_reference(&r), Err(EconError::InvalidReference));
    }
}
