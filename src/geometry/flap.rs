//! Plain-flap deflection.
//!
//! Points aft of the hinge are rotated rigidly about a hinge point placed on the
//! camber line. Positive deflection moves the trailing edge down.

use serde::{Deserialize, Serialize};

use crate::domain::{AirfoilCoords, Point};
use crate::error::AppError;
use crate::geometry::ops::normalize_surface;
use crate::geometry::section::interpolate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlapSpec {
    /// Hinge location as a fraction of chord, strictly inside `(0, 1)`.
    pub hinge_x_frac: f64,
    /// Deflection in degrees, trailing edge down positive.
    pub deflection_deg: f64,
}

impl FlapSpec {
    /// Build from a flap chord given in percent (a 25 % flap hinges at 0.75 c).
    pub fn from_percent(percent: f64, deflection_deg: f64) -> Self {
        Self {
            hinge_x_frac: 1.0 - percent / 100.0,
            deflection_deg,
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if !(self.hinge_x_frac > 0.0 && self.hinge_x_frac < 1.0) {
            return Err(AppError::invalid_input(format!(
                "Flap hinge must lie strictly inside the chord (fraction in (0, 1)); got {}.",
                self.hinge_x_frac
            )));
        }
        if !self.deflection_deg.is_finite() {
            return Err(AppError::invalid_input("Flap deflection must be finite."));
        }
        Ok(())
    }
}

pub fn deflect_flap(coords: &AirfoilCoords, flap: FlapSpec) -> Result<AirfoilCoords, AppError> {
    flap.validate()?;
    let upper = normalize_surface(&coords.upper_points()?);
    let lower = normalize_surface(&coords.lower_points()?);
    if upper.is_empty() || lower.is_empty() {
        return Err(AppError::invalid_input("Both surfaces need points to deflect a flap."));
    }

    let chord = upper
        .iter()
        .chain(lower.iter())
        .fold(f64::NEG_INFINITY, |m, p| m.max(p.x));
    let hinge_x = flap.hinge_x_frac * chord;
    let hinge = Point::new(
        hinge_x,
        0.5 * (interpolate(&upper, hinge_x) + interpolate(&lower, hinge_x)),
    );

    let (sin, cos) = flap.deflection_deg.to_radians().sin_cos();
    let rotate = |p: &Point| -> Point {
        if p.x <= hinge_x {
            return *p;
        }
        let dx = p.x - hinge.x;
        let dy = p.y - hinge.y;
        Point::new(hinge.x + dx * cos + dy * sin, hinge.y - dx * sin + dy * cos)
    };

    let upper: Vec<Point> = upper.iter().map(rotate).collect();
    let lower: Vec<Point> = lower.iter().map(rotate).collect();
    Ok(AirfoilCoords::from_surfaces(coords.name.clone(), &upper, &lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_plate() -> AirfoilCoords {
        let xs: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        AirfoilCoords {
            name: Some("plate".into()),
            upper_x: xs.clone(),
            upper_y: vec![0.0; xs.len()],
            lower_x: xs.clone(),
            lower_y: vec![0.0; xs.len()],
        }
    }

    #[test]
    fn positive_deflection_moves_trailing_edge_down() {
        let out = deflect_flap(&flat_plate(), FlapSpec::from_percent(25.0, 10.0)).unwrap();
        let te_y = *out.upper_y.last().unwrap();
        let expected = -(0.25 * 10f64.to_radians().sin());
        assert!((te_y - expected).abs() < 1e-12, "{te_y} vs {expected}");
        // Points ahead of the hinge are untouched.
        assert_eq!(out.upper_y[5], 0.0);
        assert_eq!(out.name.as_deref(), Some("plate"));
    }

    #[test]
    fn zero_deflection_is_identity() {
        let plate = flat_plate();
        let out = deflect_flap(&plate, FlapSpec::from_percent(30.0, 0.0)).unwrap();
        for (a, b) in out.upper_x.iter().zip(plate.upper_x.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
        assert!(out.lower_y.iter().all(|y| y.abs() < 1e-15));
    }

    #[test]
    fn hinge_outside_chord_is_rejected() {
        let err = deflect_flap(&flat_plate(), FlapSpec { hinge_x_frac: 1.2, deflection_deg: 5.0 })
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
