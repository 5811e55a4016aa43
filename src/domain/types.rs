//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exchanged as request/response bodies
//! - exported to JSON/CSV and reloaded later for plotting

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A 2-D point in chord-normalized airfoil coordinates.
pub type Point = nalgebra::Point2<f64>;

/// Default Bezier order used when none is configured.
pub const DEFAULT_ORDER: usize = 6;
/// Default number of uniformly spaced parameter samples per fitted curve.
pub const DEFAULT_CURVE_POINTS: usize = 200;
/// Default optimizer iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 500;
/// Default optimizer convergence tolerance.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Which physical surface of the airfoil a sample set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceSide {
    Upper,
    Lower,
}

impl SurfaceSide {
    pub fn display_name(self) -> &'static str {
        match self {
            SurfaceSide::Upper => "upper",
            SurfaceSide::Lower => "lower",
        }
    }

    /// Sign applied to thickness-like guesses (lower camber is negative).
    pub fn sign(self) -> f64 {
        match self {
            SurfaceSide::Upper => 1.0,
            SurfaceSide::Lower => -1.0,
        }
    }
}

/// Parallel coordinate arrays for one polyline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Coords {
    pub fn from_points(points: &[Point]) -> Self {
        Self {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Zip into points, rejecting mismatched lengths.
    pub fn to_points(&self, label: &str) -> Result<Vec<Point>, AppError> {
        if self.x.len() != self.y.len() {
            return Err(AppError::invalid_input(format!(
                "{label}: x and y coordinate arrays must have the same length (x={}, y={}).",
                self.x.len(),
                self.y.len()
            )));
        }
        Ok(self
            .x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| Point::new(x, y))
            .collect())
    }
}

/// Raw airfoil geometry as supplied by callers: one parallel x/y pair per surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirfoilCoords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub upper_x: Vec<f64>,
    pub upper_y: Vec<f64>,
    pub lower_x: Vec<f64>,
    pub lower_y: Vec<f64>,
}

impl AirfoilCoords {
    pub fn from_surfaces(name: Option<String>, upper: &[Point], lower: &[Point]) -> Self {
        let up = Coords::from_points(upper);
        let lo = Coords::from_points(lower);
        Self {
            name,
            upper_x: up.x,
            upper_y: up.y,
            lower_x: lo.x,
            lower_y: lo.y,
        }
    }

    pub fn upper_points(&self) -> Result<Vec<Point>, AppError> {
        Coords {
            x: self.upper_x.clone(),
            y: self.upper_y.clone(),
        }
        .to_points("upper surface")
    }

    pub fn lower_points(&self) -> Result<Vec<Point>, AppError> {
        Coords {
            x: self.lower_x.clone(),
            y: self.lower_y.clone(),
        }
        .to_points("lower surface")
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Airfoil")
    }
}

/// Fitter configuration, passed explicitly at construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Bezier degree `n`; the control polygon has `n + 1` points.
    pub order: usize,
    /// Number of uniformly spaced samples of the fitted curve.
    pub curve_points: usize,
    /// Optimizer iteration budget.
    pub max_iterations: usize,
    /// Optimizer convergence tolerance (objective change and step length).
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            curve_points: DEFAULT_CURVE_POINTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl FitConfig {
    pub fn with_order(order: usize) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }
}

/// Fit output for one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFit {
    pub side: SurfaceSide,
    /// Control polygon, `order + 1` points, LE first.
    pub control_points: Vec<Point>,
    /// Dense curve sampled at uniform parameter values (LE → TE).
    pub curve: Vec<Point>,
    /// Sum of squared point-to-curve distances at the returned polygon.
    pub sse: f64,
    /// Number of data samples the SSE was accumulated over.
    pub n_samples: usize,
}

impl SurfaceFit {
    /// Root-mean-square point-to-curve distance.
    pub fn rms_distance(&self) -> f64 {
        if self.n_samples == 0 {
            0.0
        } else {
            (self.sse / self.n_samples as f64).sqrt()
        }
    }
}

/// Fit output for both surfaces of an airfoil.
#[derive(Debug, Clone, PartialEq)]
pub struct AirfoilFit {
    pub order: usize,
    pub chord: f64,
    pub upper: SurfaceFit,
    pub lower: SurfaceFit,
}

impl AirfoilFit {
    pub fn total_sse(&self) -> f64 {
        self.upper.sse + self.lower.sse
    }

    pub fn surface(&self, side: SurfaceSide) -> &SurfaceFit {
        match side {
            SurfaceSide::Upper => &self.upper,
            SurfaceSide::Lower => &self.lower,
        }
    }
}

/// Serializable form of a surface fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFitRecord {
    pub control_points: Coords,
    pub curve: Coords,
    pub sse: f64,
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub order: usize,
    pub chord: f64,
    pub upper: SurfaceFitRecord,
    pub lower: SurfaceFitRecord,
    /// The samples that were fitted, kept so plots can overlay them later.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<AirfoilCoords>,
}

impl FitFile {
    pub fn from_fit(fit: &AirfoilFit, samples: Option<&AirfoilCoords>) -> Self {
        Self {
            tool: "foil".to_string(),
            created_at: Utc::now(),
            name: samples.and_then(|s| s.name.clone()),
            order: fit.order,
            chord: fit.chord,
            upper: SurfaceFitRecord::from(&fit.upper),
            lower: SurfaceFitRecord::from(&fit.lower),
            samples: samples.cloned(),
        }
    }

    /// Rebuild the in-memory fit (sample counts are taken from the stored samples, if any).
    pub fn to_fit(&self) -> Result<AirfoilFit, AppError> {
        let n_upper = self.samples.as_ref().map(|s| s.upper_x.len()).unwrap_or(0);
        let n_lower = self.samples.as_ref().map(|s| s.lower_x.len()).unwrap_or(0);
        Ok(AirfoilFit {
            order: self.order,
            chord: self.chord,
            upper: self.upper.to_surface(SurfaceSide::Upper, n_upper)?,
            lower: self.lower.to_surface(SurfaceSide::Lower, n_lower)?,
        })
    }
}

impl From<&SurfaceFit> for SurfaceFitRecord {
    fn from(fit: &SurfaceFit) -> Self {
        Self {
            control_points: Coords::from_points(&fit.control_points),
            curve: Coords::from_points(&fit.curve),
            sse: fit.sse,
        }
    }
}

impl SurfaceFitRecord {
    fn to_surface(&self, side: SurfaceSide, n_samples: usize) -> Result<SurfaceFit, AppError> {
        let label = side.display_name();
        Ok(SurfaceFit {
            side,
            control_points: self.control_points.to_points(&format!("{label} control points"))?,
            curve: self.curve.to_points(&format!("{label} curve"))?,
            sse: self.sse,
            n_samples,
        })
    }
}

/// Summary stats about the samples actually used for fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub n_upper: usize,
    pub n_lower: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl SampleStats {
    pub fn from_surfaces(upper: &[Point], lower: &[Point]) -> Option<Self> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for p in upper.iter().chain(lower.iter()) {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        if !(x_min.is_finite() && x_max.is_finite() && y_min.is_finite() && y_max.is_finite()) {
            return None;
        }
        Some(Self {
            n_upper: upper.len(),
            n_lower: lower.len(),
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_reject_mismatched_lengths() {
        let coords = Coords {
            x: vec![0.0, 1.0],
            y: vec![0.0],
        };
        let err = coords.to_points("upper surface").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn airfoil_coords_json_uses_flat_arrays() {
        let json = r#"{"upper_x":[0,1],"upper_y":[0,0],"lower_x":[0,1],"lower_y":[0,0]}"#;
        let coords: AirfoilCoords = serde_json::from_str(json).unwrap();
        assert_eq!(coords.upper_points().unwrap().len(), 2);
        assert!(coords.name.is_none());
        assert_eq!(coords.display_name(), "Airfoil");
    }
}
