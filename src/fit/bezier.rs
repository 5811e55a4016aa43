//! Constrained Bezier fit of the two airfoil surfaces.
//!
//! Each surface is fit on its own:
//!
//! - orient the samples leading edge → trailing edge
//! - seed the free control-point parameters from the data (no randomness)
//! - minimize the point-to-curve SSE with BFGS
//! - rebuild the polygon and resample the curve from the final iterate
//!
//! The chord is shared: it is the largest x over both surfaces, so both polygons
//! end at the same trailing-edge point. Running out of optimizer iterations is
//! not an error; the attained SSE is the quality signal.

use log::debug;

use crate::domain::{AirfoilCoords, AirfoilFit, FitConfig, Point, SurfaceFit, SurfaceSide};
use crate::error::AppError;
use crate::fit::objective::SurfaceObjective;
use crate::fit::params::PolygonLayout;
use crate::geometry::normalize_surface;
use crate::math::{minimize, BfgsConfig, CurveSampler};

#[derive(Debug, Clone)]
pub struct BezierFitter {
    config: FitConfig,
}

impl BezierFitter {
    pub fn new(config: FitConfig) -> Result<Self, AppError> {
        if config.order < 1 {
            return Err(AppError::invalid_input("Bezier order must be at least 1."));
        }
        if config.curve_points < 2 {
            return Err(AppError::invalid_input(
                "Fitted curves need at least 2 sample points.",
            ));
        }
        if config.max_iterations < 1 {
            return Err(AppError::invalid_input("Iteration budget must be at least 1."));
        }
        if !(config.tolerance.is_finite() && config.tolerance > 0.0) {
            return Err(AppError::invalid_input(
                "Optimizer tolerance must be a positive finite number.",
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    pub fn order(&self) -> usize {
        self.config.order
    }

    /// Fit parallel x/y arrays (the request form).
    pub fn fit_coords(&self, coords: &AirfoilCoords) -> Result<AirfoilFit, AppError> {
        let upper = coords.upper_points()?;
        let lower = coords.lower_points()?;
        self.fit(&upper, &lower)
    }

    /// Fit both surfaces. Inputs are validated before any optimization runs.
    pub fn fit(&self, upper: &[Point], lower: &[Point]) -> Result<AirfoilFit, AppError> {
        validate_surface(upper, SurfaceSide::Upper)?;
        validate_surface(lower, SurfaceSide::Lower)?;

        let upper = normalize_surface(upper);
        let lower = normalize_surface(lower);

        let chord = upper
            .iter()
            .chain(lower.iter())
            .fold(f64::NEG_INFINITY, |m, p| m.max(p.x));
        if !(chord > 0.0) {
            return Err(AppError::invalid_input(format!(
                "Chord (max x over both surfaces) must be positive; got {chord}."
            )));
        }

        let layout = PolygonLayout::new(self.config.order, chord);
        let sampler = CurveSampler::new(self.config.order, self.config.curve_points);

        let (upper_fit, lower_fit) = rayon::join(
            || self.fit_surface(&upper, SurfaceSide::Upper, layout, &sampler),
            || self.fit_surface(&lower, SurfaceSide::Lower, layout, &sampler),
        );

        Ok(AirfoilFit {
            order: self.config.order,
            chord,
            upper: upper_fit,
            lower: lower_fit,
        })
    }

    fn fit_surface(
        &self,
        samples: &[Point],
        side: SurfaceSide,
        layout: PolygonLayout,
        sampler: &CurveSampler,
    ) -> SurfaceFit {
        let x0 = layout.initial_guess(samples, side);
        let mut objective = SurfaceObjective::new(samples, layout, sampler);
        let bfgs = BfgsConfig {
            max_iterations: self.config.max_iterations,
            tolerance: self.config.tolerance,
            ..BfgsConfig::default()
        };

        let min = minimize(|p| objective.sse(p), &x0, &bfgs);
        debug!(
            "{} surface: order={} params={} sse={:.3e} iterations={} evaluations={} converged={}",
            side.display_name(),
            layout.order,
            x0.len(),
            min.value,
            min.iterations,
            min.evaluations,
            min.converged
        );

        let control_points = layout.reconstruct(&min.params);
        let curve = sampler.sample(&control_points);
        SurfaceFit {
            side,
            control_points,
            curve,
            sse: min.value.max(0.0),
            n_samples: samples.len(),
        }
    }
}

fn validate_surface(points: &[Point], side: SurfaceSide) -> Result<(), AppError> {
    if points.len() < 2 {
        return Err(AppError::invalid_input(format!(
            "The {} surface needs at least 2 points; got {}.",
            side.display_name(),
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(AppError::invalid_input(format!(
            "The {} surface has a non-finite coordinate at index {i}.",
            side.display_name()
        )));
    }
    Ok(())
}
