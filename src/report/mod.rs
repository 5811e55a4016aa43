//! Reporting utilities: per-sample residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{AirfoilFit, Point, SurfaceSide};
use crate::fit::objective::point_curve_distance;
use crate::math::KdTree2;

/// Distance from one input sample to its fitted curve.
#[derive(Debug, Clone, PartialEq)]
pub struct PointResidual {
    pub side: SurfaceSide,
    /// Index into the surface samples as supplied.
    pub index: usize,
    pub point: Point,
    pub distance: f64,
}

/// Per-sample distances to the fitted curves (same metric as the fit objective).
pub fn compute_residuals(fit: &AirfoilFit, upper: &[Point], lower: &[Point]) -> Vec<PointResidual> {
    let mut out = Vec::with_capacity(upper.len() + lower.len());
    for (side, samples) in [(SurfaceSide::Upper, upper), (SurfaceSide::Lower, lower)] {
        let curve = &fit.surface(side).curve;
        let tree = KdTree2::build(curve);
        for (index, p) in samples.iter().enumerate() {
            out.push(PointResidual {
                side,
                index,
                point: *p,
                distance: point_curve_distance(&tree, curve, p),
            });
        }
    }
    out
}

/// The `top_n` samples furthest from their curve, largest first (ties by input order).
pub fn worst_points(residuals: &[PointResidual], top_n: usize) -> Vec<PointResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap_or(std::cmp::Ordering::Equal));
    sorted.truncate(top_n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SurfaceFit;

    fn flat_fit() -> AirfoilFit {
        let line: Vec<Point> = (0..11).map(|i| Point::new(i as f64 / 10.0, 0.0)).collect();
        let surface = |side| SurfaceFit {
            side,
            control_points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            curve: line.clone(),
            sse: 0.0,
            n_samples: 0,
        };
        AirfoilFit {
            order: 1,
            chord: 1.0,
            upper: surface(SurfaceSide::Upper),
            lower: surface(SurfaceSide::Lower),
        }
    }

    #[test]
    fn residuals_measure_distance_to_curve() {
        let upper = [Point::new(0.25, 0.1), Point::new(0.5, 0.0)];
        let lower = [Point::new(0.75, -0.3)];
        let residuals = compute_residuals(&flat_fit(), &upper, &lower);
        assert_eq!(residuals.len(), 3);
        assert!((residuals[0].distance - 0.1).abs() < 1e-12);
        assert!(residuals[1].distance.abs() < 1e-12);
        assert_eq!(residuals[2].side, SurfaceSide::Lower);

        let worst = worst_points(&residuals, 2);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].side, SurfaceSide::Lower);
        assert_eq!(worst[1].index, 0);
    }
}
