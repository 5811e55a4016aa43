//! Point-to-curve SSE objective for one surface.
//!
//! Each evaluation samples the polygon into a dense curve, indexes it with a
//! k-d tree and measures every data point against the two curve segments
//! adjacent to its nearest sampled point. Using segments rather than the nearest
//! sample keeps the objective continuous in the control points, which the
//! gradient-based optimizer relies on.

use crate::domain::Point;
use crate::fit::params::PolygonLayout;
use crate::math::{point_segment_distance, CurveSampler, KdTree2};

/// Distance from `p` to the polyline `curve`, using the segments adjacent to
/// the nearest vertex found in `tree`.
pub fn point_curve_distance(tree: &KdTree2, curve: &[Point], p: &Point) -> f64 {
    let Some(nearest) = tree.nearest(p) else {
        return f64::INFINITY;
    };
    let idx = nearest.index;

    let mut best = f64::INFINITY;
    if idx > 0 {
        best = best.min(point_segment_distance(p, &curve[idx - 1], &curve[idx]));
    }
    if idx + 1 < curve.len() {
        best = best.min(point_segment_distance(p, &curve[idx], &curve[idx + 1]));
    }
    if best.is_finite() { best } else { nearest.distance }
}

/// Sum of squared point-to-curve distances.
pub fn curve_sse(curve: &[Point], samples: &[Point]) -> f64 {
    let tree = KdTree2::build(curve);
    samples
        .iter()
        .map(|p| point_curve_distance(&tree, curve, p).powi(2))
        .sum()
}

/// Objective state for one surface: the data plus reusable scratch buffers.
pub struct SurfaceObjective<'a> {
    samples: &'a [Point],
    layout: PolygonLayout,
    sampler: &'a CurveSampler,
    control: Vec<Point>,
    curve: Vec<Point>,
    tree: KdTree2,
}

impl<'a> SurfaceObjective<'a> {
    pub fn new(samples: &'a [Point], layout: PolygonLayout, sampler: &'a CurveSampler) -> Self {
        Self {
            samples,
            layout,
            sampler,
            control: Vec::with_capacity(layout.point_count()),
            curve: Vec::with_capacity(sampler.len()),
            tree: KdTree2::new(),
        }
    }

    pub fn sse(&mut self, params: &[f64]) -> f64 {
        self.layout.reconstruct_into(params, &mut self.control);
        self.sampler.sample_into(&self.control, &mut self.curve);
        self.tree.rebuild(&self.curve);

        let mut sum = 0.0;
        for p in self.samples {
            let d = point_curve_distance(&self.tree, &self.curve, p);
            sum += d * d;
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_on_a_straight_curve_have_zero_error() {
        let curve: Vec<Point> = (0..11).map(|i| Point::new(i as f64 / 10.0, 0.0)).collect();
        let samples = vec![Point::new(0.05, 0.0), Point::new(0.55, 0.0), Point::new(1.0, 0.0)];
        assert!(curve_sse(&curve, &samples) < 1e-30);
    }

    #[test]
    fn uses_segment_not_nearest_vertex() {
        // The sample sits between two vertices: vertex distance would be ~0.5.
        let curve = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let tree = KdTree2::build(&curve);
        let d = point_curve_distance(&tree, &curve, &Point::new(0.5, 0.1));
        assert!((d - 0.1).abs() < 1e-12);
    }

    #[test]
    fn single_point_curve_falls_back_to_vertex_distance() {
        let curve = vec![Point::new(0.0, 0.0)];
        let tree = KdTree2::build(&curve);
        let d = point_curve_distance(&tree, &curve, &Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn objective_is_zero_on_the_curve_it_generated() {
        let layout = PolygonLayout::new(3, 1.0);
        let params = [0.05, 0.5, 0.08];
        let sampler = CurveSampler::new(3, 200);
        let samples = sampler.sample(&layout.reconstruct(&params));
        let mut objective = SurfaceObjective::new(&samples, layout, &sampler);
        assert!(objective.sse(&params) < 1e-24);
        assert!(objective.sse(&[0.0, 0.5, 0.0]) > 1e-4);
    }
}
