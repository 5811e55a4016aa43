//! Free-parameter layout of a constrained airfoil control polygon.
//!
//! For order `n` the polygon has `n + 1` points:
//!
//! - `P0 = (0, 0)` and `Pn = (c, 0)` are fixed
//! - `P1 = (0, y1)` contributes only `y1`
//! - `P2 .. P(n-1)` contribute `(x, y)` each
//!
//! so the free vector is `[y1, x2, y2, x3, y3, ...]`. Constraints therefore hold by
//! construction for every parameter vector the optimizer proposes.

use crate::domain::{Point, SurfaceSide};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonLayout {
    pub order: usize,
    pub chord: f64,
}

impl PolygonLayout {
    pub fn new(order: usize, chord: f64) -> Self {
        Self { order, chord }
    }

    /// Number of free parameters.
    pub fn free_len(&self) -> usize {
        if self.order < 2 {
            0
        } else {
            1 + 2 * (self.order - 2)
        }
    }

    /// Number of control points.
    pub fn point_count(&self) -> usize {
        self.order + 1
    }

    /// Rebuild the full polygon from `params` into `out` (cleared first).
    pub fn reconstruct_into(&self, params: &[f64], out: &mut Vec<Point>) {
        debug_assert_eq!(params.len(), self.free_len());
        out.clear();
        out.push(Point::new(0.0, 0.0));
        if self.order >= 2 {
            out.push(Point::new(0.0, params[0]));
            for pair in params[1..].chunks_exact(2) {
                out.push(Point::new(pair[0], pair[1]));
            }
        }
        if self.order >= 1 {
            out.push(Point::new(self.chord, 0.0));
        }
    }

    pub fn reconstruct(&self, params: &[f64]) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.point_count());
        self.reconstruct_into(params, &mut out);
        out
    }

    /// Data-driven starting point: `P1.y = max_y / 2`, interior points evenly
    /// spaced along the chord at height `max_y`, where `max_y = max |y|` (negated
    /// for the lower surface).
    pub fn initial_guess(&self, samples: &[Point], side: SurfaceSide) -> Vec<f64> {
        let max_abs = samples.iter().fold(0.0_f64, |m, p| m.max(p.y.abs()));
        let max_y = side.sign() * max_abs;

        let mut params = Vec::with_capacity(self.free_len());
        if self.order >= 2 {
            params.push(0.5 * max_y);
            for i in 2..self.order {
                params.push(i as f64 * self.chord / self.order as f64);
                params.push(max_y);
            }
        }
        params
    }

    /// Inverse of [`reconstruct`](Self::reconstruct) for a polygon that already
    /// satisfies the constraints.
    pub fn pack(&self, control: &[Point]) -> Vec<f64> {
        let mut params = Vec::with_capacity(self.free_len());
        if self.order >= 2 && control.len() == self.point_count() {
            params.push(control[1].y);
            for p in &control[2..self.order] {
                params.push(p.x);
                params.push(p.y);
            }
        }
        params
    }
}
