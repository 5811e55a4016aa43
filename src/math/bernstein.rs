//! Bernstein basis and Bezier curve sampling.
//!
//! The degree-`n` basis is
//!
//! - `B(i, n, t) = C(n, i) * t^i * (1 - t)^(n - i)`
//!
//! so `t = 0` maps to control point 0 (leading edge) and `t = 1` to control
//! point `n` (trailing edge).
//!
//! The fitter samples the same parameter grid on every objective evaluation, so
//! [`CurveSampler`] precomputes the `(samples × (n + 1))` basis matrix once and
//! each evaluation reduces to a small dense product.

use nalgebra::DMatrix;

use crate::domain::Point;

/// Binomial coefficient `C(n, k)` as a float (multiplicative form, exact for
/// the small degrees used for airfoils).
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut out = 1.0;
    for j in 0..k {
        out = out * (n - j) as f64 / (j + 1) as f64;
    }
    out
}

/// Evaluate one Bernstein basis polynomial.
pub fn bernstein(n: usize, i: usize, t: f64) -> f64 {
    if i > n {
        return 0.0;
    }
    binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32)
}

/// `count` uniformly spaced parameter values covering `[0, 1]` inclusive.
pub fn uniform_parameters(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..count).map(|i| i as f64 / (count - 1) as f64).collect(),
    }
}

/// Basis matrix with one row per parameter value and one column per control point.
pub fn basis_matrix(order: usize, params: &[f64]) -> DMatrix<f64> {
    DMatrix::from_fn(params.len(), order + 1, |r, i| bernstein(order, i, params[r]))
}

/// Evaluate the Bezier curve defined by `control` at a single parameter value.
pub fn evaluate(control: &[Point], t: f64) -> Point {
    let Some(n) = control.len().checked_sub(1) else {
        return Point::origin();
    };
    let mut x = 0.0;
    let mut y = 0.0;
    for (i, p) in control.iter().enumerate() {
        let b = bernstein(n, i, t);
        x += b * p.x;
        y += b * p.y;
    }
    Point::new(x, y)
}

/// Sample `count` points along the curve at uniform parameter values.
pub fn sample_curve(control: &[Point], count: usize) -> Vec<Point> {
    uniform_parameters(count)
        .into_iter()
        .map(|t| evaluate(control, t))
        .collect()
}

/// Reusable sampler for a fixed order and parameter grid.
#[derive(Debug, Clone)]
pub struct CurveSampler {
    order: usize,
    basis: DMatrix<f64>,
}

impl CurveSampler {
    pub fn new(order: usize, count: usize) -> Self {
        let params = uniform_parameters(count);
        Self {
            order,
            basis: basis_matrix(order, &params),
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of points produced per sampling.
    pub fn len(&self) -> usize {
        self.basis.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.basis.nrows() == 0
    }

    /// Sample the curve for `control` into `out` (cleared first, capacity reused).
    ///
    /// # Panics
    /// Panics if `control` does not have `order + 1` points.
    pub fn sample_into(&self, control: &[Point], out: &mut Vec<Point>) {
        assert_eq!(control.len(), self.order + 1, "control polygon size mismatch");
        out.clear();
        for r in 0..self.basis.nrows() {
            let mut x = 0.0;
            let mut y = 0.0;
            for (i, p) in control.iter().enumerate() {
                let b = self.basis[(r, i)];
                x += b * p.x;
                y += b * p.y;
            }
            out.push(Point::new(x, y));
        }
    }

    pub fn sample(&self, control: &[Point]) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.len());
        self.sample_into(control, &mut out);
        out
    }
}
