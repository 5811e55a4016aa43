//! Quasi-Newton (BFGS) minimizer with finite-difference gradients.
//!
//! The airfoil objective is a black-box scalar function of a handful of
//! parameters (at most a few dozen), so we:
//!
//! - estimate gradients by central differences
//! - maintain a dense inverse-Hessian approximation (nalgebra)
//! - take Armijo backtracking steps along the quasi-Newton direction
//!
//! Termination follows the usual SLSQP-style test: both the objective change and
//! the step length of the last iteration fall below `tolerance`. Running out of
//! iterations (or failing to find a descent step) is not an error; the best
//! iterate is returned with `converged = false`.

use nalgebra::{DMatrix, DVector};

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfgsConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    /// Relative central-difference step (scaled by `max(1, |x_i|)`).
    pub fd_step: f64,
    /// Maximum number of step halvings per line search.
    pub max_backtracks: usize,
    /// Armijo sufficient-decrease constant.
    pub armijo: f64,
}

impl Default for BfgsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            tolerance: 1e-6,
            // ~ cbrt(f64::EPSILON), the usual choice for central differences.
            fd_step: 6.0e-6,
            max_backtracks: 40,
            armijo: 1e-4,
        }
    }
}

/// Optimizer output.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub params: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    pub converged: bool,
}

/// Counts evaluations and maps non-finite values to `+inf` so they always lose
/// comparisons in the line search.
struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F: FnMut(&[f64]) -> f64> Counted<F> {
    fn value(&mut self, x: &DVector<f64>) -> f64 {
        self.evaluations += 1;
        let v = (self.f)(x.as_slice());
        if v.is_finite() { v } else { f64::INFINITY }
    }

    fn gradient(&mut self, x: &DVector<f64>, fx: f64, rel_step: f64) -> DVector<f64> {
        let n = x.len();
        let mut g = DVector::zeros(n);
        let mut probe = x.clone();
        for i in 0..n {
            let h = rel_step * x[i].abs().max(1.0);
            probe[i] = x[i] + h;
            let f_plus = self.value(&probe);
            probe[i] = x[i] - h;
            let f_minus = self.value(&probe);
            probe[i] = x[i];

            g[i] = match (f_plus.is_finite(), f_minus.is_finite()) {
                (true, true) => (f_plus - f_minus) / (2.0 * h),
                (true, false) if fx.is_finite() => (f_plus - fx) / h,
                (false, true) if fx.is_finite() => (fx - f_minus) / h,
                _ => 0.0,
            };
        }
        g
    }
}

/// Minimize `objective` starting from `x0`.
pub fn minimize<F>(objective: F, x0: &[f64], config: &BfgsConfig) -> Minimum
where
    F: FnMut(&[f64]) -> f64,
{
    let mut obj = Counted {
        f: objective,
        evaluations: 0,
    };
    let n = x0.len();
    let mut x = DVector::from_column_slice(x0);
    let mut fx = obj.value(&x);

    if n == 0 || !fx.is_finite() {
        return Minimum {
            params: x0.to_vec(),
            value: fx,
            iterations: 0,
            evaluations: obj.evaluations,
            converged: n == 0,
        };
    }

    let mut g = obj.gradient(&x, fx, config.fd_step);
    let mut h = DMatrix::<f64>::identity(n, n);
    let mut h_is_identity = true;
    let mut scaled = false;
    let mut iterations = 0usize;
    let mut converged = false;

    while iterations < config.max_iterations {
        if fx == 0.0 || g.amax() == 0.0 {
            converged = true;
            break;
        }

        let mut d = -(&h * &g);
        let mut slope = g.dot(&d);
        if !(slope < 0.0) {
            // The approximation lost positive definiteness; restart from steepest descent.
            h = DMatrix::identity(n, n);
            h_is_identity = true;
            d = -g.clone();
            slope = -g.norm_squared();
        }

        // Keep the first trial step within a chord-scale trust radius.
        let max_step = x.norm().max(1.0);
        let d_norm = d.norm();
        let alpha0 = if d_norm > max_step { max_step / d_norm } else { 1.0 };

        let Some((alpha, f_new)) = line_search(&mut obj, &x, fx, &d, slope, alpha0, config) else {
            if h_is_identity {
                break;
            }
            h = DMatrix::identity(n, n);
            h_is_identity = true;
            iterations += 1;
            continue;
        };

        let s = &d * alpha;
        let x_new = &x + &s;
        let g_new = obj.gradient(&x_new, f_new, config.fd_step);
        let y = &g_new - &g;
        let sy = s.dot(&y);

        if sy > 1e-12 * s.norm() * y.norm() {
            if !scaled {
                let yy = y.dot(&y);
                if yy > 0.0 {
                    h = DMatrix::identity(n, n) * (sy / yy);
                }
                scaled = true;
            }
            let rho = 1.0 / sy;
            let hy = &h * &y;
            let yhy = y.dot(&hy);
            h -= (&s * hy.transpose() + &hy * s.transpose()) * rho;
            h += (&s * s.transpose()) * (rho * rho * yhy + rho);
            h_is_identity = false;
        }

        let df = (fx - f_new).abs();
        let step = s.norm();
        x = x_new;
        fx = f_new;
        g = g_new;
        iterations += 1;

        if df < config.tolerance && step < config.tolerance {
            converged = true;
            break;
        }
    }

    Minimum {
        params: x.iter().copied().collect(),
        value: fx,
        iterations,
        evaluations: obj.evaluations,
        converged,
    }
}

fn line_search<F: FnMut(&[f64]) -> f64>(
    obj: &mut Counted<F>,
    x: &DVector<f64>,
    fx: f64,
    d: &DVector<f64>,
    slope: f64,
    alpha0: f64,
    config: &BfgsConfig,
) -> Option<(f64, f64)> {
    let mut alpha = alpha0;
    for _ in 0..=config.max_backtracks {
        let trial = x + d * alpha;
        let f_trial = obj.value(&trial);
        if f_trial <= fx + config.armijo * alpha * slope {
            return Some((alpha, f_trial));
        }
        alpha *= 0.5;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimizes_a_shifted_quadratic() {
        let target = [0.3, -1.2, 2.5];
        let f = |x: &[f64]| {
            x.iter()
                .zip(target.iter())
                .enumerate()
                .map(|(i, (a, b))| (i as f64 + 1.0) * (a - b).powi(2))
                .sum::<f64>()
        };
        let min = minimize(f, &[0.0, 0.0, 0.0], &BfgsConfig::default());
        for (a, b) in min.params.iter().zip(target.iter()) {
            assert!((a - b).abs() < 1e-4, "got {a}, want {b}");
        }
        assert!(min.value < 1e-8);
        assert!(min.converged);
    }

    #[test]
    fn minimizes_rosenbrock() {
        let f = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let config = BfgsConfig {
            max_iterations: 2000,
            tolerance: 1e-10,
            ..BfgsConfig::default()
        };
        let min = minimize(f, &[-1.2, 1.0], &config);
        assert!((min.params[0] - 1.0).abs() < 1e-3, "{:?}", min.params);
        assert!((min.params[1] - 1.0).abs() < 1e-3, "{:?}", min.params);
    }

    #[test]
    fn exhausted_budget_returns_last_iterate() {
        let f = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let config = BfgsConfig {
            max_iterations: 2,
            ..BfgsConfig::default()
        };
        let start = (1.0f64 - -1.2f64).powi(2) + 100.0 * (1.0f64 - 1.44f64).powi(2);
        let min = minimize(f, &[-1.2, 1.0], &config);
        assert!(!min.converged);
        assert_eq!(min.iterations, 2);
        assert!(min.value.is_finite());
        assert!(min.value <= start);
    }

    #[test]
    fn empty_parameter_vector_evaluates_once() {
        let min = minimize(|_: &[f64]| 4.0, &[], &BfgsConfig::default());
        assert_eq!(min.value, 4.0);
        assert_eq!(min.evaluations, 1);
        assert!(min.converged);
    }
}
