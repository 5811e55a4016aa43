//! Order sweep: fit several Bezier orders and recommend one.
//!
//! Each order is fit independently (in parallel). The recommendation uses
//!
//! - BIC = n * ln(SSE/n) + k * ln(n)
//!
//! with `n` the total sample count of both surfaces and `k` the free parameter
//! count of both polygons. If a lower order is within 2 BIC points of the best,
//! the lower order wins.

use rayon::prelude::*;

use crate::domain::{AirfoilFit, FitConfig, Point};
use crate::error::AppError;
use crate::fit::bezier::BezierFitter;
use crate::fit::params::PolygonLayout;

/// Smallest SSE/n fed to the logarithm (exact fits would give `-inf`).
const MIN_MSE: f64 = 1e-300;

#[derive(Debug, Clone)]
pub struct OrderFit {
    pub fit: AirfoilFit,
    pub n_params: usize,
    pub bic: f64,
}

impl OrderFit {
    pub fn order(&self) -> usize {
        self.fit.order
    }
}

#[derive(Debug, Clone)]
pub struct OrderSweep {
    /// One entry per distinct requested order, ascending.
    pub fits: Vec<OrderFit>,
    pub recommended: usize,
}

impl OrderSweep {
    pub fn best(&self) -> Option<&OrderFit> {
        self.fits.iter().find(|f| f.order() == self.recommended)
    }
}

pub fn sweep_orders(
    upper: &[Point],
    lower: &[Point],
    orders: &[usize],
    base: &FitConfig,
) -> Result<OrderSweep, AppError> {
    let mut orders = orders.to_vec();
    orders.sort_unstable();
    orders.dedup();
    if orders.is_empty() {
        return Err(AppError::invalid_input("No Bezier orders to sweep."));
    }

    // Validate every configuration up front so a bad order fails before any work.
    let fitters = orders
        .iter()
        .map(|&order| {
            BezierFitter::new(FitConfig {
                order,
                ..*base
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n = upper.len() + lower.len();
    let fits = fitters
        .par_iter()
        .map(|fitter| {
            let fit = fitter.fit(upper, lower)?;
            let n_params = 2 * PolygonLayout::new(fit.order, fit.chord).free_len();
            let bic = bic(fit.total_sse(), n, n_params);
            Ok(OrderFit { fit, n_params, bic })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let recommended = select_by_bic(&fits);
    Ok(OrderSweep { fits, recommended })
}

pub fn bic(sse: f64, n: usize, k: usize) -> f64 {
    let n_f = n.max(1) as f64;
    let mse = (sse / n_f).max(MIN_MSE);
    n_f * mse.ln() + k as f64 * n_f.ln()
}

/// `fits` must be non-empty and sorted by ascending order.
fn select_by_bic(fits: &[OrderFit]) -> usize {
    let mut best = &fits[0];
    for f in &fits[1..] {
        if f.bic < best.bic {
            best = f;
        }
    }

    // Prefer the simplest order within 2 BIC points of the best.
    let best_bic = best.bic;
    fits.iter()
        .find(|f| f.bic <= best_bic + 2.0)
        .map(|f| f.order())
        .unwrap_or(best.order())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::naca::Naca4;

    #[test]
    fn bic_penalizes_parameters() {
        assert!(bic(1.0, 50, 4) < bic(1.0, 50, 10));
        assert!(bic(0.0, 50, 4).is_finite());
    }

    #[test]
    fn sweep_returns_sorted_unique_orders() {
        let foil = Naca4::parse("2412").unwrap().surfaces(30);
        let sweep = sweep_orders(&foil.upper, &foil.lower, &[6, 3, 6, 4], &FitConfig::default()).unwrap();
        let orders: Vec<usize> = sweep.fits.iter().map(|f| f.order()).collect();
        assert_eq!(orders, vec![3, 4, 6]);
        assert!(orders.contains(&sweep.recommended));
        assert!(sweep.best().is_some());
        assert_eq!(sweep.fits[0].n_params, 6);
    }

    #[test]
    fn sweep_rejects_empty_and_invalid_orders() {
        let foil = Naca4::parse("0012").unwrap().surfaces(20);
        assert!(sweep_orders(&foil.upper, &foil.lower, &[], &FitConfig::default()).is_err());
        assert!(sweep_orders(&foil.upper, &foil.lower, &[0, 4], &FitConfig::default()).is_err());
    }

    #[test]
    fn simpler_order_wins_close_bic() {
        let foil = Naca4::parse("0012").unwrap().surfaces(20);
        let base = FitConfig::default();
        let make = |order: usize, bic: f64| OrderFit {
            fit: BezierFitter::new(FitConfig { order, ..base })
                .unwrap()
                .fit(&foil.upper, &foil.lower)
                .unwrap(),
            n_params: 0,
            bic,
        };
        let fits = vec![make(3, -100.0), make(5, -101.5), make(7, -110.0)];
        assert_eq!(select_by_bic(&fits), 7);
        let fits = vec![make(3, -100.0), make(5, -101.5)];
        assert_eq!(select_by_bic(&fits), 3);
    }
}
