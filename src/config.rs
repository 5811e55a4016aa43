//! Environment-driven settings.
//!
//! Values come from the process environment after loading an optional `.env`
//! file. Every setting has a default except the solver URL, which is only
//! required when an analysis actually runs.

use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::{FitConfig, DEFAULT_CURVE_POINTS, DEFAULT_MAX_ITERATIONS, DEFAULT_ORDER, DEFAULT_TOLERANCE};
use crate::error::AppError;

pub const DEFAULT_MAX_ALPHA_RANGE: f64 = 40.0;
pub const DEFAULT_N_CRIT: f64 = 9.0;
pub const DEFAULT_MODEL_SIZE: &str = "xsmall";
pub const DEFAULT_CACHE_PATH: &str = "foil-cache.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub solver_url: Option<String>,
    pub cache_path: PathBuf,
    pub default_order: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub curve_points: usize,
    /// Widest allowed `end - start` of an alpha sweep, degrees.
    pub max_alpha_range: f64,
    pub default_n_crit: f64,
    pub model_size: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver_url: None,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            default_order: DEFAULT_ORDER,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            curve_points: DEFAULT_CURVE_POINTS,
            max_alpha_range: DEFAULT_MAX_ALPHA_RANGE,
            default_n_crit: DEFAULT_N_CRIT,
            model_size: DEFAULT_MODEL_SIZE.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let d = Self::default();
        let settings = Self {
            solver_url: lookup("AERO_SOLVER_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            cache_path: lookup("FOIL_CACHE_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(d.cache_path),
            default_order: parse_var(&lookup, "FOIL_DEFAULT_ORDER", d.default_order)?,
            max_iterations: parse_var(&lookup, "FOIL_MAX_ITERATIONS", d.max_iterations)?,
            tolerance: parse_var(&lookup, "FOIL_TOLERANCE", d.tolerance)?,
            curve_points: parse_var(&lookup, "FOIL_CURVE_POINTS", d.curve_points)?,
            max_alpha_range: parse_var(&lookup, "FOIL_MAX_ALPHA_RANGE", d.max_alpha_range)?,
            default_n_crit: parse_var(&lookup, "FOIL_DEFAULT_N_CRIT", d.default_n_crit)?,
            model_size: lookup("FOIL_MODEL_SIZE")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.model_size),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.default_order < 1 {
            return Err(AppError::config("FOIL_DEFAULT_ORDER must be at least 1."));
        }
        if self.curve_points < 2 {
            return Err(AppError::config("FOIL_CURVE_POINTS must be at least 2."));
        }
        if self.max_iterations < 1 {
            return Err(AppError::config("FOIL_MAX_ITERATIONS must be at least 1."));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AppError::config("FOIL_TOLERANCE must be a positive number."));
        }
        if !(self.max_alpha_range.is_finite() && self.max_alpha_range > 0.0) {
            return Err(AppError::config("FOIL_MAX_ALPHA_RANGE must be a positive number."));
        }
        if !self.default_n_crit.is_finite() {
            return Err(AppError::config("FOIL_DEFAULT_N_CRIT must be finite."));
        }
        Ok(())
    }

    /// Fitter configuration for `order` (or the configured default).
    pub fn fit_config(&self, order: Option<usize>) -> FitConfig {
        FitConfig {
            order: order.unwrap_or(self.default_order),
            curve_points: self.curve_points,
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }

    pub fn require_solver_url(&self) -> Result<&str, AppError> {
        self.solver_url
            .as_deref()
            .ok_or_else(|| AppError::config("Missing AERO_SOLVER_URL in environment (.env)."))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("Invalid value for {key}: '{raw}'."))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert!(s.require_solver_url().is_err());
        assert_eq!(s.fit_config(None).order, 6);
    }

    #[test]
    fn overrides_are_parsed() {
        let s = Settings::from_lookup(lookup_from(&[
            ("AERO_SOLVER_URL", "http://localhost:9000/"),
            ("FOIL_DEFAULT_ORDER", "8"),
            ("FOIL_TOLERANCE", "1e-8"),
            ("FOIL_MODEL_SIZE", "large"),
        ]))
        .unwrap();
        assert_eq!(s.require_solver_url().unwrap(), "http://localhost:9000");
        assert_eq!(s.default_order, 8);
        assert_eq!(s.tolerance, 1e-8);
        assert_eq!(s.model_size, "large");
        assert_eq!(s.fit_config(Some(4)).order, 4);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        let err = Settings::from_lookup(lookup_from(&[("FOIL_CURVE_POINTS", "many")])).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
        assert!(Settings::from_lookup(lookup_from(&[("FOIL_DEFAULT_ORDER", "0")])).is_err());
    }
}
