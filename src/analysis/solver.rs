//! Aerodynamic solver boundary.
//!
//! The solver is an external service that maps a closed contour plus flow
//! conditions to per-alpha coefficients. This crate only ships the HTTP client;
//! tests drive the service through in-process implementations of the trait.

use log::info;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::domain::Point;
use crate::error::AppError;

/// Request sent to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverInput {
    pub name: String,
    /// Closed contour, upper TE → LE → lower TE, as `[x, y]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub alpha: Vec<f64>,
    #[serde(rename = "Re")]
    pub re: f64,
    pub mach: f64,
    pub n_crit: f64,
    pub model_size: String,
}

impl SolverInput {
    pub fn contour_points(&self) -> Vec<Point> {
        self.coordinates.iter().map(|&[x, y]| Point::new(x, y)).collect()
    }
}

/// Per-alpha coefficient series returned by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroCoefficients {
    pub alpha: Vec<f64>,
    #[serde(rename = "CL")]
    pub cl: Vec<f64>,
    #[serde(rename = "CD")]
    pub cd: Vec<f64>,
    #[serde(rename = "CM")]
    pub cm: Vec<f64>,
    #[serde(rename = "Cpmin", default, skip_serializing_if = "Option::is_none")]
    pub cpmin: Option<Vec<f64>>,
    #[serde(rename = "Top_Xtr", default, skip_serializing_if = "Option::is_none")]
    pub top_xtr: Option<Vec<f64>>,
    #[serde(rename = "Bot_Xtr", default, skip_serializing_if = "Option::is_none")]
    pub bot_xtr: Option<Vec<f64>>,
    #[serde(rename = "analysis_confidence", default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Vec<f64>>,
}

impl AeroCoefficients {
    /// Every series must have one value per requested alpha.
    pub fn check_lengths(&self, expected: usize) -> Result<(), AppError> {
        let required = [
            ("alpha", Some(&self.alpha)),
            ("CL", Some(&self.cl)),
            ("CD", Some(&self.cd)),
            ("CM", Some(&self.cm)),
            ("Cpmin", self.cpmin.as_ref()),
            ("Top_Xtr", self.top_xtr.as_ref()),
            ("Bot_Xtr", self.bot_xtr.as_ref()),
            ("analysis_confidence", self.confidence.as_ref()),
        ];
        for (label, series) in required {
            if let Some(series) = series {
                if series.len() != expected {
                    return Err(AppError::solver(format!(
                        "Solver returned {} {label} values for {expected} angles of attack.",
                        series.len()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn average_confidence(&self) -> Option<f64> {
        let c = self.confidence.as_ref()?;
        if c.is_empty() {
            return None;
        }
        Some(c.iter().sum::<f64>() / c.len() as f64)
    }
}

pub trait AeroSolver: Send + Sync {
    fn analyze(&self, input: &SolverInput) -> Result<AeroCoefficients, AppError>;
}

/// Solver reached over HTTP: `POST {base_url}/analyze` with a JSON body.
pub struct HttpAeroSolver {
    client: Client,
    base_url: String,
}

impl HttpAeroSolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self::new(settings.require_solver_url()?))
    }

    pub fn endpoint(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }
}

impl AeroSolver for HttpAeroSolver {
    fn analyze(&self, input: &SolverInput) -> Result<AeroCoefficients, AppError> {
        let url = self.endpoint();
        info!(
            "solver request: {} ({} contour points, {} alphas) -> {url}",
            input.name,
            input.coordinates.len(),
            input.alpha.len()
        );

        let resp = self
            .client
            .post(&url)
            .json(input)
            .send()
            .map_err(|e| AppError::solver(format!("Solver request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::solver(format!(
                "Solver request failed with status {}.",
                resp.status()
            )));
        }

        let body: AeroCoefficients = resp
            .json()
            .map_err(|e| AppError::solver(format!("Failed to parse solver response: {e}")))?;
        body.check_lengths(input.alpha.len())?;
        Ok(body)
    }
}

/// Stand-in used when no solver URL is configured: every analysis fails with a
/// `Config` error, while routes that never reach the solver keep working.
pub struct UnconfiguredSolver;

impl AeroSolver for UnconfiguredSolver {
    fn analyze(&self, _input: &SolverInput) -> Result<AeroCoefficients, AppError> {
        Err(AppError::config("Missing AERO_SOLVER_URL in environment (.env)."))
    }
}

/// The HTTP solver when `AERO_SOLVER_URL` is set, otherwise [`UnconfiguredSolver`].
pub fn solver_from_settings(settings: &Settings) -> Box<dyn AeroSolver> {
    match HttpAeroSolver::from_settings(settings) {
        Ok(solver) => Box::new(solver),
        Err(_) => Box::new(UnconfiguredSolver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_use_solver_field_names() {
        let json = r#"{"alpha":[0,1],"CL":[0.1,0.2],"CD":[0.01,0.011],"CM":[-0.05,-0.05],
                       "analysis_confidence":[0.9,0.7]}"#;
        let c: AeroCoefficients = serde_json::from_str(json).unwrap();
        assert_eq!(c.cl, vec![0.1, 0.2]);
        assert!(c.cpmin.is_none());
        assert!((c.average_confidence().unwrap() - 0.8).abs() < 1e-12);
        assert!(c.check_lengths(2).is_ok());
        assert_eq!(c.check_lengths(3).unwrap_err().status_code(), 502);
    }

    #[test]
    fn endpoint_joins_base_url() {
        assert_eq!(
            HttpAeroSolver::new("http://solver:8000/").endpoint(),
            "http://solver:8000/analyze"
        );
    }

    #[test]
    fn missing_url_yields_config_error_on_analyze() {
        let solver = solver_from_settings(&Settings::default());
        let input = SolverInput {
            name: "x".to_string(),
            coordinates: vec![[1.0, 0.0], [0.0, 0.0], [1.0, 0.0]],
            alpha: vec![0.0],
            re: 1e6,
            mach: 0.0,
            n_crit: 9.0,
            model_size: "xsmall".to_string(),
        };
        let err = solver.analyze(&input).unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.message().contains("AERO_SOLVER_URL"));
    }
}
