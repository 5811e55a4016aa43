//! Transport-agnostic route table.
//!
//! A request is `(method, path, body)`; the response is a status code plus a
//! JSON body. Errors are rendered as `{"detail": message}` with the status the
//! error kind maps to. Any HTTP front-end (or the `foil call` command) can sit
//! on top of [`route`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::analysis::service::{
    AnalysisService, CompareAnalysisRequest, FitRequest, GeometryRequest, SingleAnalysisRequest,
};
use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn from_error(err: &AppError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({ "detail": err.message() }),
        }
    }
}

pub fn route(service: &mut AnalysisService, method: &str, path: &str, body: &str) -> Response {
    let path = path.split('?').next().unwrap_or(path);
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };

    let result = match (method.to_ascii_uppercase().as_str(), path) {
        ("GET", "/") => Ok(json!({
            "message": "Airfoil Analysis API",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        ("GET", "/health") => Ok(json!({ "status": "healthy" })),
        ("POST", "/api/analyze") => {
            parse::<SingleAnalysisRequest>(body).and_then(|req| to_json(&service.analyze(&req)?))
        }
        ("POST", "/api/analyze/compare") => {
            parse::<CompareAnalysisRequest>(body).and_then(|req| to_json(&service.compare(&req)?))
        }
        ("POST", "/api/fit") => parse::<FitRequest>(body).and_then(|req| to_json(&service.fit(&req)?)),
        ("POST", "/api/geometry") => {
            parse::<GeometryRequest>(body).and_then(|req| to_json(&service.geometry(&req)?))
        }
        (m, p) => Err(AppError::new(ErrorKind::NotFound, format!("No route for {m} {p}."))),
    };

    match result {
        Ok(body) => Response::ok(body),
        Err(err) => Response::from_error(&err),
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::internal(format!("Failed to encode response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cache::MemoryCache;
    use crate::analysis::solver::{AeroCoefficients, AeroSolver, SolverInput};
    use crate::config::Settings;
    use crate::data::naca::Naca4;

    struct Unreachable;

    impl AeroSolver for Unreachable {
        fn analyze(&self, _: &SolverInput) -> Result<AeroCoefficients, AppError> {
            Err(AppError::solver("solver offline"))
        }
    }

    fn service() -> AnalysisService {
        AnalysisService::new(Settings::default(), Box::new(Unreachable), Box::new(MemoryCache::new()))
    }

    #[test]
    fn health_and_root() {
        let mut svc = service();
        let r = route(&mut svc, "GET", "/health", "");
        assert_eq!(r.status, 200);
        assert_eq!(r.body["status"], "healthy");
        assert_eq!(route(&mut svc, "get", "/", "").status, 200);
    }

    #[test]
    fn unknown_route_is_404() {
        let mut svc = service();
        let r = route(&mut svc, "GET", "/api/jobs/123", "");
        assert_eq!(r.status, 404);
        assert!(r.body["detail"].as_str().unwrap().contains("/api/jobs/123"));
    }

    #[test]
    fn malformed_json_is_400() {
        let mut svc = service();
        let r = route(&mut svc, "POST", "/api/fit", "{not json");
        assert_eq!(r.status, 400);
    }

    #[test]
    fn fit_route_returns_polygons() {
        let mut svc = service();
        let mut body = serde_json::to_value(Naca4::parse("0012").unwrap().surfaces(25).to_coords()).unwrap();
        body["order"] = json!(3);
        let r = route(&mut svc, "POST", "/api/fit/", &body.to_string());
        assert_eq!(r.status, 200, "{}", r.body);
        assert_eq!(r.body["order"], 3);
        assert_eq!(r.body["upper_control_points"]["x"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn solver_failures_surface_as_502() {
        let mut svc = service();
        let body = json!({
            "airfoil_id": "a",
            "conditions": { "Re": 1e6, "alpha_range": [0.0, 4.0, 2.0] },
            "coordinates": Naca4::parse("2412").unwrap().surfaces(20).to_coords(),
        });
        let r = route(&mut svc, "POST", "/api/analyze", &body.to_string());
        assert_eq!(r.status, 502);
        assert_eq!(r.body["detail"], "solver offline");
    }
}
