//! Request-level operations: analyze (cached), compare, fit and geometry.
//!
//! The service owns its collaborators (solver, cache) and the settings; the
//! route table in `api` and the CLI both go through it.

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::cache::{AnalysisResults, CachedAnalysis, ConditionCache};
use crate::analysis::conditions::{alpha_schedule, condition_hash, smoothness_measure, AnalysisConditions};
use crate::analysis::solver::{AeroSolver, SolverInput};
use crate::config::Settings;
use crate::domain::{AirfoilCoords, Coords, Point};
use crate::error::AppError;
use crate::fit::BezierFitter;
use crate::geometry::{assemble_contour, deflect_flap, thickness_camber, FlapSpec, SectionProperties, DEFAULT_STATIONS};

/// Orders accepted over the request boundary.
pub const MAX_REQUEST_ORDER: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleAnalysisRequest {
    pub airfoil_id: String,
    pub conditions: AnalysisConditions,
    pub coordinates: AirfoilCoords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirfoilInput {
    pub airfoil_id: String,
    pub coordinates: AirfoilCoords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareAnalysisRequest {
    pub airfoils: Vec<AirfoilInput>,
    pub conditions: AnalysisConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub airfoil_id: String,
    pub condition_hash: String,
    pub cached: bool,
    pub results: AnalysisResults,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub results: Vec<AnalysisResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRequest {
    #[serde(flatten)]
    pub coordinates: AirfoilCoords,
    #[serde(default)]
    pub order: Option<usize>,
}

/// Fitted polygons and curves of both surfaces.
///
/// Every array runs leading edge → trailing edge: control point 0 is `(0, 0)`
/// and the last one is `(chord, 0)`, and `upper_curve` / `lower_curve` start at
/// the leading edge (curve parameter t = 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResponse {
    pub order: usize,
    pub chord: f64,
    pub upper_control_points: Coords,
    pub lower_control_points: Coords,
    pub upper_curve: Coords,
    pub lower_curve: Coords,
    pub upper_sse: f64,
    pub lower_sse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRequest {
    #[serde(flatten)]
    pub coordinates: AirfoilCoords,
    #[serde(default)]
    pub stations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flap: Option<FlapSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryResponse {
    /// Geometry the properties were computed on (deflected when a flap was given).
    pub coordinates: AirfoilCoords,
    pub properties: SectionProperties,
}

pub struct AnalysisService {
    settings: Settings,
    solver: Box<dyn AeroSolver>,
    cache: Box<dyn ConditionCache>,
}

impl AnalysisService {
    pub fn new(settings: Settings, solver: Box<dyn AeroSolver>, cache: Box<dyn ConditionCache>) -> Self {
        Self {
            settings,
            solver,
            cache,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn analyze(&mut self, req: &SingleAnalysisRequest) -> Result<AnalysisResponse, AppError> {
        if req.airfoil_id.trim().is_empty() {
            return Err(AppError::invalid_input("airfoil_id must not be empty."));
        }
        let range = req.conditions.validate(self.settings.max_alpha_range)?;
        let (upper, lower) = surfaces(&req.coordinates)?;
        let hash = condition_hash(&req.conditions, &req.airfoil_id)?;

        if let Some(hit) = self.cache.get(&hash)? {
            info!("cache hit: {} ({})", req.airfoil_id, short(&hash));
            return Ok(AnalysisResponse {
                airfoil_id: req.airfoil_id.clone(),
                condition_hash: hash,
                cached: true,
                results: hit.results,
            });
        }
        info!("cache miss: {} ({})", req.airfoil_id, short(&hash));

        let (upper, lower) = match req.conditions.flap()? {
            Some(flap) => {
                let deflected = deflect_flap(&req.coordinates, flap)?;
                surfaces(&deflected)?
            }
            None => (upper, lower),
        };
        let contour = assemble_contour(&upper, &lower);
        let alphas = alpha_schedule(range);

        let input = SolverInput {
            name: req
                .coordinates
                .name
                .clone()
                .unwrap_or_else(|| req.airfoil_id.clone()),
            coordinates: contour.iter().map(|p| [p.x, p.y]).collect(),
            alpha: alphas.clone(),
            re: req.conditions.re,
            mach: req.conditions.mach,
            n_crit: req.conditions.n_crit.unwrap_or(self.settings.default_n_crit),
            model_size: self.settings.model_size.clone(),
        };
        let coefficients = self.solver.analyze(&input)?;
        coefficients.check_lengths(alphas.len())?;

        let results = AnalysisResults {
            avg_confidence: coefficients.average_confidence(),
            smoothness_cm: smoothness_measure(&coefficients.alpha, &coefficients.cm),
            coefficients,
        };
        let entry = CachedAnalysis {
            airfoil_id: req.airfoil_id.clone(),
            condition_hash: hash.clone(),
            results: results.clone(),
            created_at: Utc::now(),
        };
        // The solver result is still returned when it cannot be stored.
        if let Err(err) = self.cache.put(&hash, entry) {
            warn!("cache store failed for {} ({}): {err}", req.airfoil_id, short(&hash));
        }

        Ok(AnalysisResponse {
            airfoil_id: req.airfoil_id.clone(),
            condition_hash: hash,
            cached: false,
            results,
        })
    }

    pub fn compare(&mut self, req: &CompareAnalysisRequest) -> Result<CompareResponse, AppError> {
        if req.airfoils.len() < 2 {
            return Err(AppError::invalid_input(
                "At least 2 airfoils are required for comparison.",
            ));
        }
        let mut results = Vec::with_capacity(req.airfoils.len());
        for airfoil in &req.airfoils {
            results.push(self.analyze(&SingleAnalysisRequest {
                airfoil_id: airfoil.airfoil_id.clone(),
                conditions: req.conditions.clone(),
                coordinates: airfoil.coordinates.clone(),
            })?);
        }
        Ok(CompareResponse { results })
    }

    pub fn fit(&self, req: &FitRequest) -> Result<FitResponse, AppError> {
        let order = req.order.unwrap_or(self.settings.default_order);
        if !(1..=MAX_REQUEST_ORDER).contains(&order) {
            return Err(AppError::invalid_input(format!(
                "order must be between 1 and {MAX_REQUEST_ORDER}; got {order}."
            )));
        }
        let fitter = BezierFitter::new(self.settings.fit_config(Some(order)))?;
        let fit = fitter.fit_coords(&req.coordinates)?;
        Ok(FitResponse {
            order: fit.order,
            chord: fit.chord,
            upper_control_points: Coords::from_points(&fit.upper.control_points),
            lower_control_points: Coords::from_points(&fit.lower.control_points),
            upper_curve: Coords::from_points(&fit.upper.curve),
            lower_curve: Coords::from_points(&fit.lower.curve),
            upper_sse: fit.upper.sse,
            lower_sse: fit.lower.sse,
        })
    }

    pub fn geometry(&self, req: &GeometryRequest) -> Result<GeometryResponse, AppError> {
        let coordinates = match req.flap {
            Some(flap) => deflect_flap(&req.coordinates, flap)?,
            None => req.coordinates.clone(),
        };
        let (upper, lower) = surfaces(&coordinates)?;
        let properties = thickness_camber(&upper, &lower, req.stations.unwrap_or(DEFAULT_STATIONS))?;
        Ok(GeometryResponse {
            coordinates,
            properties,
        })
    }
}

fn surfaces(coords: &AirfoilCoords) -> Result<(Vec<Point>, Vec<Point>), AppError> {
    let upper = coords.upper_points()?;
    let lower = coords.lower_points()?;
    if upper.len() < 2 || lower.len() < 2 {
        return Err(AppError::invalid_input(
            "Need at least 2 points for upper and lower surfaces.",
        ));
    }
    Ok((upper, lower))
}

fn short(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::analysis::cache::MemoryCache;
    use crate::analysis::solver::AeroCoefficients;
    use crate::data::naca::Naca4;

    /// Linear lift curve; counts calls so tests can observe cache hits.
    struct StubSolver {
        calls: Arc<AtomicUsize>,
    }

    impl AeroSolver for StubSolver {
        fn analyze(&self, input: &SolverInput) -> Result<AeroCoefficients, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = input.alpha.len();
            Ok(AeroCoefficients {
                alpha: input.alpha.clone(),
                cl: input.alpha.iter().map(|a| 0.11 * a).collect(),
                cd: vec![0.01; n],
                cm: vec![-0.05; n],
                cpmin: None,
                top_xtr: None,
                bot_xtr: None,
                confidence: Some(vec![0.9; n]),
            })
        }
    }

    fn service() -> (AnalysisService, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let solver = StubSolver {
            calls: Arc::clone(&calls),
        };
        let svc = AnalysisService::new(Settings::default(), Box::new(solver), Box::new(MemoryCache::new()));
        (svc, calls)
    }

    fn conditions() -> AnalysisConditions {
        AnalysisConditions {
            re: 5e5,
            mach: 0.0,
            alpha_range: vec![0.0, 5.0, 1.0],
            n_crit: None,
            has_control_surface: false,
            control_surface_percent: None,
            control_surface_deflection: None,
        }
    }

    fn request(id: &str) -> SingleAnalysisRequest {
        SingleAnalysisRequest {
            airfoil_id: id.to_string(),
            conditions: conditions(),
            coordinates: Naca4::parse("2412").unwrap().surfaces(30).to_coords(),
        }
    }

    #[test]
    fn second_identical_request_is_served_from_cache() {
        let (mut svc, calls) = service();
        let first = svc.analyze(&request("a")).unwrap();
        assert!(!first.cached);
        assert_eq!(first.results.coefficients.alpha, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((first.results.avg_confidence.unwrap() - 0.9).abs() < 1e-12);
        assert!(first.results.smoothness_cm.abs() < 1e-12);

        let second = svc.analyze(&request("a")).unwrap();
        assert!(second.cached);
        assert_eq!(second.results, first.results);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        svc.analyze(&request("b")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct ReadOnlyCache;

    impl ConditionCache for ReadOnlyCache {
        fn get(&self, _key: &str) -> Result<Option<CachedAnalysis>, AppError> {
            Ok(None)
        }

        fn put(&mut self, _key: &str, _entry: CachedAnalysis) -> Result<(), AppError> {
            Err(AppError::io("cache is read-only"))
        }
    }

    #[test]
    fn cache_store_failure_still_returns_solver_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let solver = StubSolver {
            calls: Arc::clone(&calls),
        };
        let mut svc = AnalysisService::new(Settings::default(), Box::new(solver), Box::new(ReadOnlyCache));

        let resp = svc.analyze(&request("a")).unwrap();
        assert!(!resp.cached);
        assert_eq!(resp.results.coefficients.alpha.len(), 6);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalid_alpha_range_never_reaches_solver() {
        let (mut svc, calls) = service();
        let mut req = request("a");
        req.conditions.alpha_range = vec![5.0, 0.0, 1.0];
        assert_eq!(svc.analyze(&req).unwrap_err().status_code(), 400);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn compare_needs_two_airfoils() {
        let (mut svc, _) = service();
        let one = CompareAnalysisRequest {
            airfoils: vec![AirfoilInput {
                airfoil_id: "a".into(),
                coordinates: request("a").coordinates,
            }],
            conditions: conditions(),
        };
        assert_eq!(svc.compare(&one).unwrap_err().status_code(), 400);

        let two = CompareAnalysisRequest {
            airfoils: vec![
                AirfoilInput {
                    airfoil_id: "a".into(),
                    coordinates: request("a").coordinates,
                },
                AirfoilInput {
                    airfoil_id: "b".into(),
                    coordinates: Naca4::parse("0012").unwrap().surfaces(30).to_coords(),
                },
            ],
            conditions: conditions(),
        };
        let out = svc.compare(&two).unwrap();
        assert_eq!(out.results.len(), 2);
        assert_ne!(out.results[0].condition_hash, out.results[1].condition_hash);
    }

    #[test]
    fn fit_enforces_order_bounds() {
        let (svc, _) = service();
        let coords = Naca4::parse("0012").unwrap().surfaces(25).to_coords();
        let req = FitRequest {
            coordinates: coords.clone(),
            order: Some(16),
        };
        assert_eq!(svc.fit(&req).unwrap_err().status_code(), 400);

        let out = svc
            .fit(&FitRequest {
                coordinates: coords,
                order: Some(4),
            })
            .unwrap();
        assert_eq!(out.order, 4);
        assert_eq!(out.upper_control_points.len(), 5);
        assert_eq!(out.upper_curve.len(), 200);
        assert!(out.upper_sse >= 0.0 && out.lower_sse >= 0.0);
    }

    #[test]
    fn fit_arrays_run_leading_to_trailing_edge() {
        let (svc, _) = service();
        let out = svc
            .fit(&FitRequest {
                coordinates: Naca4::parse("2412").unwrap().surfaces(30).to_coords(),
                order: Some(5),
            })
            .unwrap();
        for (poly, curve) in [
            (&out.upper_control_points, &out.upper_curve),
            (&out.lower_control_points, &out.lower_curve),
        ] {
            assert_eq!((poly.x[0], poly.y[0]), (0.0, 0.0));
            assert_eq!((poly.x[5], poly.y[5]), (out.chord, 0.0));
            let last = curve.len() - 1;
            assert!(curve.x[0].abs() < 1e-12 && curve.y[0].abs() < 1e-12);
            assert!((curve.x[last] - out.chord).abs() < 1e-12 && curve.y[last].abs() < 1e-12);
        }
    }

    #[test]
    fn geometry_reports_thickness() {
        let (svc, _) = service();
        let out = svc
            .geometry(&GeometryRequest {
                coordinates: Naca4::parse("0012").unwrap().surfaces(60).to_coords(),
                stations: Some(51),
                flap: None,
            })
            .unwrap();
        assert_eq!(out.properties.x.len(), 51);
        assert!((out.properties.max_thickness - 0.12).abs() < 5e-3);
    }
}
