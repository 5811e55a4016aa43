//! Thickness and camber distributions.

use serde::{Deserialize, Serialize};

use crate::domain::Point;
use crate::error::AppError;
use crate::geometry::ops::{is_monotonic, normalize_surface, Monotonic};

pub const DEFAULT_STATIONS: usize = 101;

/// Per-station thickness/camber plus the summary maxima.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub x: Vec<f64>,
    pub thickness: Vec<f64>,
    pub camber: Vec<f64>,
    pub max_thickness: f64,
    pub max_thickness_x: f64,
    pub max_camber: f64,
    pub max_camber_x: f64,
}

/// `count` cosine-spaced stations on `[0, chord]`, clustered at both ends.
pub fn cosine_stations(count: usize, chord: f64) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..count)
            .map(|i| {
                let beta = std::f64::consts::PI * i as f64 / (count - 1) as f64;
                0.5 * chord * (1.0 - beta.cos())
            })
            .collect(),
    }
}

/// Linear interpolation of `y(x)` along an x-ascending polyline; values outside
/// the covered range clamp to the end points.
pub fn interpolate(points: &[Point], x: f64) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    if x <= first.x {
        return first.y;
    }
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        if x <= b.x {
            let dx = b.x - a.x;
            if dx <= 0.0 {
                return b.y;
            }
            return a.y + (x - a.x) / dx * (b.y - a.y);
        }
    }
    points[points.len() - 1].y
}

/// Thickness (`upper - lower`) and camber (mean line) at cosine stations.
pub fn thickness_camber(
    upper: &[Point],
    lower: &[Point],
    stations: usize,
) -> Result<SectionProperties, AppError> {
    if upper.len() < 2 || lower.len() < 2 {
        return Err(AppError::invalid_input(
            "Thickness/camber needs at least 2 points per surface.",
        ));
    }
    if stations < 2 {
        return Err(AppError::invalid_input("Need at least 2 stations."));
    }

    let upper = normalize_surface(upper);
    let lower = normalize_surface(lower);
    for (label, s) in [("upper", &upper), ("lower", &lower)] {
        let xs: Vec<f64> = s.iter().map(|p| p.x).collect();
        if !is_monotonic(&xs, Monotonic::Increasing) {
            return Err(AppError::invalid_input(format!(
                "The {label} surface x coordinates must be monotonic."
            )));
        }
    }

    let chord = upper
        .iter()
        .chain(lower.iter())
        .fold(f64::NEG_INFINITY, |m, p| m.max(p.x));

    let x = cosine_stations(stations, chord);
    let mut thickness = Vec::with_capacity(stations);
    let mut camber = Vec::with_capacity(stations);
    for &xi in &x {
        let yu = interpolate(&upper, xi);
        let yl = interpolate(&lower, xi);
        thickness.push(yu - yl);
        camber.push(0.5 * (yu + yl));
    }

    let (t_idx, max_thickness) = arg_max(&thickness, |v| v);
    let (c_idx, _) = arg_max(&camber, f64::abs);

    Ok(SectionProperties {
        max_thickness,
        max_thickness_x: x[t_idx],
        max_camber: camber[c_idx],
        max_camber_x: x[c_idx],
        x,
        thickness,
        camber,
    })
}

fn arg_max(values: &[f64], key: impl Fn(f64) -> f64) -> (usize, f64) {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if key(v) > key(values[best]) {
            best = i;
        }
    }
    (best, values[best])
}
