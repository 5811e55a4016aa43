//! Airfoil coordinate ingest.
//!
//! Supported inputs:
//!
//! - `.json`: an `AirfoilCoords` object (`upper_x`, `upper_y`, `lower_x`, `lower_y`)
//! - `.dat` in Selig order: optional name line, then `x y` rows running
//!   TE → upper → LE → lower → TE
//! - `.dat` in Lednicer order: name line, a `n_upper n_lower` count row, then the
//!   upper and lower surfaces, each LE → TE
//!
//! Unparseable `.dat` rows are skipped and reported with their line numbers.

use std::fs;
use std::path::Path;

use log::warn;

use crate::domain::{AirfoilCoords, Point};
use crate::error::AppError;
use crate::geometry::split_contour;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordFormat {
    Json,
    Selig,
    Lednicer,
}

/// A row that could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LoadedCoords {
    pub coords: AirfoilCoords,
    pub format: CoordFormat,
    pub row_errors: Vec<RowError>,
}

pub fn read_coords(path: &Path) -> Result<LoadedCoords, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read '{}': {e}", path.display())))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let mut loaded = if is_json {
        let coords: AirfoilCoords = serde_json::from_str(&text).map_err(|e| {
            AppError::invalid_input(format!("Invalid coordinate JSON '{}': {e}", path.display()))
        })?;
        LoadedCoords {
            coords,
            format: CoordFormat::Json,
            row_errors: Vec::new(),
        }
    } else {
        parse_dat(&text)?
    };

    if loaded.coords.name.is_none() {
        loaded.coords.name = path.file_stem().and_then(|s| s.to_str()).map(str::to_string);
    }
    for err in &loaded.row_errors {
        warn!("{}:{}: skipped row: {}", path.display(), err.line, err.message);
    }
    Ok(loaded)
}

/// Parse `.dat` text (Selig or Lednicer, detected from the first numeric row).
pub fn parse_dat(text: &str) -> Result<LoadedCoords, AppError> {
    let mut name = None;
    let mut rows: Vec<(usize, Point)> = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_row(trimmed) {
            Ok(p) => rows.push((line, p)),
            Err(message) => {
                if rows.is_empty() && name.is_none() {
                    name = Some(trimmed.to_string());
                } else {
                    row_errors.push(RowError { line, message });
                }
            }
        }
    }

    let lednicer_counts = rows.first().and_then(|&(_, p)| {
        let is_count = |v: f64| v >= 2.0 && v.fract() == 0.0;
        (is_count(p.x) && is_count(p.y)).then(|| (p.x as usize, p.y as usize))
    });

    let (coords, format) = match lednicer_counts {
        Some((n_upper, n_lower)) => {
            let points: Vec<Point> = rows[1..].iter().map(|&(_, p)| p).collect();
            if points.len() != n_upper + n_lower {
                return Err(AppError::invalid_input(format!(
                    "Lednicer header announces {n_upper} + {n_lower} points but {} rows were read.",
                    points.len()
                )));
            }
            let (upper, lower) = points.split_at(n_upper);
            (AirfoilCoords::from_surfaces(name, upper, lower), CoordFormat::Lednicer)
        }
        None => {
            let points: Vec<Point> = rows.iter().map(|&(_, p)| p).collect();
            let (upper, lower) = split_contour(&points)?;
            (AirfoilCoords::from_surfaces(name, &upper, &lower), CoordFormat::Selig)
        }
    };

    Ok(LoadedCoords {
        coords,
        format,
        row_errors,
    })
}

fn parse_row(line: &str) -> Result<Point, String> {
    let mut fields = line.split(|c: char| c.is_whitespace() || c == ',').filter(|f| !f.is_empty());
    let (Some(xs), Some(ys)) = (fields.next(), fields.next()) else {
        return Err(format!("expected two numbers, got '{line}'"));
    };
    let x: f64 = xs.parse().map_err(|_| format!("invalid x value '{xs}'"))?;
    let y: f64 = ys.parse().map_err(|_| format!("invalid y value '{ys}'"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("non-finite coordinate in '{line}'"));
    }
    if fields.next().is_some() {
        return Err(format!("expected two numbers, got '{line}'"));
    }
    Ok(Point::new(x, y))
}
