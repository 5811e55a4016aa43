//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load coordinates -> fit (or sweep) -> residuals
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use crate::data::naca::Naca4;
use crate::domain::{AirfoilCoords, AirfoilFit, FitConfig, Point, SampleStats};
use crate::error::AppError;
use crate::fit::{sweep_orders, BezierFitter, OrderSweep};
use crate::io::coords::read_coords;
use crate::report::{compute_residuals, PointResidual};

/// Where the airfoil samples come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    File(PathBuf),
    Naca {
        designation: String,
        points: usize,
        noise: f64,
        seed: u64,
    },
}

impl InputSource {
    pub fn naca(designation: impl Into<String>, points: usize) -> Self {
        Self::Naca {
            designation: designation.into(),
            points,
            noise: 0.0,
            seed: 0,
        }
    }
}

/// Samples ready for fitting.
#[derive(Debug, Clone)]
pub struct Airfoil {
    pub name: String,
    pub coords: AirfoilCoords,
    pub upper: Vec<Point>,
    pub lower: Vec<Point>,
    /// Input rows skipped while parsing a `.dat` file.
    pub skipped_rows: usize,
}

impl Airfoil {
    pub fn from_coords(coords: AirfoilCoords) -> Result<Self, AppError> {
        let upper = coords.upper_points()?;
        let lower = coords.lower_points()?;
        Ok(Self {
            name: coords.display_name().to_string(),
            coords,
            upper,
            lower,
            skipped_rows: 0,
        })
    }

    pub fn stats(&self) -> Option<SampleStats> {
        SampleStats::from_surfaces(&self.upper, &self.lower)
    }
}

pub fn load_airfoil(source: &InputSource) -> Result<Airfoil, AppError> {
    match source {
        InputSource::File(path) => {
            let loaded = read_coords(path)?;
            let mut airfoil = Airfoil::from_coords(loaded.coords)?;
            airfoil.skipped_rows = loaded.row_errors.len();
            Ok(airfoil)
        }
        InputSource::Naca {
            designation,
            points,
            noise,
            seed,
        } => {
            let section = Naca4::parse(designation)?.noisy_surfaces(*points, *noise, *seed)?;
            Airfoil::from_coords(section.to_coords())
        }
    }
}

/// All computed outputs of a single fit.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub fit: AirfoilFit,
    pub residuals: Vec<PointResidual>,
}

pub fn run_fit(airfoil: &Airfoil, config: &FitConfig) -> Result<RunOutput, AppError> {
    let fit = BezierFitter::new(*config)?.fit(&airfoil.upper, &airfoil.lower)?;
    let residuals = compute_residuals(&fit, &airfoil.upper, &airfoil.lower);
    Ok(RunOutput { fit, residuals })
}

pub fn run_sweep(airfoil: &Airfoil, orders: &[usize], config: &FitConfig) -> Result<OrderSweep, AppError> {
    sweep_orders(&airfoil.upper, &airfoil.lower, orders, config)
}
