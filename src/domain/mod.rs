//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw airfoil geometry (`AirfoilCoords`, `Coords`, `Point`)
//! - fitter configuration (`FitConfig`)
//! - fit outputs (`SurfaceFit`, `AirfoilFit`) and their file form (`FitFile`)

pub mod types;

pub use types::*;
