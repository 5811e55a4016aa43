//! Coordinate transforms on airfoil surfaces.
//!
//! Nothing here iterates or optimizes: orientation fixes, contour assembly for
//! the solver, thickness/camber extraction and flap deflection.

pub mod flap;
pub mod ops;
pub mod section;

pub use flap::*;
pub use ops::*;
pub use section::*;
