//! Bezier surface fitting.
//!
//! Responsibilities:
//!
//! - map the free parameter vector to a constrained control polygon
//! - evaluate the point-to-curve SSE objective
//! - drive the optimizer per surface (parallel across surfaces)
//! - sweep orders and recommend one using BIC

pub mod bezier;
pub mod objective;
pub mod params;
pub mod sweep;

pub use bezier::*;
pub use params::*;
pub use sweep::*;
