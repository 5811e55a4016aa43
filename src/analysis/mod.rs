//! Aerodynamic analysis plumbing around the external solver.
//!
//! - `conditions`: flow conditions, alpha schedules, cache keys
//! - `solver`: the solver boundary and its HTTP client
//! - `cache`: condition-hash keyed result stores
//! - `service`: request-level operations tying the pieces together

pub mod cache;
pub mod conditions;
pub mod service;
pub mod solver;

pub use cache::*;
pub use conditions::*;
pub use service::*;
pub use solver::*;
