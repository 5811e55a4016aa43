//! Input/output helpers.
//!
//! - coordinate ingest from `.dat` / `.json` (`coords`)
//! - fit JSON read/write (`fit_json`)
//! - curve CSV export (`export`)

pub mod coords;
pub mod export;
pub mod fit_json;

pub use coords::*;
pub use export::*;
pub use fit_json::*;
