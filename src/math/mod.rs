//! Numerical building blocks: Bernstein basis, nearest-neighbour search,
//! segment distances and the quasi-Newton optimizer.

pub mod bernstein;
pub mod bfgs;
pub mod kdtree;
pub mod segment;

pub use bernstein::*;
pub use bfgs::*;
pub use kdtree::*;
pub use segment::*;
