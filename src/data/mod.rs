//! Built-in airfoil data.

pub mod naca;
