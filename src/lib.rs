//! `foilfit` library crate.
//!
//! The binary (`foil`) is a thin wrapper around this library so that:
//!
//! - the fitter is testable without spawning processes
//! - the analysis service and route table can sit behind any transport
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
