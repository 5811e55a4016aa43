//! Command-line parsing for the airfoil Bezier fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/geometry code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod picker;

/// Orders tried by `foil sweep` when none are given.
pub const DEFAULT_SWEEP_ORDERS: [usize; 9] = [2, 3, 4, 5, 6, 7, 8, 9, 10];

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "foil", version, about = "Airfoil Bezier surface fitter and analysis client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit both surfaces at one order, print diagnostics, and optionally plot/export.
    Fit(FitArgs),
    /// Fit a range of orders and recommend one by BIC.
    Sweep(SweepArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
    /// Print (or save) a NACA 4-digit section.
    Naca(NacaArgs),
    /// Print the cache key for a set of analysis conditions.
    Hash(HashArgs),
    /// Dispatch one request through the API route table and print the JSON reply.
    Call(CallArgs),
    /// Launch the interactive TUI.
    ///
    /// Without an input file the TUI cycles through built-in NACA sections.
    Tui(TuiArgs),
}

/// Where to take airfoil samples from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Coordinate file (`.dat` Selig/Lednicer or `.json`).
    #[arg(short = 'f', long, value_name = "FILE", conflicts_with = "naca")]
    pub file: Option<PathBuf>,

    /// Generate a NACA 4-digit section instead of reading a file (e.g. 2412).
    #[arg(long, value_name = "DIGITS")]
    pub naca: Option<String>,

    /// Points per surface for generated sections.
    #[arg(long, default_value_t = 80)]
    pub points: usize,

    /// Gaussian noise (fraction of chord) added to generated sections.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Seed for the generated noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Bezier order (defaults to FOIL_DEFAULT_ORDER, 6).
    #[arg(short = 'o', long)]
    pub order: Option<usize>,

    /// Show the N samples furthest from the fitted curves.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the fit (control points, curves, SSE, samples) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the fitted curves to CSV (`surface,x,y`).
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Comma-separated Bezier orders to fit.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SWEEP_ORDERS)]
    pub orders: Vec<usize>,

    /// Also write a markdown debug bundle into this directory.
    #[arg(long, value_name = "DIR")]
    pub debug: Option<PathBuf>,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Fit JSON file produced by `foil fit --export-json`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args)]
pub struct NacaArgs {
    /// Designation, e.g. 2412.
    pub designation: String,

    /// Points per surface.
    #[arg(long, default_value_t = 80)]
    pub points: usize,

    /// Gaussian noise (fraction of chord).
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write coordinates as JSON here instead of printing a Selig `.dat`.
    #[arg(short = 'o', long, value_name = "JSON")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct HashArgs {
    /// Airfoil identifier the conditions apply to.
    #[arg(long = "airfoil-id")]
    pub airfoil_id: String,

    /// Conditions as inline JSON or a path to a JSON file.
    pub conditions: String,
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// HTTP method (GET or POST).
    pub method: String,

    /// Route path, e.g. /api/fit.
    pub path: String,

    /// Request body as inline JSON or a path to a JSON file.
    #[arg(long)]
    pub body: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    /// Coordinate file to view (otherwise NACA demo sections).
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Initial Bezier order.
    #[arg(short = 'o', long)]
    pub order: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_orders_parse_comma_list() {
        let cli = Cli::parse_from(["foil", "sweep", "--naca", "2412", "--orders", "3,5,7"]);
        match cli.command {
            Command::Sweep(args) => {
                assert_eq!(args.orders, vec![3, 5, 7]);
                assert_eq!(args.input.naca.as_deref(), Some("2412"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn file_and_naca_conflict() {
        let parsed = Cli::try_parse_from(["foil", "fit", "-f", "a.dat", "--naca", "0012"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
