//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads or generates airfoil samples
//! - runs fits and order sweeps
//! - prints reports/plots
//! - writes optional exports
//! - dispatches API requests for scripting

use std::fs;
use std::path::Path;

use clap::Parser;
use log::info;

use crate::analysis::cache::JsonFileCache;
use crate::analysis::conditions::{condition_hash, AnalysisConditions};
use crate::analysis::service::AnalysisService;
use crate::analysis::solver::solver_from_settings;
use crate::app::pipeline::{load_airfoil, Airfoil, InputSource};
use crate::cli::{CallArgs, Command, FitArgs, HashArgs, InputArgs, NacaArgs, PlotArgs, SweepArgs};
use crate::config::Settings;
use crate::data::naca::Naca4;
use crate::error::{AppError, ErrorKind};
use crate::geometry::assemble_contour;

pub mod pipeline;

/// Entry point for the `foil` binary.
pub fn run() -> Result<(), AppError> {
    // We want `foil` and `foil -f x.dat` to behave like `foil tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Plot(args) => handle_plot(args),
        Command::Naca(args) => handle_naca(args),
        Command::Hash(args) => handle_hash(args),
        Command::Call(args) => handle_call(args),
        Command::Tui(args) => {
            let settings = Settings::from_env()?;
            crate::tui::run(args.file, settings.fit_config(args.order))
        }
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let config = settings.fit_config(args.order);
    let airfoil = load_input(&args.input)?;
    let run = pipeline::run_fit(&airfoil, &config)?;

    println!(
        "{}",
        crate::report::format_fit_summary(&airfoil.name, &run.fit, airfoil.stats().as_ref())
    );
    if airfoil.skipped_rows > 0 {
        println!("Skipped {} unparseable input row(s).\n", airfoil.skipped_rows);
    }
    if args.top > 0 {
        let worst = crate::report::worst_points(&run.residuals, args.top);
        println!("{}", crate::report::format_worst_points(&worst));
    }

    if args.plot && !args.no_plot {
        let plot = crate::plot::render_fit_plot(&run.fit, Some(&airfoil.coords), args.width, args.height);
        println!("{plot}");
    }

    if let Some(path) = &args.export_json {
        crate::io::fit_json::write_fit_json(path, &run.fit, Some(&airfoil.coords))?;
        info!("wrote fit JSON to {}", path.display());
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_curve_csv(path, &run.fit)?;
        info!("wrote curve CSV to {}", path.display());
    }
    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let config = settings.fit_config(None);
    let airfoil = load_input(&args.input)?;
    let sweep = pipeline::run_sweep(&airfoil, &args.orders, &config)?;

    println!("Airfoil: {}\n", airfoil.name);
    println!("{}", crate::report::format_sweep_table(&sweep));

    if let Some(dir) = &args.debug {
        let path = crate::debug::write_debug_bundle(
            dir,
            &airfoil.name,
            &airfoil.upper,
            &airfoil.lower,
            &args.orders,
            &config,
        )?;
        println!("Wrote debug bundle: {}", path.display());
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::fit_json::read_fit_json(&args.fit)?;
    let plot = crate::plot::render_fit_file_plot(&file, args.width, args.height)?;
    println!("{plot}");
    Ok(())
}

fn handle_naca(args: NacaArgs) -> Result<(), AppError> {
    let section = Naca4::parse(&args.designation)?.noisy_surfaces(args.points, args.noise, args.seed)?;
    match &args.output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&section.to_coords())
                .map_err(|e| AppError::internal(format!("Failed to encode coordinates: {e}")))?;
            fs::write(path, json)
                .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;
            println!("Wrote {} ({} points per surface) to {}", section.name, args.points, path.display());
        }
        None => {
            println!("{}", section.name);
            for p in assemble_contour(&section.upper, &section.lower) {
                println!("{:>10.6} {:>10.6}", p.x, p.y);
            }
        }
    }
    Ok(())
}

fn handle_hash(args: HashArgs) -> Result<(), AppError> {
    let text = read_text_arg(&args.conditions)?;
    let conditions: AnalysisConditions = serde_json::from_str(&text)
        .map_err(|e| AppError::invalid_input(format!("Invalid conditions JSON: {e}")))?;
    println!("{}", condition_hash(&conditions, &args.airfoil_id)?);
    Ok(())
}

fn handle_call(args: CallArgs) -> Result<(), AppError> {
    let settings = Settings::from_env()?;
    let solver = solver_from_settings(&settings);
    let cache = JsonFileCache::open(&settings.cache_path)?;
    let mut service = AnalysisService::new(settings, solver, Box::new(cache));

    let body = match &args.body {
        Some(arg) => read_text_arg(arg)?,
        None => String::new(),
    };
    let response = crate::api::route(&mut service, &args.method, &args.path, &body);

    if response.status >= 400 {
        let detail = response
            .body
            .get("detail")
            .and_then(|d| d.as_str())
            .unwrap_or("request failed");
        return Err(AppError::new(kind_for_status(response.status), format!("{} {detail}", response.status)));
    }

    let text = serde_json::to_string_pretty(&response.body)
        .map_err(|e| AppError::internal(format!("Failed to encode response: {e}")))?;
    println!("{text}");
    Ok(())
}

fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::InvalidInput,
        404 => ErrorKind::NotFound,
        502 => ErrorKind::Solver,
        _ => ErrorKind::Internal,
    }
}

/// Resolve the airfoil source: explicit file, generated NACA section, or the picker.
fn load_input(args: &InputArgs) -> Result<Airfoil, AppError> {
    let source = match (&args.file, &args.naca) {
        (Some(path), _) => InputSource::File(crate::cli::picker::validate_coords_path(path)?),
        (None, Some(designation)) => InputSource::Naca {
            designation: designation.clone(),
            points: args.points,
            noise: args.noise,
            seed: args.seed,
        },
        (None, None) => InputSource::File(crate::cli::picker::prompt_for_coords_path()?),
    };
    load_airfoil(&source)
}

/// Inline JSON (starts with `{` or `[`) or a path to a file holding it.
fn read_text_arg(arg: &str) -> Result<String, AppError> {
    let trimmed = arg.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(arg.to_string());
    }
    fs::read_to_string(Path::new(arg)).map_err(|e| AppError::io(format!("Failed to read '{arg}': {e}")))
}

/// Rewrite argv so `foil` defaults to `foil tui`.
///
/// Rules:
/// - `foil`                       -> `foil tui`
/// - `foil -f x.dat ...`          -> `foil tui -f x.dat ...`
/// - `foil --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
    }
    argv
}
