//! Debug bundle writer for inspecting samples and per-order fits.

use std::fmt::Write as _;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::{FitConfig, Point, SampleStats};
use crate::error::AppError;
use crate::fit::{sweep_orders, OrderSweep};

/// Fit every order in `orders` and write a markdown bundle under `dir`.
pub fn write_debug_bundle(
    dir: &Path,
    name: &str,
    upper: &[Point],
    lower: &[Point],
    orders: &[usize],
    config: &FitConfig,
) -> Result<PathBuf, AppError> {
    let sweep = sweep_orders(upper, lower, orders, config)?;
    let text = render_debug_markdown(name, upper, lower, &sweep, config);

    create_dir_all(dir).map_err(|e| AppError::io(format!("Failed to create debug dir: {e}")))?;
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("foil_debug_{}_{ts}.md", slug(name)));

    let mut file = File::create(&path)
        .map_err(|e| AppError::io(format!("Failed to create debug file: {e}")))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::io(format!("Failed to write debug file: {e}")))?;
    Ok(path)
}

/// Markdown body of the bundle.
pub fn render_debug_markdown(
    name: &str,
    upper: &[Point],
    lower: &[Point],
    sweep: &OrderSweep,
    config: &FitConfig,
) -> String {
    // Writing into a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(out, "# foil debug bundle");
    let _ = writeln!(out, "- generated: {}", Local::now().to_rfc3339());
    let _ = writeln!(out, "- airfoil: {name}");
    if let Some(s) = SampleStats::from_surfaces(upper, lower) {
        let _ = writeln!(
            out,
            "- samples: upper={} lower={} x=[{:.5}, {:.5}] y=[{:.5}, {:.5}]",
            s.n_upper, s.n_lower, s.x_min, s.x_max, s.y_min, s.y_max
        );
    }
    let _ = writeln!(
        out,
        "- optimizer: max_iterations={} tolerance={:e} curve_points={}",
        config.max_iterations, config.tolerance, config.curve_points
    );
    let _ = writeln!(out, "- recommended order: {}", sweep.recommended);

    let _ = writeln!(out, "\n## Orders");
    let _ = writeln!(out, "| order | params | upper_sse | lower_sse | bic |");
    let _ = writeln!(out, "| - | - | - | - | - |");
    for f in &sweep.fits {
        let _ = writeln!(
            out,
            "| {} | {} | {:.6e} | {:.6e} | {:.3} |",
            f.order(),
            f.n_params,
            f.fit.upper.sse,
            f.fit.lower.sse,
            f.bic
        );
    }

    for f in &sweep.fits {
        let _ = writeln!(out, "\n## Order {}", f.order());
        for s in [&f.fit.upper, &f.fit.lower] {
            let _ = writeln!(out, "- {} polygon: {}", s.side.display_name(), fmt_points(&s.control_points));
        }
    }
    out
}

fn fmt_points(points: &[Point]) -> String {
    let parts: Vec<String> = points.iter().map(|p| format!("({:.6}, {:.6})", p.x, p.y)).collect();
    format!("[{}]", parts.join(", "))
}

fn slug(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if s.is_empty() { "airfoil".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::naca::Naca4;

    #[test]
    fn bundle_lists_every_order() {
        let section = Naca4::parse("4415").unwrap().surfaces(20);
        let dir = std::env::temp_dir().join(format!("foilfit-debug-{}", std::process::id()));
        let path = write_debug_bundle(
            &dir,
            &section.name,
            &section.upper,
            &section.lower,
            &[2, 3],
            &FitConfig::default(),
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("foil_debug_naca_4415_"));
        assert!(text.contains("## Order 2"));
        assert!(text.contains("## Order 3"));
        assert!(text.contains("upper polygon"));
    }
}
