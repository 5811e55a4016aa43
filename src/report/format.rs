//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{AirfoilFit, Point, SampleStats, SurfaceFit};
use crate::fit::OrderSweep;
use crate::report::PointResidual;

/// Fit summary: samples, chord, per-surface error and control polygons.
pub fn format_fit_summary(name: &str, fit: &AirfoilFit, stats: Option<&SampleStats>) -> String {
    let mut out = String::new();

    out.push_str("=== foil - Bezier surface fit ===\n");
    out.push_str(&format!("Airfoil: {name}\n"));
    if let Some(s) = stats {
        out.push_str(&format!(
            "Samples: upper={} lower={} | x=[{:.4}, {:.4}] | y=[{:.4}, {:.4}]\n",
            s.n_upper, s.n_lower, s.x_min, s.x_max, s.y_min, s.y_max
        ));
    }
    out.push_str(&format!(
        "Order: {} ({} control points per surface) | chord={:.6}\n",
        fit.order,
        fit.order + 1,
        fit.chord
    ));

    out.push_str("\nFit quality:\n");
    for s in [&fit.upper, &fit.lower] {
        out.push_str(&format!(
            "  {:<6} SSE={:.3e} RMS distance={:.3e}\n",
            s.side.display_name(),
            s.sse,
            s.rms_distance()
        ));
    }
    out.push_str(&format!("  total  SSE={:.3e}\n", fit.total_sse()));

    for s in [&fit.upper, &fit.lower] {
        out.push_str(&format_control_points(s));
    }
    out
}

fn format_control_points(s: &SurfaceFit) -> String {
    let mut out = format!("\n{} control points:\n", capitalize(s.side.display_name()));
    for (i, p) in s.control_points.iter().enumerate() {
        out.push_str(&format!("  P{i:<2} {}\n", fmt_point(p)));
    }
    out
}

/// One row per swept order; the recommended order is starred.
pub fn format_sweep_table(sweep: &OrderSweep) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<2}{:>5} {:>7} {:>12} {:>12} {:>12} {:>12}\n",
        "", "order", "params", "upper SSE", "lower SSE", "total SSE", "BIC"
    ));
    out.push_str(&format!(
        "{:<2}{:->5} {:->7} {:->12} {:->12} {:->12} {:->12}\n",
        "", "", "", "", "", "", ""
    ));
    for f in &sweep.fits {
        let chosen = if f.order() == sweep.recommended { "*" } else { " " };
        out.push_str(&format!(
            "{chosen:<2}{:>5} {:>7} {:>12.3e} {:>12.3e} {:>12.3e} {:>12.3}\n",
            f.order(),
            f.n_params,
            f.fit.upper.sse,
            f.fit.lower.sse,
            f.fit.total_sse(),
            f.bic
        ));
    }
    out.push_str(&format!("\nRecommended order: {}\n", sweep.recommended));
    out
}

/// Table of the samples furthest from their fitted curve.
pub fn format_worst_points(rows: &[PointResidual]) -> String {
    let mut out = String::from("Largest sample distances:\n");
    out.push_str(&format!("{:<6} {:>5} {:>10} {:>10} {:>12}\n", "side", "idx", "x", "y", "distance"));
    for r in rows {
        out.push_str(&format!(
            "{:<6} {:>5} {:>10.5} {:>10.5} {:>12.3e}\n",
            r.side.display_name(),
            r.index,
            r.point.x,
            r.point.y,
            r.distance
        ));
    }
    out
}

fn fmt_point(p: &Point) -> String {
    format!("({:>10.6}, {:>10.6})", p.x, p.y)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::naca::Naca4;
    use crate::domain::FitConfig;
    use crate::fit::{sweep_orders, BezierFitter};

    #[test]
    fn summary_lists_both_polygons() {
        let section = Naca4::parse("0012").unwrap().surfaces(20);
        let fit = BezierFitter::new(FitConfig::with_order(3))
            .unwrap()
            .fit(&section.upper, &section.lower)
            .unwrap();
        let stats = SampleStats::from_surfaces(&section.upper, &section.lower);
        let text = format_fit_summary(&section.name, &fit, stats.as_ref());
        assert!(text.contains("Airfoil: NACA 0012"));
        assert!(text.contains("Upper control points:"));
        assert!(text.contains("Lower control points:"));
        assert!(text.contains("P3"));
    }

    #[test]
    fn sweep_table_marks_recommendation() {
        let section = Naca4::parse("2412").unwrap().surfaces(20);
        let sweep = sweep_orders(&section.upper, &section.lower, &[3, 4], &FitConfig::default()).unwrap();
        let text = format_sweep_table(&sweep);
        assert_eq!(text.lines().filter(|l| l.starts_with('*')).count(), 1);
        assert!(text.contains(&format!("Recommended order: {}", sweep.recommended)));
    }
}
