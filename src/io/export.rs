//! Export fitted curves to CSV.
//!
//! One row per curve sample (`surface,x,y`), easy to load into a spreadsheet or
//! overlay in another plotting tool.

use std::path::Path;

use crate::domain::AirfoilFit;
use crate::error::AppError;

pub fn write_curve_csv(path: &Path, fit: &AirfoilFit) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create curve CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["surface", "x", "y"])
        .map_err(|e| AppError::io(format!("Failed to write curve CSV header: {e}")))?;

    for surface in [&fit.upper, &fit.lower] {
        for p in &surface.curve {
            writer
                .write_record([
                    surface.side.display_name().to_string(),
                    format!("{:.10}", p.x),
                    format!("{:.10}", p.y),
                ])
                .map_err(|e| AppError::io(format!("Failed to write curve CSV row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush curve CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitConfig, Point};
    use crate::fit::BezierFitter;

    #[test]
    fn writes_one_row_per_curve_sample() {
        let upper = [Point::new(0.0, 0.0), Point::new(0.5, 0.05), Point::new(1.0, 0.0)];
        let lower = [Point::new(0.0, 0.0), Point::new(0.5, -0.05), Point::new(1.0, 0.0)];
        let config = FitConfig {
            curve_points: 10,
            ..FitConfig::with_order(3)
        };
        let fit = BezierFitter::new(config).unwrap().fit(&upper, &lower).unwrap();

        let path = std::env::temp_dir().join(format!("foilfit-curve-{}.csv", std::process::id()));
        write_curve_csv(&path, &fit).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "surface,x,y");
        assert_eq!(lines.len(), 21);
        assert!(lines[1].starts_with("upper,"));
        assert!(lines[20].starts_with("lower,"));
    }
}
