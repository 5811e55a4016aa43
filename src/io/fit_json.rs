//! Read/write fit JSON files.
//!
//! A fit file is the portable form of a fit: order, chord, both control
//! polygons, the sampled curves and SSEs, plus (optionally) the samples that
//! were fitted so `foil plot` can overlay them. The schema is `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{AirfoilCoords, AirfoilFit, FitFile};
use crate::error::AppError;

pub fn write_fit_json(path: &Path, fit: &AirfoilFit, samples: Option<&AirfoilCoords>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create fit JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &FitFile::from_fit(fit, samples))
        .map_err(|e| AppError::io(format!("Failed to write fit JSON: {e}")))?;
    Ok(())
}

pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid fit JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::naca::Naca4;
    use crate::domain::FitConfig;
    use crate::fit::BezierFitter;

    #[test]
    fn fit_file_survives_a_save_and_load() {
        let section = Naca4::parse("2412").unwrap().surfaces(25);
        let coords = section.to_coords();
        let fit = BezierFitter::new(FitConfig::with_order(4)).unwrap().fit_coords(&coords).unwrap();

        let path = std::env::temp_dir().join(format!("foilfit-fit-{}.json", std::process::id()));
        write_fit_json(&path, &fit, Some(&coords)).unwrap();
        let file = read_fit_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(file.tool, "foil");
        assert_eq!(file.name.as_deref(), Some("NACA 2412"));
        let restored = file.to_fit().unwrap();
        assert_eq!(restored.order, 4);
        for (a, b) in restored.upper.control_points.iter().zip(fit.upper.control_points.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
        assert_eq!(restored.lower.n_samples, 25);
    }
}
