//! Flow conditions, alpha schedules and the cache key derived from them.

use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::AppError;
use crate::geometry::FlapSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConditions {
    #[serde(rename = "Re")]
    pub re: f64,
    #[serde(rename = "Mach", default)]
    pub mach: f64,
    /// `[start, end, step]` in degrees.
    pub alpha_range: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_crit: Option<f64>,
    #[serde(default)]
    pub has_control_surface: bool,
    /// Flap chord, percent of airfoil chord.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_surface_percent: Option<f64>,
    /// Flap deflection, degrees, trailing edge down positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_surface_deflection: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaRange {
    pub start: f64,
    pub end: f64,
    pub step: f64,
}

impl AnalysisConditions {
    pub fn validate(&self, max_alpha_range: f64) -> Result<AlphaRange, AppError> {
        if !(self.re.is_finite() && self.re > 0.0) {
            return Err(AppError::invalid_input("Re must be a positive number."));
        }
        if !(self.mach.is_finite() && self.mach >= 0.0) {
            return Err(AppError::invalid_input("Mach must be a non-negative number."));
        }
        if let Some(n) = self.n_crit {
            if !(n.is_finite() && n > 0.0) {
                return Err(AppError::invalid_input("n_crit must be a positive number."));
            }
        }
        self.flap()?;
        validate_alpha_range(&self.alpha_range, max_alpha_range)
    }

    /// Flap requested by these conditions, if any.
    pub fn flap(&self) -> Result<Option<FlapSpec>, AppError> {
        if !self.has_control_surface {
            return Ok(None);
        }
        let percent = self.control_surface_percent.ok_or_else(|| {
            AppError::invalid_input("control_surface_percent is required when has_control_surface is set.")
        })?;
        if !(percent > 0.0 && percent < 100.0) {
            return Err(AppError::invalid_input(format!(
                "control_surface_percent must be in (0, 100); got {percent}."
            )));
        }
        let deflection = self.control_surface_deflection.unwrap_or(0.0);
        Ok(Some(FlapSpec::from_percent(percent, deflection)))
    }
}

/// Upper bound on the number of angles in one alpha schedule.
pub const MAX_ALPHA_POINTS: usize = 1000;

/// Check `[start, end, step]`: step > 0, start < end, span within `max_range`,
/// and at most [`MAX_ALPHA_POINTS`] angles.
pub fn validate_alpha_range(range: &[f64], max_range: f64) -> Result<AlphaRange, AppError> {
    let &[start, end, step] = range else {
        return Err(AppError::invalid_input(format!(
            "alpha_range must be [start, end, step]; got {} values.",
            range.len()
        )));
    };
    if !(start.is_finite() && end.is_finite() && step.is_finite()) {
        return Err(AppError::invalid_input("alpha_range values must be finite."));
    }
    if step <= 0.0 {
        return Err(AppError::invalid_input("alpha_range step must be positive."));
    }
    if start >= end {
        return Err(AppError::invalid_input("alpha_range start must be below end."));
    }
    if end - start > max_range {
        return Err(AppError::invalid_input(format!(
            "alpha_range spans {} degrees; the maximum is {max_range}.",
            end - start
        )));
    }
    let intervals = (end - start) / step;
    if !(intervals < MAX_ALPHA_POINTS as f64) {
        return Err(AppError::invalid_input(format!(
            "alpha_range step {step} yields more than {MAX_ALPHA_POINTS} angles."
        )));
    }
    Ok(AlphaRange { start, end, step })
}

/// `start + i * step` for `i = 0 ..= floor((end - start) / step)`, rounded to
/// two decimals.
pub fn alpha_schedule(range: AlphaRange) -> Vec<f64> {
    // The epsilon keeps `end` when the division lands just under an integer.
    let intervals = ((range.end - range.start) / range.step + 1e-9).floor();
    if !(intervals >= 0.0) {
        return Vec::new();
    }
    let count = (intervals.min((MAX_ALPHA_POINTS - 1) as f64) as usize) + 1;
    (0..count)
        .map(|i| ((range.start + i as f64 * range.step) * 100.0).round() / 100.0)
        .collect()
}

/// SHA-256 hex digest of `{"airfoil_id": .., "conditions": ..}` serialized with
/// sorted keys, unset optional fields omitted, and `", "` / `": "` separators.
pub fn condition_hash(conditions: &AnalysisConditions, airfoil_id: &str) -> Result<String, AppError> {
    let conditions = serde_json::to_value(conditions)
        .map_err(|e| AppError::internal(format!("Failed to encode conditions: {e}")))?;
    let mut doc = BTreeMap::new();
    doc.insert("airfoil_id", Value::String(airfoil_id.to_string()));
    doc.insert("conditions", conditions);

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    doc.serialize(&mut ser)
        .map_err(|e| AppError::internal(format!("Failed to encode conditions: {e}")))?;

    let digest = Sha256::digest(&buf);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Compact JSON with a space after `,` and `:`.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// Total absolute change of slope, `Σ |Δ(Δy/Δx)|`. Zero-width steps are skipped.
pub fn smoothness_measure(x: &[f64], y: &[f64]) -> f64 {
    let slopes: Vec<f64> = x
        .windows(2)
        .zip(y.windows(2))
        .filter(|(xs, _)| xs[1] != xs[0])
        .map(|(xs, ys)| (ys[1] - ys[0]) / (xs[1] - xs[0]))
        .collect();
    slopes.windows(2).map(|s| (s[1] - s[0]).abs()).sum()
}
