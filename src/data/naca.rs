//! Synthetic NACA 4-digit sections.
//!
//! Used for demos, the TUI (when no input file is given) and tests. Points are
//! cosine spaced so the leading edge is well resolved, and the trailing edge is
//! closed (`-0.1036` thickness coefficient). Optional Gaussian noise is seeded
//! from the designation and the caller's seed, so a given request always
//! produces the same cloud.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{AirfoilCoords, Point};
use crate::error::AppError;

/// Sections cycled through by the TUI demo mode.
pub const DEMO_SECTIONS: [&str; 4] = ["0012", "2412", "4415", "6409"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Naca4 {
    /// Maximum camber, fraction of chord.
    pub camber: f64,
    /// Location of maximum camber, fraction of chord.
    pub camber_pos: f64,
    /// Maximum thickness, fraction of chord.
    pub thickness: f64,
    digits: [u8; 4],
}

/// Both surfaces of a generated section, LE → TE, unit chord.
#[derive(Debug, Clone, PartialEq)]
pub struct NacaSection {
    pub name: String,
    pub upper: Vec<Point>,
    pub lower: Vec<Point>,
}

impl NacaSection {
    pub fn to_coords(&self) -> AirfoilCoords {
        AirfoilCoords::from_surfaces(Some(self.name.clone()), &self.upper, &self.lower)
    }
}

impl Naca4 {
    /// Parse a designation such as `"2412"` or `"NACA 0012"`.
    pub fn parse(designation: &str) -> Result<Self, AppError> {
        let trimmed = designation.trim();
        let code = trimmed
            .strip_prefix("NACA")
            .or_else(|| trimmed.strip_prefix("naca"))
            .unwrap_or(trimmed)
            .trim();

        let bytes = code.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(AppError::invalid_input(format!(
                "Expected a 4-digit NACA designation like 2412; got '{designation}'."
            )));
        }
        let digits = [bytes[0] - b'0', bytes[1] - b'0', bytes[2] - b'0', bytes[3] - b'0'];
        let thickness = f64::from(digits[2] * 10 + digits[3]) / 100.0;
        if thickness <= 0.0 {
            return Err(AppError::invalid_input("NACA thickness digits must be non-zero."));
        }
        let camber = f64::from(digits[0]) / 100.0;
        let camber_pos = f64::from(digits[1]) / 10.0;
        if camber > 0.0 && camber_pos == 0.0 {
            return Err(AppError::invalid_input(
                "A cambered NACA section needs a non-zero camber position digit.",
            ));
        }

        Ok(Self {
            camber,
            camber_pos,
            thickness,
            digits,
        })
    }

    pub fn designation(&self) -> String {
        self.digits.iter().map(|d| char::from(b'0' + d)).collect()
    }

    pub fn name(&self) -> String {
        format!("NACA {}", self.designation())
    }

    fn half_thickness(&self, x: f64) -> f64 {
        5.0 * self.thickness
            * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x.powi(2) + 0.2843 * x.powi(3)
                - 0.1036 * x.powi(4))
    }

    /// Mean-line height and slope.
    fn camber_line(&self, x: f64) -> (f64, f64) {
        let (m, p) = (self.camber, self.camber_pos);
        if m == 0.0 {
            return (0.0, 0.0);
        }
        if x < p {
            let k = m / (p * p);
            (k * (2.0 * p * x - x * x), 2.0 * k * (p - x))
        } else {
            let k = m / ((1.0 - p) * (1.0 - p));
            (k * ((1.0 - 2.0 * p) + 2.0 * p * x - x * x), 2.0 * k * (p - x))
        }
    }

    /// Sample both surfaces at `points_per_surface` cosine-spaced stations.
    pub fn surfaces(&self, points_per_surface: usize) -> NacaSection {
        let n = points_per_surface.max(2);
        let mut upper = Vec::with_capacity(n);
        let mut lower = Vec::with_capacity(n);
        for i in 0..n {
            let beta = std::f64::consts::PI * i as f64 / (n - 1) as f64;
            let x = 0.5 * (1.0 - beta.cos());
            let yt = self.half_thickness(x);
            let (yc, slope) = self.camber_line(x);
            let (sin, cos) = slope.atan().sin_cos();
            upper.push(Point::new(x - yt * sin, yc + yt * cos));
            lower.push(Point::new(x + yt * sin, yc - yt * cos));
        }
        // Pin the shared end points so both surfaces meet exactly.
        for s in [&mut upper, &mut lower] {
            s[0] = Point::new(0.0, 0.0);
            s[n - 1] = Point::new(1.0, 0.0);
        }
        NacaSection {
            name: self.name(),
            upper,
            lower,
        }
    }

    /// Like [`surfaces`](Self::surfaces), with Gaussian noise of standard
    /// deviation `sigma` added to the interior y values.
    pub fn noisy_surfaces(
        &self,
        points_per_surface: usize,
        sigma: f64,
        seed: u64,
    ) -> Result<NacaSection, AppError> {
        let mut section = self.surfaces(points_per_surface);
        if sigma == 0.0 {
            return Ok(section);
        }
        let normal = Normal::new(0.0, sigma)
            .map_err(|e| AppError::invalid_input(format!("Noise distribution error: {e}")))?;
        let mut rng = StdRng::seed_from_u64(noise_seed(&self.designation(), seed));

        for s in [&mut section.upper, &mut section.lower] {
            let n = s.len();
            for p in s.iter_mut().take(n - 1).skip(1) {
                p.y += normal.sample(&mut rng);
            }
        }
        Ok(section)
    }
}

fn noise_seed(designation: &str, seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    designation.hash(&mut hasher);
    seed.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_designations() {
        let foil = Naca4::parse("NACA 2412").unwrap();
        assert!((foil.camber - 0.02).abs() < 1e-15);
        assert!((foil.camber_pos - 0.4).abs() < 1e-15);
        assert!((foil.thickness - 0.12).abs() < 1e-15);
        assert_eq!(foil.designation(), "2412");
        assert!(Naca4::parse("241").is_err());
        assert!(Naca4::parse("24a2").is_err());
        assert!(Naca4::parse("2012").is_err());
    }

    #[test]
    fn symmetric_section_thickness() {
        let s = Naca4::parse("0012").unwrap().surfaces(81);
        let max_t = s
            .upper
            .iter()
            .zip(s.lower.iter())
            .map(|(u, l)| u.y - l.y)
            .fold(0.0_f64, f64::max);
        assert!((max_t - 0.12).abs() < 2e-3, "max thickness {max_t}");
        assert_eq!(s.upper[0], Point::new(0.0, 0.0));
        assert_eq!(s.lower[80], Point::new(1.0, 0.0));
    }

    #[test]
    fn noise_is_reproducible() {
        let foil = Naca4::parse("4415").unwrap();
        let a = foil.noisy_surfaces(30, 1e-3, 7).unwrap();
        let b = foil.noisy_surfaces(30, 1e-3, 7).unwrap();
        let c = foil.noisy_surfaces(30, 1e-3, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.upper[0], Point::new(0.0, 0.0));
    }
}
