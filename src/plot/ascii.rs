//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - input samples: `o`
//! - fitted curves: `-` line
//! - control points: `+`

use crate::domain::{AirfoilCoords, AirfoilFit, FitFile, Point};
use crate::error::AppError;

/// Render both fitted surfaces, their control polygons and (optionally) the samples.
pub fn render_fit_plot(fit: &AirfoilFit, samples: Option<&AirfoilCoords>, width: usize, height: usize) -> String {
    let curves = [fit.upper.curve.as_slice(), fit.lower.curve.as_slice()];
    let control: Vec<Point> = fit
        .upper
        .control_points
        .iter()
        .chain(fit.lower.control_points.iter())
        .copied()
        .collect();
    let data = samples.map(sample_points).unwrap_or_default();
    render_plot(&data, &curves, &control, width, height)
}

/// Render a plot from a saved fit JSON file, overlaying stored samples if any.
pub fn render_fit_file_plot(file: &FitFile, width: usize, height: usize) -> Result<String, AppError> {
    let fit = file.to_fit()?;
    Ok(render_fit_plot(&fit, file.samples.as_ref(), width, height))
}

fn sample_points(coords: &AirfoilCoords) -> Vec<Point> {
    let upper = coords.upper_x.iter().zip(coords.upper_y.iter());
    let lower = coords.lower_x.iter().zip(coords.lower_y.iter());
    upper
        .chain(lower)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| Point::new(x, y))
        .collect()
}

fn render_plot(data: &[Point], curves: &[&[Point]], control: &[Point], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = data
        .iter()
        .chain(curves.iter().flat_map(|c| c.iter()))
        .chain(control.iter());
    let Some(bounds) = Bounds::of(all) else {
        return "Plot: no finite points\n".to_string();
    };
    let (y_min, y_max) = pad_range(bounds.y_min, bounds.y_max, 0.05);
    let bounds = Bounds { y_min, y_max, ..bounds };

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so markers overlay them.
    for curve in curves {
        draw_curve(&mut grid, curve, &bounds);
    }
    for p in control {
        let (c, r) = bounds.cell(p, width, height);
        grid[r][c] = '+';
    }
    for p in data {
        let (c, r) = bounds.cell(p, width, height);
        grid[r][c] = 'o';
    }

    let mut out = format!(
        "Plot: x=[{:.3}, {:.3}] | y=[{:.4}, {:.4}]\n",
        bounds.x_min, bounds.x_max, bounds.y_min, bounds.y_max
    );
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn of<'a>(points: impl Iterator<Item = &'a Point>) -> Option<Self> {
        let mut b = Bounds {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for p in points.filter(|p| p.x.is_finite() && p.y.is_finite()) {
            b.x_min = b.x_min.min(p.x);
            b.x_max = b.x_max.max(p.x);
            b.y_min = b.y_min.min(p.y);
            b.y_max = b.y_max.max(p.y);
        }
        if !b.x_min.is_finite() {
            return None;
        }
        if b.x_max <= b.x_min {
            b.x_max = b.x_min + 1.0;
        }
        Some(b)
    }

    fn cell(&self, p: &Point, width: usize, height: usize) -> (usize, usize) {
        (
            map_x(p.x, self.x_min, self.x_max, width),
            map_y(p.y, self.y_min, self.y_max, height),
        )
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[Point], bounds: &Bounds) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev: Option<(usize, usize)> = None;
    for p in curve.iter().filter(|p| p.x.is_finite() && p.y.is_finite()) {
        let (x, y) = bounds.cell(p, width, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, '-'),
            None => grid[y][x] = '-',
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish). Never overwrites a non-blank cell.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        let cell = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize));
        if let Some(c) = cell {
            if *c == ' ' {
                *c = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SurfaceFit, SurfaceSide};

    fn wedge() -> AirfoilFit {
        let surface = |side: SurfaceSide| {
            let h = 0.1 * side.sign();
            SurfaceFit {
                side,
                control_points: vec![Point::new(0.0, 0.0), Point::new(0.0, h), Point::new(1.0, 0.0)],
                curve: vec![Point::new(0.0, 0.0), Point::new(0.5, h / 2.0), Point::new(1.0, 0.0)],
                sse: 0.0,
                n_samples: 0,
            }
        };
        AirfoilFit {
            order: 2,
            chord: 1.0,
            upper: surface(SurfaceSide::Upper),
            lower: surface(SurfaceSide::Lower),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_fit_plot(&wedge(), None, 10, 5);
        let expected = concat!(
            "Plot: x=[0.000, 1.000] | y=[-0.1100, 0.1100]\n",
            "+         \n",
            "   ----   \n",
            "+--    --+\n",
            "   ----   \n",
            "+         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn samples_overlay_curves() {
        let samples = AirfoilCoords::from_surfaces(
            None,
            &[Point::new(0.5, 0.05)],
            &[Point::new(0.5, -0.05)],
        );
        let txt = render_fit_plot(&wedge(), Some(&samples), 20, 9);
        assert_eq!(txt.lines().count(), 10);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('o').count(), 2);
    }
}
