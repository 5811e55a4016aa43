//! Orientation and contour bookkeeping for surface point lists.

use crate::domain::Point;
use crate::error::AppError;

/// Leading-edge points closer than this are treated as the same point.
pub const LE_MERGE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monotonic {
    Increasing,
    StrictlyIncreasing,
    Decreasing,
    StrictlyDecreasing,
}

pub fn is_monotonic(xs: &[f64], kind: Monotonic) -> bool {
    xs.windows(2).all(|w| match kind {
        Monotonic::Increasing => w[1] >= w[0],
        Monotonic::StrictlyIncreasing => w[1] > w[0],
        Monotonic::Decreasing => w[1] <= w[0],
        Monotonic::StrictlyDecreasing => w[1] < w[0],
    })
}

/// Orient a surface leading edge → trailing edge (reverse when the first x
/// exceeds the last). Only the array order changes.
pub fn normalize_surface(points: &[Point]) -> Vec<Point> {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if first.x > last.x => points.iter().rev().copied().collect(),
        _ => points.to_vec(),
    }
}

/// Closed contour in solver order: upper surface TE → LE, then lower LE → TE.
///
/// When both surfaces share the leading-edge point it is emitted once.
pub fn assemble_contour(upper: &[Point], lower: &[Point]) -> Vec<Point> {
    let mut upper_te_first = normalize_surface(upper);
    upper_te_first.reverse();
    let lower = normalize_surface(lower);

    let duplicate_le = match (upper_te_first.last(), lower.first()) {
        (Some(a), Some(b)) => (a - b).norm() < LE_MERGE_TOLERANCE,
        _ => false,
    };
    if duplicate_le {
        upper_te_first.pop();
    }

    upper_te_first.extend(lower);
    upper_te_first
}

/// Split a Selig-ordered contour (TE → upper → LE → lower → TE) at its
/// minimum-x point. Both returned surfaces run LE → TE and include the LE.
pub fn split_contour(points: &[Point]) -> Result<(Vec<Point>, Vec<Point>), AppError> {
    if points.len() < 3 {
        return Err(AppError::invalid_input(format!(
            "A closed contour needs at least 3 points; got {}.",
            points.len()
        )));
    }

    let mut le = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x < points[le].x {
            le = i;
        }
    }
    if le == 0 || le == points.len() - 1 {
        return Err(AppError::invalid_input(
            "Contour leading edge is at an end point; expected TE -> upper -> LE -> lower -> TE order.",
        ));
    }

    let upper: Vec<Point> = points[..=le].iter().rev().copied().collect();
    let lower = points[le..].to_vec();
    Ok((upper, lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f64, f64)]) -> Vec<Point> {
        v.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn monotonic_checks() {
        assert!(is_monotonic(&[0.0, 0.5, 0.5, 1.0], Monotonic::Increasing));
        assert!(!is_monotonic(&[0.0, 0.5, 0.5, 1.0], Monotonic::StrictlyIncreasing));
        assert!(is_monotonic(&[1.0, 0.2, 0.0], Monotonic::StrictlyDecreasing));
        assert!(is_monotonic(&[], Monotonic::StrictlyDecreasing));
    }

    #[test]
    fn normalize_reverses_te_first_input() {
        let te_first = pts(&[(1.0, 0.0), (0.5, 0.06), (0.0, 0.0)]);
        let out = normalize_surface(&te_first);
        assert_eq!(out[0], Point::new(0.0, 0.0));
        assert_eq!(out[2], Point::new(1.0, 0.0));
        assert_eq!(normalize_surface(&out), out);
    }

    #[test]
    fn contour_drops_shared_leading_edge() {
        let upper = pts(&[(0.0, 0.0), (0.5, 0.06), (1.0, 0.0)]);
        let lower = pts(&[(0.0, 0.0), (0.5, -0.04), (1.0, 0.0)]);
        let contour = assemble_contour(&upper, &lower);
        assert_eq!(
            contour,
            pts(&[(1.0, 0.0), (0.5, 0.06), (0.0, 0.0), (0.5, -0.04), (1.0, 0.0)])
        );

        let lower_open = pts(&[(0.001, -0.002), (1.0, 0.0)]);
        assert_eq!(assemble_contour(&upper, &lower_open).len(), 5);
    }

    #[test]
    fn split_inverts_assemble() {
        let upper = pts(&[(0.0, 0.0), (0.3, 0.07), (1.0, 0.0)]);
        let lower = pts(&[(0.0, 0.0), (0.3, -0.03), (1.0, 0.0)]);
        let (u, l) = split_contour(&assemble_contour(&upper, &lower)).unwrap();
        assert_eq!(u, upper);
        assert_eq!(l, lower);
    }

    #[test]
    fn split_rejects_leading_edge_at_end() {
        let open = pts(&[(0.0, 0.0), (0.5, 0.1), (1.0, 0.0)]);
        assert_eq!(split_contour(&open).unwrap_err().status_code(), 400);
    }
}
