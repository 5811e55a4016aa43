//! Point-to-segment distance.

use crate::domain::Point;

/// Euclidean distance from `p` to the closed segment `[a, b]`.
///
/// The projection parameter is clamped to `[0, 1]`. A zero-length segment
/// degrades to the point-to-point distance `|p - a|` instead of dividing by zero.
pub fn point_segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return ((p.x - a.x).powi(2) + (p.y - a.y).powi(2)).sqrt();
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0);
    let cx = a.x + t * dx;
    let cy = a.y + t * dy;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
