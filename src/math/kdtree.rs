//! A small 2-D k-d tree for nearest-neighbour queries against a sampled curve.
//!
//! The tree is an implicit balanced layout over an index permutation: the
//! median of each index range splits it on the current axis (x at even depth,
//! y at odd depth). Rebuilding reuses the point and index buffers, so an
//! objective that resamples its curve on every evaluation does not allocate
//! after the first build.
//!
//! Ties are broken towards the lower point index so queries are deterministic.

use std::cmp::Ordering;

use crate::domain::Point;

#[derive(Debug, Clone, Default)]
pub struct KdTree2 {
    points: Vec<Point>,
    index: Vec<usize>,
}

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Index into the point slice the tree was built from.
    pub index: usize,
    /// Euclidean distance to that point.
    pub distance: f64,
}

impl KdTree2 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(points: &[Point]) -> Self {
        let mut tree = Self::new();
        tree.rebuild(points);
        tree
    }

    /// Replace the indexed points, reusing internal buffers.
    pub fn rebuild(&mut self, points: &[Point]) {
        self.points.clear();
        self.points.extend_from_slice(points);
        self.index.clear();
        self.index.extend(0..points.len());
        build_range(&self.points, &mut self.index, 0);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Nearest indexed point to `query`, or `None` for an empty tree.
    pub fn nearest(&self, query: &Point) -> Option<Nearest> {
        if self.points.is_empty() {
            return None;
        }
        let mut best = Best {
            index: usize::MAX,
            dist2: f64::INFINITY,
        };
        search(&self.points, &self.index, 0, query, &mut best);
        if best.index == usize::MAX {
            return None;
        }
        Some(Nearest {
            index: best.index,
            distance: best.dist2.sqrt(),
        })
    }
}

struct Best {
    index: usize,
    dist2: f64,
}

fn coord(p: &Point, axis: usize) -> f64 {
    if axis == 0 { p.x } else { p.y }
}

fn build_range(points: &[Point], index: &mut [usize], depth: usize) {
    if index.len() <= 1 {
        return;
    }
    let axis = depth % 2;
    let mid = index.len() / 2;
    index.select_nth_unstable_by(mid, |&a, &b| {
        coord(&points[a], axis)
            .partial_cmp(&coord(&points[b], axis))
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    let (left, rest) = index.split_at_mut(mid);
    build_range(points, left, depth + 1);
    build_range(points, &mut rest[1..], depth + 1);
}

fn search(points: &[Point], index: &[usize], depth: usize, query: &Point, best: &mut Best) {
    if index.is_empty() {
        return;
    }
    let axis = depth % 2;
    let mid = index.len() / 2;
    let idx = index[mid];
    let p = &points[idx];

    let dx = query.x - p.x;
    let dy = query.y - p.y;
    let d2 = dx * dx + dy * dy;
    if d2 < best.dist2 || (d2 == best.dist2 && idx < best.index) {
        best.dist2 = d2;
        best.index = idx;
    }

    let diff = coord(query, axis) - coord(p, axis);
    let (near, far) = if diff < 0.0 {
        (&index[..mid], &index[mid + 1..])
    } else {
        (&index[mid + 1..], &index[..mid])
    };

    search(points, near, depth + 1, query, best);
    // `<=` keeps equal-distance candidates on the far side reachable for the
    // lower-index tie-break.
    if diff * diff <= best.dist2 {
        search(points, far, depth + 1, query, best);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(points: &[Point], q: &Point) -> (usize, f64) {
        let mut best = (usize::MAX, f64::INFINITY);
        for (i, p) in points.iter().enumerate() {
            let d = (p - q).norm();
            if d < best.1 {
                best = (i, d);
            }
        }
        best
    }

    #[test]
    fn matches_brute_force_on_a_curve() {
        let points: Vec<Point> = (0..200)
            .map(|i| {
                let t = i as f64 / 199.0;
                Point::new(t, 0.4 * t * (1.0 - t))
            })
            .collect();
        let tree = KdTree2::build(&points);
        assert_eq!(tree.len(), 200);

        for k in 0..37 {
            let q = Point::new(k as f64 / 36.0 - 0.05, 0.15 - k as f64 * 0.004);
            let got = tree.nearest(&q).unwrap();
            let (idx, dist) = brute_force(&points, &q);
            assert_eq!(got.index, idx, "query {k}");
            assert!((got.distance - dist).abs() < 1e-15);
        }
    }

    #[test]
    fn duplicate_points_resolve_to_lowest_index() {
        let points = vec![Point::new(1.0, 1.0); 5];
        let tree = KdTree2::build(&points);
        let got = tree.nearest(&Point::new(0.0, 0.0)).unwrap();
        assert_eq!(got.index, 0);
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut tree = KdTree2::build(&[Point::new(0.0, 0.0)]);
        tree.rebuild(&[Point::new(5.0, 5.0), Point::new(6.0, 6.0)]);
        let got = tree.nearest(&Point::new(6.1, 6.0)).unwrap();
        assert_eq!(got.index, 1);
        assert!(KdTree2::new().nearest(&Point::origin()).is_none());
    }
}
