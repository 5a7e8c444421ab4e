//! Welding of coincident section points.

use std::collections::{HashMap, HashSet};

use vcad_kernel_math::Point3;

/// Section points and edges after welding.
#[derive(Debug, Clone, Default)]
pub struct Welded {
    /// Surviving points, in order of first occurrence.
    pub points: Vec<Point3>,
    /// Canonical (`a < b`), unique edges between `points`.
    pub edges: Vec<[usize; 2]>,
    /// Number of input points merged into an earlier one.
    pub merged: usize,
}

/// Grid cell of a point for a given cell size.
fn cell_key(p: &Point3, cell: f64) -> (i64, i64, i64) {
    (
        (p.x / cell).floor() as i64,
        (p.y / cell).floor() as i64,
        (p.z / cell).floor() as i64,
    )
}

/// Merge points closer than `tolerance`, remap `edges` onto the survivors
/// and drop edges that became zero-length or duplicate.
///
/// Each point merges into the earliest surviving point within tolerance,
/// so the result depends only on input order. Points that no edge uses
/// are kept.
pub fn weld(points: &[Point3], edges: &[[usize; 2]], tolerance: f64) -> Welded {
    let cell = tolerance.max(1e-12);
    let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    let mut remap = Vec::with_capacity(points.len());
    let mut out = Welded::default();

    for p in points {
        let (cx, cy, cz) = cell_key(p, cell);
        let mut found = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &candidate in bucket {
                        if (out.points[candidate] - p).norm() <= tolerance
                            && found.map_or(true, |f| candidate < f)
                        {
                            found = Some(candidate);
                        }
                    }
                }
            }
        }

        match found {
            Some(existing) => {
                remap.push(existing);
                out.merged += 1;
            }
            None => {
                let index = out.points.len();
                out.points.push(*p);
                grid.entry((cx, cy, cz)).or_default().push(index);
                remap.push(index);
            }
        }
    }

    let mut seen = HashSet::with_capacity(edges.len());
    for &[a, b] in edges {
        let (a, b) = (remap[a], remap[b]);
        if a == b {
            continue;
        }
        let edge = if a < b { [a, b] } else { [b, a] };
        if seen.insert(edge) {
            out.edges.push(edge);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincident_points_merge_into_first() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0 + 1e-6, 0.0, 0.0),
        ];
        let welded = weld(&points, &[[0, 1], [2, 3]], 1e-4);
        assert_eq!(welded.points.len(), 2);
        assert_eq!(welded.merged, 2);
        assert_eq!(welded.edges, vec![[0, 1]]);
        assert_eq!(welded.points[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_zero_length_edges_dropped() {
        let points = vec![Point3::new(2.0, 2.0, 0.0), Point3::new(2.0, 2.0, 0.0)];
        let welded = weld(&points, &[[0, 1]], 1e-4);
        assert_eq!(welded.points.len(), 1);
        assert!(welded.edges.is_empty());
    }

    #[test]
    fn test_edges_are_canonical_and_unique() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
        let welded = weld(&points, &[[1, 0], [0, 1], [1, 0]], 1e-4);
        assert_eq!(welded.edges, vec![[0, 1]]);
    }

    #[test]
    fn test_merge_across_cell_boundary() {
        // Straddles a grid line at x = 0.
        let points = vec![Point3::new(-1e-5, 0.0, 0.0), Point3::new(1e-5, 0.0, 0.0)];
        let welded = weld(&points, &[], 1e-4);
        assert_eq!(welded.points.len(), 1);
    }

    #[test]
    fn test_distinct_points_and_loose_points_kept() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(5.0, 5.0, 0.0),
        ];
        let welded = weld(&points, &[[0, 1]], 1e-4);
        assert_eq!(welded.points.len(), 3);
        assert_eq!(welded.merged, 0);
        assert_eq!(welded.edges, vec![[0, 1]]);
    }
}
