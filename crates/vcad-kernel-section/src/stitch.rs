//! Face stitching: connect the section points that share a mesh face.

use vcad_kernel_math::Point3;

use crate::classify::Intersections;
use crate::mesh::{Mesh, Polygon};

/// What a single polygon contributes to the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStitch {
    /// One section edge between two point indices.
    Edge([usize; 2]),
    /// Fewer than two of the polygon's edges meet the plane.
    Untouched,
    /// More than two hits that do not reduce to exactly two distinct
    /// coordinates. The face is skipped.
    Degenerate {
        /// Number of distinct coordinates among the hits.
        distinct: usize,
    },
}

/// Section edges gathered from every polygon of a mesh.
#[derive(Debug, Clone, Default)]
pub struct Stitched {
    /// Edges between indices into [`Intersections::points`].
    pub edges: Vec<[usize; 2]>,
    /// Number of polygons skipped as ambiguous.
    pub degenerate_faces: usize,
}

/// Hashable exact coordinate; `-0.0` and `0.0` compare equal.
fn coord_key(p: &Point3) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Work out which section edge, if any, a polygon produces.
///
/// More than two hits happen when the plane passes through a vertex of
/// the polygon: both edges at that vertex report the same coordinate.
/// Hits are then grouped by exact coordinate, keeping first-seen order
/// and the last index seen for each coordinate.
pub fn stitch_polygon(polygon: &Polygon, hits: &Intersections) -> FaceStitch {
    let ps: Vec<usize> = polygon
        .edge_keys()
        .filter_map(|key| hits.by_edge.get(&key).copied())
        .collect();

    match ps.len() {
        0 | 1 => FaceStitch::Untouched,
        2 => FaceStitch::Edge([ps[0], ps[1]]),
        _ => {
            let mut unique: Vec<([u64; 3], usize)> = Vec::with_capacity(ps.len());
            for &id in &ps {
                let key = coord_key(&hits.points[id]);
                match unique.iter_mut().find(|(k, _)| *k == key) {
                    Some(entry) => entry.1 = id,
                    None => unique.push((key, id)),
                }
            }
            if unique.len() == 2 {
                FaceStitch::Edge([unique[0].1, unique[1].1])
            } else {
                FaceStitch::Degenerate {
                    distinct: unique.len(),
                }
            }
        }
    }
}

/// Stitch every polygon of `mesh`, then append any coplanar edges the
/// classifier kept.
pub fn stitch_faces(mesh: &Mesh, hits: &Intersections) -> Stitched {
    let mut out = Stitched::default();

    for (index, polygon) in mesh.polygons().iter().enumerate() {
        match stitch_polygon(polygon, hits) {
            FaceStitch::Edge(edge) => out.edges.push(edge),
            FaceStitch::Untouched => {}
            FaceStitch::Degenerate { distinct } => {
                tracing::debug!(polygon = index, distinct, "skipping degenerate face");
                out.degenerate_faces += 1;
            }
        }
    }

    out.edges.extend_from_slice(&hits.coplanar_edges);
    out
}
