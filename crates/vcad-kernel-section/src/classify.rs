//! Edge classification: where does each mesh edge meet the z = 0 plane?

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{Point3, Transform};

use crate::mesh::{EdgeKey, Mesh};

/// What to do with an edge whose endpoints both lie on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoplanarEdges {
    /// Collapse the edge to its first endpoint (the second is lost).
    #[default]
    Collapse,
    /// Also emit the second endpoint and keep the edge itself in the section.
    Emit,
}

/// How a single edge meets the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeHit {
    /// Endpoints on opposite sides; the interpolated crossing point.
    Crossing(Point3),
    /// The first endpoint lies on the plane.
    First(Point3),
    /// The second endpoint lies on the plane.
    Second(Point3),
}

impl EdgeHit {
    /// The section point this hit contributes.
    pub fn point(&self) -> Point3 {
        match *self {
            EdgeHit::Crossing(p) | EdgeHit::First(p) | EdgeHit::Second(p) => p,
        }
    }
}

/// Classify one edge given its endpoints in plane-local space.
///
/// The side test is `z > 0` against `z <= 0`, so an endpoint sitting
/// exactly on the plane counts as the back side: an edge from such an
/// endpoint to the front is a crossing with `t = 0`, which yields the
/// endpoint itself.
pub fn classify_edge(p0: &Point3, p1: &Point3, epsilon: f64) -> Option<EdgeHit> {
    let d0 = p0.z.abs();
    let d1 = p1.z.abs();

    if (p0.z > 0.0) != (p1.z > 0.0) {
        let t = d0 / (d0 + d1);
        Some(EdgeHit::Crossing(p0 + (p1 - p0) * t))
    } else if d0 < epsilon {
        Some(EdgeHit::First(*p0))
    } else if d1 < epsilon {
        Some(EdgeHit::Second(*p1))
    } else {
        None
    }
}

/// Section points produced by classifying every edge of a mesh.
#[derive(Debug, Clone, Default)]
pub struct Intersections {
    /// Section points in plane-local space, in edge order.
    pub points: Vec<Point3>,
    /// Index into `points` for every edge that meets the plane.
    pub by_edge: HashMap<EdgeKey, usize>,
    /// Edges lying in the plane, kept under [`CoplanarEdges::Emit`].
    pub coplanar_edges: Vec<[usize; 2]>,
    /// Number of edges with endpoints on opposite sides.
    pub crossings: usize,
    /// Number of edges reported through an on-plane endpoint.
    pub on_plane: usize,
}

/// Classify every edge of `mesh` against the z = 0 plane of `plane_local`.
///
/// Each edge key gets at most one point; if the edge list repeats a key
/// the first occurrence wins.
pub fn classify_edges(
    mesh: &Mesh,
    plane_local: &Transform,
    epsilon: f64,
    coplanar: CoplanarEdges,
) -> Intersections {
    let local: Vec<Point3> = mesh
        .vertices()
        .iter()
        .map(|p| plane_local.apply_point(p))
        .collect();

    let mut out = Intersections::default();

    for &[a, b] in mesh.edges() {
        let (p0, p1) = (&local[a], &local[b]);
        // Under Emit an in-plane edge is kept whole, even when noise puts
        // its endpoints on opposite sides of z = 0.
        let in_plane = coplanar == CoplanarEdges::Emit
            && p0.z.abs() < epsilon
            && p1.z.abs() < epsilon;
        let hit = if in_plane {
            EdgeHit::First(*p0)
        } else {
            match classify_edge(p0, p1, epsilon) {
                Some(hit) => hit,
                None => continue,
            }
        };

        let slot = match out.by_edge.entry(EdgeKey::new(a, b)) {
            Entry::Occupied(_) => continue,
            Entry::Vacant(slot) => slot,
        };
        let index = out.points.len();
        slot.insert(index);
        out.points.push(hit.point());

        match hit {
            EdgeHit::Crossing(_) => out.crossings += 1,
            EdgeHit::First(_) | EdgeHit::Second(_) => out.on_plane += 1,
        }

        if in_plane {
            let second = out.points.len();
            out.points.push(*p1);
            out.coplanar_edges.push([index, second]);
        }
    }

    tracing::trace!(
        points = out.points.len(),
        crossings = out.crossings,
        on_plane = out.on_plane,
        "classified edges"
    );

    out
}
