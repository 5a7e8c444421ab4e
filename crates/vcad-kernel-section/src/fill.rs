//! Contour tracing, loop filling and face winding.
//!
//! All of this works in the plane-local frame, where the section lies in
//! z = 0 and filled faces are wound counter-clockwise seen from +z.

use serde::Serialize;
use vcad_kernel_math::Point3;

/// An ordered run of section vertices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contour {
    /// Vertex indices in walking order. A closed contour does not repeat
    /// its first vertex at the end.
    pub vertices: Vec<usize>,
    /// True when the last vertex connects back to the first.
    pub closed: bool,
}

/// Contours found in a section edge graph.
#[derive(Debug, Clone, Default)]
pub struct ContourSet {
    /// Closed loops and open chains, ordered by their smallest vertex.
    pub contours: Vec<Contour>,
    /// Components with a vertex of degree three or more.
    pub branched: usize,
}

/// Split the edge graph into connected components and walk each one.
///
/// A component where every vertex has two neighbours is a closed loop;
/// one with exactly two ends and no junctions is an open chain. Anything
/// else is counted as branched and produces no contour.
pub fn trace_contours(vertex_count: usize, edges: &[[usize; 2]]) -> ContourSet {
    let mut adjacency = vec![Vec::new(); vertex_count];
    for &[a, b] in edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut visited = vec![false; vertex_count];
    let mut out = ContourSet::default();

    for start in 0..vertex_count {
        if visited[start] || adjacency[start].is_empty() {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(v) = stack.pop() {
            component.push(v);
            for &n in &adjacency[v] {
                if !visited[n] {
                    visited[n] = true;
                    stack.push(n);
                }
            }
        }

        let degree = |v: usize| adjacency[v].len();
        if component.iter().any(|&v| degree(v) > 2) {
            out.branched += 1;
            continue;
        }

        let ends: Vec<usize> = component.iter().copied().filter(|&v| degree(v) == 1).collect();
        let contour = match ends.as_slice() {
            [] => Contour {
                vertices: walk(&adjacency, start),
                closed: true,
            },
            [a, b] => Contour {
                vertices: walk(&adjacency, (*a).min(*b)),
                closed: false,
            },
            _ => {
                out.branched += 1;
                continue;
            }
        };
        out.contours.push(contour);
    }

    out
}

/// Walk a path or cycle of degree ≤ 2 vertices from `start`.
fn walk(adjacency: &[Vec<usize>], start: usize) -> Vec<usize> {
    let mut path = vec![start];
    let mut prev = start;
    let mut current = match adjacency[start].first() {
        Some(&next) => next,
        None => return path,
    };

    while current != start {
        path.push(current);
        let next = adjacency[current].iter().copied().find(|&n| n != prev);
        match next {
            Some(n) => {
                prev = current;
                current = n;
            }
            None => break,
        }
    }

    path
}

/// Signed area of a vertex loop projected onto the XY plane.
///
/// Positive for counter-clockwise loops, i.e. a +z normal.
pub fn signed_area(points: &[Point3], face: &[usize]) -> f64 {
    let n = face.len();
    let mut twice = 0.0;
    for i in 0..n {
        let a = &points[face[i]];
        let b = &points[face[(i + 1) % n]];
        twice += a.x * b.y - b.x * a.y;
    }
    twice * 0.5
}

/// Filled faces built from the closed contours.
#[derive(Debug, Clone, Default)]
pub struct Fill {
    /// One counter-clockwise polygon per fillable loop.
    pub faces: Vec<Vec<usize>>,
    /// Closed loops skipped because their area is below `min_area`.
    pub zero_area: usize,
}

/// Turn every closed contour into a face wound with its normal along +z.
pub fn fill_loops(points: &[Point3], contours: &[Contour], min_area: f64) -> Fill {
    let mut out = Fill::default();

    for contour in contours.iter().filter(|c| c.closed && c.vertices.len() >= 3) {
        let mut face = contour.vertices.clone();
        let area = signed_area(points, &face);
        if area.abs() <= min_area {
            out.zero_area += 1;
            continue;
        }
        if area < 0.0 {
            face.reverse();
        }
        out.faces.push(face);
    }

    out
}

/// Ear-clip a counter-clockwise face into counter-clockwise triangles.
///
/// If clipping stalls on a degenerate remainder the rest is fanned.
pub fn triangulate_face(points: &[Point3], face: &[usize]) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(face.len().saturating_sub(2));
    if face.len() < 3 {
        return triangles;
    }

    let xy = |i: usize| (points[i].x, points[i].y);
    let mut remaining = face.to_vec();

    while remaining.len() > 3 {
        let n = remaining.len();
        let mut ear = None;

        for i in 0..n {
            let prev = remaining[(i + n - 1) % n];
            let cur = remaining[i];
            let next = remaining[(i + 1) % n];
            let (a, b, c) = (xy(prev), xy(cur), xy(next));

            let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
            if cross <= 0.0 {
                continue;
            }

            let blocked = remaining
                .iter()
                .filter(|&&v| v != prev && v != cur && v != next)
                .any(|&v| point_in_triangle_2d(xy(v), a, b, c));
            if !blocked {
                ear = Some(i);
                break;
            }
        }

        match ear {
            Some(i) => {
                let prev = remaining[(i + n - 1) % n];
                let next = remaining[(i + 1) % n];
                triangles.push([prev, remaining[i], next]);
                remaining.remove(i);
            }
            None => break,
        }
    }

    for i in 1..remaining.len() - 1 {
        triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
    }

    triangles
}

/// Point-in-triangle test for a counter-clockwise triangle.
///
/// Points on the boundary count as inside, so a vertex lying on a
/// candidate diagonal blocks that ear.
fn point_in_triangle_2d(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> bool {
    let orient = |u: (f64, f64), v: (f64, f64)| (v.0 - u.0) * (p.1 - u.1) - (v.1 - u.1) * (p.0 - u.0);
    let eps = 1e-12;
    orient(a, b) >= -eps && orient(b, c) >= -eps && orient(c, a) >= -eps
}
