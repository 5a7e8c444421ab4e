//! Input mesh: vertices, edges and polygons, validated on construction.

use std::collections::HashSet;

use vcad_kernel_math::Point3;

use crate::error::{Result, SectionError};

/// Canonical unordered pair of vertex indices identifying an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(usize, usize);

impl EdgeKey {
    /// Key for the edge between `a` and `b`, in either order.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Smaller vertex index.
    pub fn low(&self) -> usize {
        self.0
    }

    /// Larger vertex index.
    pub fn high(&self) -> usize {
        self.1
    }
}

/// A face given as an ordered loop of vertex indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<usize>,
}

impl Polygon {
    /// Create a polygon from its vertex loop.
    pub fn new(vertices: Vec<usize>) -> Self {
        Self { vertices }
    }

    /// Vertex indices in boundary order.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Keys of the boundary edges in order, including the closing edge.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| EdgeKey::new(self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Read-only polygon mesh handed to the section pipeline.
///
/// Fields are private so that every `Mesh` in circulation has passed
/// validation: indices are in range, coordinates are finite, edges are
/// non-degenerate and every polygon edge exists in the edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Point3>,
    edges: Vec<[usize; 2]>,
    polygons: Vec<Polygon>,
}

impl Mesh {
    /// Build a mesh from explicit vertices, edges and polygons.
    ///
    /// Edges keep the vertex order given here; the first vertex of each
    /// edge is the one reported when a coplanar edge collapses.
    pub fn new(
        vertices: Vec<Point3>,
        edges: Vec<[usize; 2]>,
        polygons: Vec<Vec<usize>>,
    ) -> Result<Self> {
        let mesh = Self {
            vertices,
            edges,
            polygons: polygons.into_iter().map(Polygon::new).collect(),
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Build a mesh from polygons, deriving the edge list from their
    /// boundaries in first-seen order.
    pub fn from_polygons(vertices: Vec<Point3>, polygons: Vec<Vec<usize>>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for poly in &polygons {
            let n = poly.len();
            for i in 0..n {
                let (a, b) = (poly[i], poly[(i + 1) % n]);
                if seen.insert(EdgeKey::new(a, b)) {
                    edges.push([a, b]);
                }
            }
        }
        Self::new(vertices, edges, polygons)
    }

    /// Build a mesh from flat triangle buffers: `[x0, y0, z0, x1, ...]`
    /// positions and `[i0, i1, i2, ...]` indices.
    pub fn from_triangles(vertices: &[f32], indices: &[u32]) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(SectionError::TriangleBuffer(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(SectionError::TriangleBuffer(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }

        let points = vertices
            .chunks_exact(3)
            .map(|c| Point3::new(c[0] as f64, c[1] as f64, c[2] as f64))
            .collect();
        let triangles = indices
            .chunks_exact(3)
            .map(|t| t.iter().map(|&i| i as usize).collect())
            .collect();

        Self::from_polygons(points, triangles)
    }

    fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();

        if let Some(vertex) = self
            .vertices
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(SectionError::NonFiniteCoordinate { vertex });
        }

        let check_index = |index: usize| {
            if index < vertex_count {
                Ok(())
            } else {
                Err(SectionError::VertexOutOfRange {
                    index,
                    vertex_count,
                })
            }
        };

        let mut keys = HashSet::with_capacity(self.edges.len());
        for (edge, &[a, b]) in self.edges.iter().enumerate() {
            check_index(a)?;
            check_index(b)?;
            if a == b {
                return Err(SectionError::DegenerateEdge { edge, vertex: a });
            }
            keys.insert(EdgeKey::new(a, b));
        }

        for (polygon, poly) in self.polygons.iter().enumerate() {
            if poly.vertices.len() < 3 {
                return Err(SectionError::PolygonTooSmall {
                    polygon,
                    len: poly.vertices.len(),
                });
            }
            for &v in &poly.vertices {
                check_index(v)?;
            }
            if let Some(key) = poly.edge_keys().find(|k| !keys.contains(k)) {
                return Err(SectionError::MissingEdge {
                    polygon,
                    a: key.low(),
                    b: key.high(),
                });
            }
        }

        Ok(())
    }

    /// Vertex positions in mesh-local space.
    pub fn vertices(&self) -> &[Point3] {
        &self.vertices
    }

    /// Edges as stored, each a pair of vertex indices.
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Polygons in input order.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of polygons.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }
}
