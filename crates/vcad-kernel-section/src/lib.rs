#![warn(missing_docs)]

//! Planar cross-sections of polygon meshes for the vcad kernel.
//!
//! A section is computed in the cutting plane's own frame, where the plane
//! is z = 0. The caller supplies one transform taking mesh coordinates into
//! that frame; the pipeline then
//!
//! 1. classifies every mesh edge against the plane ([`classify`]),
//! 2. connects the points that share a face ([`stitch`]),
//! 3. welds coincident points, traces contours and optionally fills closed
//!    loops with faces wound towards +z ([`assemble`]).
//!
//! [`batch`] runs the same computation for many objects against one plane
//! in parallel.
//!
//! # Example
//!
//! ```ignore
//! use vcad_kernel_section::{section, Mesh, SectionOutcome};
//! use vcad_kernel_math::Transform;
//!
//! let mesh: Mesh = // ... unit cube centred on the origin
//! match section(&mesh, &Transform::identity(), true)? {
//!     SectionOutcome::Section(s) => println!("{} faces", s.faces.len()),
//!     SectionOutcome::NoIntersection => println!("plane misses the mesh"),
//! }
//! ```

pub mod assemble;
pub mod batch;
pub mod classify;
pub mod error;
pub mod fill;
pub mod mesh;
pub mod stitch;
pub mod weld;

pub use batch::{
    flatten_instances, BatchEntry, BatchReport, BatchSummary, CrossSection, SceneObject,
};
pub use classify::{classify_edge, classify_edges, CoplanarEdges, EdgeHit, Intersections};
pub use error::{Result, SectionError};
pub use fill::Contour;
pub use mesh::{EdgeKey, Mesh, Polygon};
pub use stitch::{stitch_faces, stitch_polygon, FaceStitch};

use serde::{Deserialize, Serialize};
use vcad_kernel_math::{Point3, Tolerance, Transform};

/// Section parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    /// Fill closed contours with faces.
    pub fill: bool,
    /// Split filled faces into triangles.
    pub triangulate: bool,
    /// Distance below which a vertex lies on the plane.
    pub plane_epsilon: f64,
    /// Distance below which section points are welded.
    pub weld_tolerance: f64,
    /// Handling of mesh edges lying in the plane.
    pub coplanar_edges: CoplanarEdges,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            fill: true,
            triangulate: false,
            plane_epsilon: Tolerance::DEFAULT.plane,
            weld_tolerance: Tolerance::DEFAULT.weld,
            coplanar_edges: CoplanarEdges::Collapse,
        }
    }
}

impl SectionOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if !(self.plane_epsilon.is_finite() && self.plane_epsilon > 0.0) {
            return Err(SectionError::InvalidSettings(
                "plane_epsilon must be positive".into(),
            ));
        }
        if !(self.weld_tolerance.is_finite() && self.weld_tolerance > 0.0) {
            return Err(SectionError::InvalidSettings(
                "weld_tolerance must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Counters describing how a section was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStats {
    /// Edges with endpoints on opposite sides of the plane.
    pub crossings: usize,
    /// Edges reported through an endpoint lying on the plane.
    pub on_plane: usize,
    /// Faces skipped because their hits were ambiguous.
    pub degenerate_faces: usize,
    /// Points merged away by welding.
    pub merged_points: usize,
    /// Closed contours.
    pub closed_loops: usize,
    /// Open contours.
    pub open_chains: usize,
    /// Edge components with junctions (no contour produced).
    pub branched: usize,
    /// Closed loops left unfilled because they enclose no area.
    pub zero_area_loops: usize,
    /// Faces generated by filling.
    pub faces: usize,
}

/// Cross-section of one mesh, in plane-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMesh {
    /// Section points after welding.
    pub vertices: Vec<Point3>,
    /// Unique edges `[a, b]` with `a < b`.
    pub edges: Vec<[usize; 2]>,
    /// Filled faces, counter-clockwise seen from +z. Empty unless filling.
    pub faces: Vec<Vec<usize>>,
    /// Closed loops and open chains through the edges.
    pub contours: Vec<Contour>,
    /// Build counters.
    pub stats: SectionStats,
}

impl SectionMesh {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True when every edge belongs to a closed contour.
    pub fn is_closed(&self) -> bool {
        !self.contours.is_empty()
            && self.stats.branched == 0
            && self.contours.iter().all(|c| c.closed)
    }

    /// Closed contours only.
    pub fn closed_contours(&self) -> impl Iterator<Item = &Contour> {
        self.contours.iter().filter(|c| c.closed)
    }

    /// Copy with every vertex mapped through `transform`, e.g. the cutting
    /// plane's world matrix to place the section in the scene.
    pub fn transformed(&self, transform: &Transform) -> SectionMesh {
        SectionMesh {
            vertices: self
                .vertices
                .iter()
                .map(|p| transform.apply_point(p))
                .collect(),
            ..self.clone()
        }
    }
}

/// Result of sectioning one mesh.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome {
    /// The plane cuts the mesh.
    Section(SectionMesh),
    /// The plane does not cut the mesh.
    NoIntersection,
}

impl SectionOutcome {
    /// The section, if there is one.
    pub fn into_section(self) -> Option<SectionMesh> {
        match self {
            SectionOutcome::Section(section) => Some(section),
            SectionOutcome::NoIntersection => None,
        }
    }

    /// Borrow the section, if there is one.
    pub fn as_section(&self) -> Option<&SectionMesh> {
        match self {
            SectionOutcome::Section(section) => Some(section),
            SectionOutcome::NoIntersection => None,
        }
    }
}

/// Section `mesh` by the z = 0 plane of `plane_local` with default options.
pub fn section(mesh: &Mesh, plane_local: &Transform, fill: bool) -> Result<SectionOutcome> {
    let options = SectionOptions {
        fill,
        ..Default::default()
    };
    section_with_options(mesh, plane_local, &options)
}

/// Section `mesh` by the z = 0 plane of `plane_local`.
///
/// `plane_local` maps mesh coordinates into the plane's frame. The result
/// is in that frame; place it in the world with the plane's own transform.
pub fn section_with_options(
    mesh: &Mesh,
    plane_local: &Transform,
    options: &SectionOptions,
) -> Result<SectionOutcome> {
    options.validate()?;
    if !plane_local.is_finite() {
        return Err(SectionError::NonFiniteTransform);
    }

    let _span = tracing::debug_span!(
        "section",
        vertices = mesh.vertex_count(),
        edges = mesh.edge_count(),
        polygons = mesh.polygon_count()
    )
    .entered();

    let hits = classify_edges(
        mesh,
        plane_local,
        options.plane_epsilon,
        options.coplanar_edges,
    );
    let stitched = stitch_faces(mesh, &hits);

    Ok(assemble::assemble(&hits, &stitched, options))
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::*;

    /// Axis-aligned box with quad faces, 8 vertices and 12 edges.
    pub fn cuboid(min: [f64; 3], max: [f64; 3]) -> Mesh {
        let [x0, y0, z0] = min;
        let [x1, y1, z1] = max;
        let vertices = vec![
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        Mesh::from_polygons(vertices, faces).unwrap()
    }

    /// Unit cube centred on the origin.
    pub fn unit_cube() -> Mesh {
        cuboid([-0.5, -0.5, -0.5], [0.5, 0.5, 0.5])
    }

    /// Two separate boxes side by side, both straddling z = 0.
    pub fn two_islands() -> Mesh {
        let a = cuboid([-3.0, -1.0, -1.0], [-1.0, 1.0, 1.0]);
        let b = cuboid([1.0, -1.0, -1.0], [3.0, 1.0, 1.0]);
        let offset = a.vertex_count();
        let mut vertices = a.vertices().to_vec();
        vertices.extend_from_slice(b.vertices());
        let mut polygons: Vec<Vec<usize>> =
            a.polygons().iter().map(|p| p.vertices().to_vec()).collect();
        polygons.extend(
            b.polygons()
                .iter()
                .map(|p| p.vertices().iter().map(|v| v + offset).collect()),
        );
        Mesh::from_polygons(vertices, polygons).unwrap()
    }
}
