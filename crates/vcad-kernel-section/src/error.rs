//! Error types for section computation.

use thiserror::Error;

/// Errors that can occur while building a mesh or sectioning it.
///
/// A plane that misses the mesh is not an error; see
/// [`SectionOutcome::NoIntersection`](crate::SectionOutcome::NoIntersection).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SectionError {
    /// An edge or polygon references a vertex that does not exist.
    #[error("vertex index {index} out of range (mesh has {vertex_count} vertices)")]
    VertexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// An edge joins a vertex to itself.
    #[error("edge {edge} connects vertex {vertex} to itself")]
    DegenerateEdge {
        /// Position of the edge in the edge list.
        edge: usize,
        /// The repeated vertex.
        vertex: usize,
    },

    /// A polygon boundary uses an edge that is not in the edge set.
    #[error("polygon {polygon} uses edge ({a}, {b}) which is not in the edge set")]
    MissingEdge {
        /// Position of the polygon in the polygon list.
        polygon: usize,
        /// Lower vertex index of the edge key.
        a: usize,
        /// Upper vertex index of the edge key.
        b: usize,
    },

    /// A polygon has fewer than three vertices.
    #[error("polygon {polygon} has {len} vertices, need at least 3")]
    PolygonTooSmall {
        /// Position of the polygon in the polygon list.
        polygon: usize,
        /// Number of vertices it has.
        len: usize,
    },

    /// A vertex position contains NaN or infinity.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// The offending vertex.
        vertex: usize,
    },

    /// The plane-local transform contains NaN or infinity.
    #[error("plane-local transform has non-finite entries")]
    NonFiniteTransform,

    /// Flat vertex/index buffers have inconsistent lengths.
    #[error("invalid triangle buffer: {0}")]
    TriangleBuffer(String),

    /// The cutting plane's world matrix cannot be inverted.
    #[error("cutting plane transform is singular")]
    SingularTransform,

    /// A batch was started with nothing to cut.
    #[error("the selection is empty, no object to cut")]
    EmptySelection,

    /// Invalid section options.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl SectionError {
    /// True for errors caused by inconsistent mesh or transform data.
    ///
    /// These fail a single mesh; a batch carries on with the next object.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            SectionError::VertexOutOfRange { .. }
                | SectionError::DegenerateEdge { .. }
                | SectionError::MissingEdge { .. }
                | SectionError::PolygonTooSmall { .. }
                | SectionError::NonFiniteCoordinate { .. }
                | SectionError::NonFiniteTransform
                | SectionError::TriangleBuffer(_)
        )
    }
}

/// Result type for section operations.
pub type Result<T> = std::result::Result<T, SectionError>;
