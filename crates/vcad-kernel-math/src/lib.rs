#![warn(missing_docs)]

//! Math types for the vcad section kernel.
//!
//! Thin wrappers around nalgebra: points, vectors, the affine transform
//! used to carry mesh coordinates into a cutting plane's frame, and the
//! default tolerances used when classifying and welding section points.

use nalgebra::{Matrix4, Rotation3, Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Affine transform stored as a homogeneous 4x4 matrix.
///
/// Composition follows matrix order: `a.then(&b)` applies `b` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Homogeneous matrix, column vectors.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self::from_matrix(Matrix4::identity())
    }

    /// Wrap an existing matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// Build from four row-major rows, the layout scene files use.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self::from_matrix(Matrix4::from_fn(|r, c| rows[r][c]))
    }

    /// Row-major rows of the matrix.
    pub fn to_rows(&self) -> [[f64; 4]; 4] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.matrix[(r, c)]))
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self::from_matrix(Matrix4::new_translation(&Vec3::new(dx, dy, dz)))
    }

    /// Scale by `(sx, sy, sz)`. A zero factor gives a singular transform.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_matrix(Matrix4::new_nonuniform_scaling(&Vec3::new(sx, sy, sz)))
    }

    /// Right-handed rotation of `angle` radians about `axis`.
    pub fn rotation(axis: &Vec3, angle: f64) -> Self {
        let axis = Unit::new_normalize(*axis);
        Self::from_matrix(Rotation3::from_axis_angle(&axis, angle).to_homogeneous())
    }

    /// Rotation about X. A quarter turn stands the XY plane upright.
    pub fn rotation_x(angle: f64) -> Self {
        Self::rotation(&Vec3::x(), angle)
    }

    /// Rotation about Z.
    pub fn rotation_z(angle: f64) -> Self {
        Self::rotation(&Vec3::z(), angle)
    }

    /// `self * other`.
    pub fn then(&self, other: &Transform) -> Self {
        Self::from_matrix(self.matrix * other.matrix)
    }

    /// Map a point, translation included.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        self.matrix.transform_point(p)
    }

    /// Map a direction, translation ignored.
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.matrix.transform_vector(v)
    }

    /// Inverse, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(Self::from_matrix)
    }

    /// True when no entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Distances used by the section pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// A vertex closer than this to the plane lies on it.
    pub plane: f64,
    /// Section points closer than this are welded.
    pub weld: f64,
}

impl Tolerance {
    /// 1e-6 on-plane distance, 1e-4 weld distance.
    pub const DEFAULT: Self = Self {
        plane: 1e-6,
        weld: 1e-4,
    };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
