//! Host-native data produced by the materializers.
//!
//! These mirror what a DCC host stores on its output plugs: plain numeric
//! values, a polygon mesh description and a NURBS curve description.

use glam::{DMat4, DVec3, Vec3};

/// A typed attribute value in the host's representation.
///
/// Single and double precision matrices both arrive as [`HostValue::Matrix`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Bool(bool),
    Short(i16),
    Int(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    Matrix(DMat4),
}

impl HostValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_matrix(&self) -> Option<&DMat4> {
        match self {
            Self::Matrix(matrix) => Some(matrix),
            _ => None,
        }
    }
}

/// Polygon mesh in the host's face-count / face-connect layout.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostMesh {
    pub polygon_counts: Vec<u32>,
    pub polygon_connects: Vec<u32>,
    pub points: Vec<Vec3>,
    /// Per face-vertex normals, present only when requested.
    pub face_vertex_normals: Option<Vec<Vec3>>,
    pub uv_set: String,
}

impl HostMesh {
    #[inline]
    #[must_use]
    pub fn num_polygons(&self) -> usize {
        self.polygon_counts.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveForm {
    #[default]
    Open,
    Periodic,
}

/// A single NURBS curve.
///
/// Knot vectors follow the host convention of `cvs + degree - 1` entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostCurve {
    pub degree: u32,
    pub form: CurveForm,
    pub cvs: Vec<DVec3>,
    pub knots: Vec<f64>,
}

impl HostCurve {
    #[inline]
    #[must_use]
    pub fn num_spans(&self) -> usize {
        self.cvs.len().saturating_sub(self.degree as usize)
    }
}

/// Result of materializing one location's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HostObject {
    /// Coordinate systems are exposed as their translation.
    Numeric3(DVec3),
    Mesh(HostMesh),
    NurbsCurve(HostCurve),
}

impl HostObject {
    #[must_use]
    pub fn as_mesh(&self) -> Option<&HostMesh> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_curve(&self) -> Option<&HostCurve> {
        match self {
            Self::NurbsCurve(curve) => Some(curve),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_numeric3(&self) -> Option<DVec3> {
        match self {
            Self::Numeric3(v) => Some(*v),
            _ => None,
        }
    }
}
