//! Drawable leaves of the preview graph.

use crate::scene::{Bound, CurvesPrimitive, MeshPrimitive, PointsPrimitive};

/// Immutable drawable geometry. Shared between groups through `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Mesh(MeshPrimitive),
    Curves(CurvesPrimitive),
    Points(PointsPrimitive),
}

impl Primitive {
    #[must_use]
    pub fn bound(&self) -> Bound {
        match self {
            Self::Mesh(mesh) => mesh.bound(),
            Self::Curves(curves) => curves.bound(),
            Self::Points(points) => points.bound(),
        }
    }

    #[must_use]
    pub fn as_curves(&self) -> Option<&CurvesPrimitive> {
        match self {
            Self::Curves(curves) => Some(curves),
            _ => None,
        }
    }
}
