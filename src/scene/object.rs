//! Location payloads.
//!
//! A location carries at most one [`SceneObject`]. The set of payload kinds
//! is closed; every consumer switches on the enum once, at its boundary.

use std::fmt;

use glam::{DMat4, Vec3};

use crate::scene::bound::Bound;

/// Discriminant of a [`SceneObject`], used to key converter registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    CoordinateSystem,
    Mesh,
    Curves,
    Points,
}

impl ObjectKind {
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::CoordinateSystem => "CoordinateSystem",
            Self::Mesh => "MeshPrimitive",
            Self::Curves => "CurvesPrimitive",
            Self::Points => "PointsPrimitive",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A named coordinate frame. Hosts only ever see its translation.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub name: String,
    pub transform: Option<DMat4>,
}

impl CoordinateSystem {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: None,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: DMat4) -> Self {
        self.transform = Some(transform);
        self
    }

    /// The frame matrix; identity when none was authored.
    #[must_use]
    pub fn matrix(&self) -> DMat4 {
        self.transform.unwrap_or(DMat4::IDENTITY)
    }
}

/// Polygon mesh with per-vertex positions and optional normals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshPrimitive {
    pub verts_per_face: Vec<u32>,
    pub vertex_ids: Vec<u32>,
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
}

impl MeshPrimitive {
    #[must_use]
    pub fn new(verts_per_face: Vec<u32>, vertex_ids: Vec<u32>, positions: Vec<Vec3>) -> Self {
        Self {
            verts_per_face,
            vertex_ids,
            positions,
            normals: None,
        }
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// A single quad in the XY plane, centred on the origin.
    #[must_use]
    pub fn plane(size: f32) -> Self {
        let h = size * 0.5;
        Self::new(
            vec![4],
            vec![0, 1, 2, 3],
            vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
        )
        .with_normals(vec![Vec3::Z; 4])
    }

    #[inline]
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.verts_per_face.len()
    }

    #[must_use]
    pub fn bound(&self) -> Bound {
        Bound::from_points(&self.positions)
    }
}

/// Cubic basis used to interpret curve control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveBasis {
    #[default]
    Linear,
    Bezier,
    BSpline,
    CatmullRom,
}

/// A batch of curves sharing one basis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurvesPrimitive {
    pub verts_per_curve: Vec<u32>,
    pub basis: CurveBasis,
    pub periodic: bool,
    pub positions: Vec<Vec3>,
}

impl CurvesPrimitive {
    #[must_use]
    pub fn new(
        verts_per_curve: Vec<u32>,
        basis: CurveBasis,
        periodic: bool,
        positions: Vec<Vec3>,
    ) -> Self {
        Self {
            verts_per_curve,
            basis,
            periodic,
            positions,
        }
    }

    /// Unit-length X, Y and Z axis segments from the origin.
    #[must_use]
    pub fn axes() -> Self {
        Self::new(
            vec![2, 2, 2],
            CurveBasis::Linear,
            false,
            vec![
                Vec3::ZERO,
                Vec3::X,
                Vec3::ZERO,
                Vec3::Y,
                Vec3::ZERO,
                Vec3::Z,
            ],
        )
    }

    /// The twelve edges of `bound` as linear segments.
    #[must_use]
    pub fn wire_box(bound: &Bound) -> Self {
        let lo = bound.min.as_vec3();
        let hi = bound.max.as_vec3();
        let corner = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { hi.x } else { lo.x },
                if y { hi.y } else { lo.y },
                if z { hi.z } else { lo.z },
            )
        };
        let mut positions = Vec::with_capacity(24);
        for a in [false, true] {
            for b in [false, true] {
                positions.extend([corner(false, a, b), corner(true, a, b)]);
                positions.extend([corner(a, false, b), corner(a, true, b)]);
                positions.extend([corner(a, b, false), corner(a, b, true)]);
            }
        }
        Self::new(vec![2; 12], CurveBasis::Linear, false, positions)
    }

    #[inline]
    #[must_use]
    pub fn num_curves(&self) -> usize {
        self.verts_per_curve.len()
    }

    /// Control points of curve `index`, if it exists.
    #[must_use]
    pub fn curve_points(&self, index: usize) -> Option<&[Vec3]> {
        let count = *self.verts_per_curve.get(index)? as usize;
        let start: usize = self.verts_per_curve[..index]
            .iter()
            .map(|&n| n as usize)
            .sum();
        self.positions.get(start..start + count)
    }

    #[must_use]
    pub fn bound(&self) -> Bound {
        Bound::from_points(&self.positions)
    }
}

/// Unconnected points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointsPrimitive {
    pub positions: Vec<Vec3>,
}

impl PointsPrimitive {
    #[must_use]
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self { positions }
    }

    #[must_use]
    pub fn bound(&self) -> Bound {
        Bound::from_points(&self.positions)
    }
}

/// The payload a location may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    CoordinateSystem(CoordinateSystem),
    Mesh(MeshPrimitive),
    Curves(CurvesPrimitive),
    Points(PointsPrimitive),
}

impl SceneObject {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::CoordinateSystem(_) => ObjectKind::CoordinateSystem,
            Self::Mesh(_) => ObjectKind::Mesh,
            Self::Curves(_) => ObjectKind::Curves,
            Self::Points(_) => ObjectKind::Points,
        }
    }

    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Bound of the renderable content. Coordinate systems have none.
    #[must_use]
    pub fn bound(&self) -> Bound {
        match self {
            Self::CoordinateSystem(_) => Bound::EMPTY,
            Self::Mesh(mesh) => mesh.bound(),
            Self::Curves(curves) => curves.bound(),
            Self::Points(points) => points.bound(),
        }
    }

    /// Returns a copy with all spatial data moved by `matrix`.
    ///
    /// Positions are transformed as points, normals by the inverse
    /// transpose, and a coordinate system's frame is post-multiplied.
    #[must_use]
    pub fn transformed(&self, matrix: &DMat4) -> Self {
        let points = |src: &[Vec3]| -> Vec<Vec3> {
            src.iter()
                .map(|p| matrix.transform_point3(p.as_dvec3()).as_vec3())
                .collect()
        };
        match self {
            Self::CoordinateSystem(cs) => Self::CoordinateSystem(CoordinateSystem {
                name: cs.name.clone(),
                transform: Some(*matrix * cs.matrix()),
            }),
            Self::Mesh(mesh) => {
                let normal_matrix = matrix.inverse().transpose();
                Self::Mesh(MeshPrimitive {
                    verts_per_face: mesh.verts_per_face.clone(),
                    vertex_ids: mesh.vertex_ids.clone(),
                    positions: points(&mesh.positions),
                    normals: mesh.normals.as_ref().map(|normals| {
                        normals
                            .iter()
                            .map(|n| {
                                normal_matrix
                                    .transform_vector3(n.as_dvec3())
                                    .normalize_or_zero()
                                    .as_vec3()
                            })
                            .collect()
                    }),
                })
            }
            Self::Curves(curves) => Self::Curves(CurvesPrimitive {
                positions: points(&curves.positions),
                ..curves.clone()
            }),
            Self::Points(pts) => Self::Points(PointsPrimitive::new(points(&pts.positions))),
        }
    }

    /// Approximate heap footprint, used for cache accounting.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        let v3 = std::mem::size_of::<Vec3>();
        let base = std::mem::size_of::<Self>();
        base + match self {
            Self::CoordinateSystem(cs) => cs.name.len(),
            Self::Mesh(mesh) => {
                (mesh.verts_per_face.len() + mesh.vertex_ids.len()) * 4
                    + mesh.positions.len() * v3
                    + mesh.normals.as_ref().map_or(0, |n| n.len() * v3)
            }
            Self::Curves(curves) => curves.verts_per_curve.len() * 4 + curves.positions.len() * v3,
            Self::Points(pts) => pts.positions.len() * v3,
        }
    }
}
