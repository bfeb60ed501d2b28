//! Built-in payload converters.

use glam::DVec3;

use crate::convert::host::{CurveForm, HostCurve, HostMesh, HostObject};
use crate::convert::parameters::{ParameterValue, Parameters};
use crate::convert::registry::ToHostConverter;
use crate::errors::{Result, SceneShapeError};
use crate::scene::{CurveBasis, CurvesPrimitive, MeshPrimitive, SceneObject};

fn wrong_kind(expected: &'static str, object: &SceneObject) -> SceneShapeError {
    SceneShapeError::ConversionFailed {
        type_name: expected,
        reason: format!("received a {}", object.type_name()),
    }
}

// ============================================================================
// Mesh
// ============================================================================

/// Converts [`MeshPrimitive`] payloads into [`HostMesh`].
///
/// | Parameter | Type   | Default | Meaning                                  |
/// |-----------|--------|---------|------------------------------------------|
/// | `normals` | bool   | `true`  | Copy authored normals as face-vertex data |
/// | `uvSet`   | string | `map1`  | Name of the host UV set                  |
#[derive(Debug, Clone)]
pub struct MeshConverter {
    parameters: Parameters,
}

impl Default for MeshConverter {
    fn default() -> Self {
        Self {
            parameters: Parameters::new()
                .with("normals", ParameterValue::Bool(true))
                .with("uvSet", ParameterValue::String("map1".to_owned())),
        }
    }
}

impl MeshConverter {
    fn convert_mesh(&self, mesh: &MeshPrimitive) -> Result<HostMesh> {
        let fail = |reason: String| SceneShapeError::ConversionFailed {
            type_name: "MeshPrimitive",
            reason,
        };
        let expected: usize = mesh.verts_per_face.iter().map(|&n| n as usize).sum();
        if expected != mesh.vertex_ids.len() {
            return Err(fail(format!(
                "faces reference {expected} vertices but {} ids are present",
                mesh.vertex_ids.len()
            )));
        }
        if let Some(bad) = mesh
            .vertex_ids
            .iter()
            .find(|&&id| id as usize >= mesh.positions.len())
        {
            return Err(fail(format!(
                "vertex id {bad} out of range ({} points)",
                mesh.positions.len()
            )));
        }

        let face_vertex_normals = if self.parameters.bool("normals").unwrap_or(true) {
            mesh.normals.as_ref().and_then(|normals| {
                if normals.len() == mesh.positions.len() {
                    Some(
                        mesh.vertex_ids
                            .iter()
                            .map(|&id| normals[id as usize])
                            .collect(),
                    )
                } else if normals.len() == mesh.vertex_ids.len() {
                    Some(normals.clone())
                } else {
                    log::warn!(
                        "Ignoring {} normals on a mesh with {} points",
                        normals.len(),
                        mesh.positions.len()
                    );
                    None
                }
            })
        } else {
            None
        };

        Ok(HostMesh {
            polygon_counts: mesh.verts_per_face.clone(),
            polygon_connects: mesh.vertex_ids.clone(),
            points: mesh.positions.clone(),
            face_vertex_normals,
            uv_set: self.parameters.string("uvSet").unwrap_or("map1").to_owned(),
        })
    }
}

impl ToHostConverter for MeshConverter {
    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    fn convert(&self, object: &SceneObject) -> Result<HostObject> {
        match object {
            SceneObject::Mesh(mesh) => self.convert_mesh(mesh).map(HostObject::Mesh),
            other => Err(wrong_kind("MeshPrimitive", other)),
        }
    }
}

// ============================================================================
// Curves
// ============================================================================

/// Converts one curve of a [`CurvesPrimitive`] into a [`HostCurve`].
///
/// The `index` parameter (int, default `0`) selects the curve.
#[derive(Debug, Clone)]
pub struct CurvesConverter {
    parameters: Parameters,
}

impl Default for CurvesConverter {
    fn default() -> Self {
        Self {
            parameters: Parameters::new().with("index", ParameterValue::Int(0)),
        }
    }
}

impl CurvesConverter {
    fn convert_curve(&self, curves: &CurvesPrimitive) -> Result<HostCurve> {
        let fail = |reason: String| SceneShapeError::ConversionFailed {
            type_name: "CurvesPrimitive",
            reason,
        };
        let index = self.parameters.int("index").unwrap_or(0);
        let points = usize::try_from(index)
            .ok()
            .and_then(|i| curves.curve_points(i))
            .ok_or_else(|| {
                fail(format!(
                    "curve index {index} out of range ({} curves)",
                    curves.num_curves()
                ))
            })?;

        let degree: u32 = match curves.basis {
            CurveBasis::Linear => 1,
            CurveBasis::Bezier | CurveBasis::BSpline | CurveBasis::CatmullRom => 3,
        };
        let d = degree as usize;
        if points.len() <= d {
            return Err(fail(format!(
                "{} control points are too few for degree {degree}",
                points.len()
            )));
        }

        let mut cvs: Vec<DVec3> = points.iter().map(|p| p.as_dvec3()).collect();
        let (form, knots) = if curves.periodic {
            cvs.extend_from_within(..d);
            // Uniform knots shifted so the wrapped spans overlap.
            let count = cvs.len() + d - 1;
            let knots = (0..count).map(|k| k as f64 - (d as f64 - 1.0)).collect();
            (CurveForm::Periodic, knots)
        } else {
            // Open uniform: `degree` repeated end knots.
            let spans = cvs.len() - d;
            let mut knots = Vec::with_capacity(cvs.len() + d - 1);
            knots.extend(std::iter::repeat_n(0.0, d));
            knots.extend((1..spans).map(|k| k as f64));
            knots.extend(std::iter::repeat_n(spans as f64, d));
            (CurveForm::Open, knots)
        };

        Ok(HostCurve {
            degree,
            form,
            cvs,
            knots,
        })
    }
}

impl ToHostConverter for CurvesConverter {
    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    fn convert(&self, object: &SceneObject) -> Result<HostObject> {
        match object {
            SceneObject::Curves(curves) => self.convert_curve(curves).map(HostObject::NurbsCurve),
            other => Err(wrong_kind("CurvesPrimitive", other)),
        }
    }
}
