//! On-demand conversion of payloads and attributes into host data.

use crate::convert::{ConverterRegistry, HostObject, HostValue, ParameterParser};
use crate::errors::{Result, SceneShapeError};
use crate::scene::{AttributeValue, SceneHandle, SceneInterface, SceneObject};
use crate::shape::settings::QuerySpace;
use crate::shape::transform::world_transform;
use crate::utils::ObjectPool;

/// Converts location payloads through a [`ConverterRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct ObjectMaterializer<'a> {
    registry: &'a ConverterRegistry,
    parser: ParameterParser,
    pool: &'a ObjectPool,
}

impl<'a> ObjectMaterializer<'a> {
    #[must_use]
    pub fn new(registry: &'a ConverterRegistry, parser: ParameterParser, pool: &'a ObjectPool) -> Self {
        Self {
            registry,
            parser,
            pool,
        }
    }

    /// Reads and converts the payload at `location`.
    ///
    /// Returns `Ok(None)` when the location has no payload. In
    /// [`QuerySpace::World`] the payload is first moved by the location's
    /// world transform below `root`. `parameters` holds `name value` pairs
    /// applied to a fresh converter.
    pub fn materialize(
        &self,
        root: &SceneHandle,
        location: &dyn SceneInterface,
        time: f64,
        space: QuerySpace,
        parameters: &str,
    ) -> Result<Option<HostObject>> {
        let Some(object) = self.pool.read_object(location, time)? else {
            return Ok(None);
        };
        let object = match space {
            QuerySpace::Local => (*object).clone(),
            QuerySpace::World => {
                let matrix = world_transform(root, &location.path(), time)?;
                object.transformed(&matrix)
            }
        };

        if let SceneObject::CoordinateSystem(cs) = &object {
            return Ok(Some(HostObject::Numeric3(cs.matrix().w_axis.truncate())));
        }

        let mut converter = self.registry.create(object.kind())?;
        self.parser.parse(parameters, converter.parameters_mut())?;
        converter.convert(&object).map(Some)
    }
}

/// Reads attribute `name` at `location` as a host value.
///
/// Single and double precision matrices both become [`HostValue::Matrix`].
pub fn materialize_attribute(
    location: &dyn SceneInterface,
    name: &str,
    time: f64,
) -> Result<HostValue> {
    let not_found = || SceneShapeError::AttributeNotFound {
        path: location.path().to_string(),
        name: name.to_owned(),
    };
    if !location.has_attribute(name) {
        return Err(not_found());
    }
    let value = location.read_attribute(name, time)?.ok_or_else(not_found)?;
    Ok(match value {
        AttributeValue::Bool(v) => HostValue::Bool(v),
        AttributeValue::Short(v) => HostValue::Short(v),
        AttributeValue::Int(v) => HostValue::Int(v),
        AttributeValue::Int64(v) => HostValue::Int64(v),
        AttributeValue::Float(v) => HostValue::Float(v),
        AttributeValue::Double(v) => HostValue::Double(v),
        AttributeValue::String(v) => HostValue::String(v),
        AttributeValue::M44f(m) => HostValue::Matrix(m.as_dmat4()),
        AttributeValue::M44d(m) => HostValue::Matrix(m),
        other => {
            return Err(SceneShapeError::UnsupportedAttributeType {
                name: name.to_owned(),
                type_name: other.type_name(),
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use glam::{DMat4, DVec3, Mat4, Vec3};

    use super::*;
    use crate::scene::{
        CoordinateSystem, MemorySceneBuilder, MeshPrimitive, MissingBehaviour, PointsPrimitive,
    };

    fn scene() -> SceneHandle {
        let mut builder = MemorySceneBuilder::new();
        let group = builder.location("/group");
        builder.set_transform(group, 0.0, DMat4::from_translation(DVec3::new(0.0, 5.0, 0.0)));
        let frame = builder.location("/group/frame");
        builder
            .set_transform(frame, 0.0, DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0)))
            .set_object(
                frame,
                0.0,
                SceneObject::CoordinateSystem(
                    CoordinateSystem::new("frame")
                        .with_transform(DMat4::from_translation(DVec3::new(0.0, 0.0, 2.0))),
                ),
            );
        let mesh = builder.location("/group/mesh");
        builder
            .set_object(mesh, 0.0, SceneObject::Mesh(MeshPrimitive::plane(2.0)))
            .set_attribute(mesh, "user:flag", 0.0, true)
            .set_attribute(mesh, "user:m44f", 0.0, AttributeValue::M44f(Mat4::from_scale(Vec3::splat(2.0))))
            .set_attribute(mesh, "user:v3f", 0.0, AttributeValue::V3f(Vec3::ONE));
        let points = builder.location("/group/points");
        builder.set_object(points, 0.0, SceneObject::Points(PointsPrimitive::new(vec![Vec3::ZERO])));
        builder.location("/group/empty");
        builder.build().handle()
    }

    fn at(root: &SceneHandle, path: &str) -> SceneHandle {
        crate::scene::resolve(root, &path.into(), MissingBehaviour::ThrowIfMissing)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn coordinate_system_yields_translation() {
        let root = scene();
        let registry = ConverterRegistry::default();
        let pool = ObjectPool::default();
        let objects = ObjectMaterializer::new(&registry, ParameterParser::default(), &pool);
        let frame = at(&root, "/group/frame");

        let world = objects
            .materialize(&root, frame.as_ref(), 0.0, QuerySpace::World, "")
            .unwrap()
            .unwrap();
        assert_eq!(world.as_numeric3(), Some(DVec3::new(1.0, 5.0, 2.0)));

        let local = objects
            .materialize(&root, frame.as_ref(), 0.0, QuerySpace::Local, "")
            .unwrap()
            .unwrap();
        assert_eq!(local.as_numeric3(), Some(DVec3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn mesh_in_world_space_is_moved() {
        let root = scene();
        let registry = ConverterRegistry::default();
        let pool = ObjectPool::default();
        let objects = ObjectMaterializer::new(&registry, ParameterParser::default(), &pool);
        let mesh = at(&root, "/group/mesh");

        let host = objects
            .materialize(&root, mesh.as_ref(), 0.0, QuerySpace::World, "-normals false")
            .unwrap()
            .unwrap();
        let host = host.as_mesh().unwrap();
        assert!(host.points.iter().all(|p| (p.y - 5.0).abs() <= 1.0));
        assert!(host.face_vertex_normals.is_none());
    }

    #[test]
    fn missing_payload_and_missing_converter() {
        let root = scene();
        let registry = ConverterRegistry::default();
        let pool = ObjectPool::default();
        let objects = ObjectMaterializer::new(&registry, ParameterParser::default(), &pool);

        let empty = at(&root, "/group/empty");
        assert!(
            objects
                .materialize(&root, empty.as_ref(), 0.0, QuerySpace::World, "")
                .unwrap()
                .is_none()
        );

        let points = at(&root, "/group/points");
        let err = objects
            .materialize(&root, points.as_ref(), 0.0, QuerySpace::Local, "")
            .unwrap_err();
        assert_eq!(err, SceneShapeError::NoConverter("PointsPrimitive"));
    }

    #[test]
    fn attribute_types() {
        let root = scene();
        let mesh = at(&root, "/group/mesh");

        assert_eq!(
            materialize_attribute(mesh.as_ref(), "user:flag", 0.0).unwrap(),
            HostValue::Bool(true)
        );
        let matrix = materialize_attribute(mesh.as_ref(), "user:m44f", 0.0).unwrap();
        assert_eq!(matrix.as_matrix(), Some(&DMat4::from_scale(DVec3::splat(2.0))));

        assert!(matches!(
            materialize_attribute(mesh.as_ref(), "user:v3f", 0.0),
            Err(SceneShapeError::UnsupportedAttributeType { type_name: "V3fData", .. })
        ));
        assert!(matches!(
            materialize_attribute(mesh.as_ref(), "user:none", 0.0),
            Err(SceneShapeError::AttributeNotFound { .. })
        ));
    }
}
