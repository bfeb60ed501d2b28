//! Scene description abstraction
//!
//! Read-only access to a hierarchical, time-sampled scene:
//! - ScenePath / PathResolver: location paths and root-relative names
//! - SceneInterface: the reader trait adapters are written against
//! - SceneObject: the closed set of location payloads
//! - AttributeValue: dynamically typed custom attributes
//! - Bound: double precision bounding boxes
//! - MemoryScene: an in-memory reader

pub mod attribute;
pub mod bound;
pub mod interface;
pub mod memory;
pub mod object;
pub mod path;

pub use attribute::{
    AttributeValue, LINK_FILE_NAME_ATTRIBUTE, LINK_ROOT_ATTRIBUTE, LINK_TIME_ATTRIBUTE,
    VISIBILITY_ATTRIBUTE,
};
pub use bound::Bound;
pub use interface::{MissingBehaviour, SceneHandle, SceneInterface, TagFilter, resolve};
pub use memory::{LocationKey, MemoryScene, MemorySceneBuilder};
pub use object::{
    CoordinateSystem, CurveBasis, CurvesPrimitive, MeshPrimitive, ObjectKind, PointsPrimitive,
    SceneObject,
};
pub use path::{PathResolver, ScenePath};
