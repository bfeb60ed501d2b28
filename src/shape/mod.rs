//! Scene-shape adapter
//!
//! Host-facing layer over a scene:
//! - SceneShape: per-adapter state, cached preview, queries
//! - ShapeSettings: persistent configuration
//! - DirtyFlag: preview staleness
//! - world_transform / TransformComponents: transform accumulation
//! - ObjectMaterializer / materialize_attribute: host conversion
//! - SceneQuery / QueryOutput: batch evaluation

pub mod adapter;
pub mod dirty;
pub mod materialize;
pub mod queries;
pub mod settings;
pub mod transform;
pub mod visibility;

pub use adapter::SceneShape;
pub use dirty::{DirtyFlag, ShapeChange};
pub use materialize::{ObjectMaterializer, materialize_attribute};
pub use queries::{BoundComponents, QueryContext, QueryOutput, SceneQuery};
pub use settings::{DrawFlags, QuerySpace, ShapeSettings};
pub use transform::{TransformComponents, world_transform};
pub use visibility::is_visible;
