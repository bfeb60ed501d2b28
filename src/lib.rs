#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::float_cmp)]

//! Scene-shape adapter
//!
//! Exposes a lazily read, time-sampled hierarchical scene to a host
//! application:
//! - on-demand conversion of payloads and attributes into host data
//! - a cached drawable preview graph, rebuilt only when stale
//! - instancing of linked sub-scenes that share content
//! - stable name <-> index mapping for picking
//!
//! ```rust,ignore
//! use scene_shape::{MemorySceneBuilder, SceneShape, ShapeSettings};
//!
//! let mut builder = MemorySceneBuilder::new();
//! builder.location("/tree/leaf");
//! let mut shape = SceneShape::with_scene(builder.build().handle())
//!     .with_settings(ShapeSettings { draw_geometry: true, ..Default::default() });
//! let names = shape.component_names()?;
//! ```

pub mod convert;
pub mod errors;
pub mod preview;
pub mod scene;
pub mod shape;
pub mod utils;

pub use convert::{ConverterRegistry, HostObject, HostValue, ToHostConverter};
pub use errors::{Result, SceneShapeError};
pub use preview::{BuildOptions, PreviewBuild, PreviewScene, PreviewSceneBuilder, SelectionIndex};
pub use scene::{
    AttributeValue, Bound, MemoryScene, MemorySceneBuilder, SceneHandle, SceneInterface,
    SceneObject, ScenePath,
};
pub use shape::{QuerySpace, SceneQuery, SceneShape, ShapeSettings};
pub use utils::{ObjectPool, default_pool};
