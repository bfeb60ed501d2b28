//! Preview scene graph
//!
//! The drawable representation of a scene and how it is produced:
//! - PreviewScene: arena of groups with shared primitive leaves
//! - Renderer / SceneGraphRenderer: block-structured recording interface
//! - PreviewSceneBuilder: scene walk with tag, visibility and link handling
//! - instancing: content-hash deduplication of linked sub-scenes
//! - SelectionIndex: name <-> index mapping for picking

pub mod builder;
pub mod graph;
pub mod instancing;
pub mod primitive;
pub mod renderer;
pub mod selection;

pub use builder::{BuildOptions, BuildStats, PreviewBuild, PreviewSceneBuilder};
pub use graph::{Group, GroupKey, GroupState, PreviewChild, PreviewScene, UNNAMED};
pub use instancing::{ContentHash, InstanceRegistry, LinkStatus, PendingInstance, create_instances};
pub use primitive::Primitive;
pub use renderer::{AttributeBlock, Renderable, Renderer, SceneGraphRenderer};
pub use selection::SelectionIndex;
