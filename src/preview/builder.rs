//! Builds the preview graph from a scene.
//!
//! Each visited location becomes a named group (carrying the location's
//! local transform) wrapping an unnamed content group. The content group
//! holds the payload, the bound wireframe and the child locations.
//!
//! Failures below the root are logged and the offending location is left
//! out; they never abort the build.

use std::sync::Arc;

use glam::Mat4;

use crate::errors::Result;
use crate::preview::graph::PreviewScene;
use crate::preview::instancing::{ContentHash, InstanceRegistry, LinkStatus, create_instances};
use crate::preview::primitive::Primitive;
use crate::preview::renderer::{
    AttributeBlock, GL_LINE_WIDTH_ATTRIBUTE, NAME_ATTRIBUTE, Renderable, Renderer,
    SceneGraphRenderer, USE_GL_LINES_ATTRIBUTE,
};
use crate::preview::selection::SelectionIndex;
use crate::scene::{
    AttributeValue, CurvesPrimitive, MissingBehaviour, PathResolver, SceneHandle, SceneInterface,
    SceneObject, TagFilter, VISIBILITY_ATTRIBUTE,
};
use crate::utils::ObjectPool;

/// What a preview build draws.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub draw_bounds: bool,
    pub draw_geometry: bool,
    /// Draw the root location only.
    pub object_only: bool,
    /// Locations must carry one of these tags (locally, on a descendant or
    /// on an ancestor). Empty draws everything.
    pub tags: Vec<String>,
    /// Applied once above the root location.
    pub root_transform: Mat4,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            draw_bounds: true,
            draw_geometry: true,
            object_only: false,
            tags: Vec::new(),
            root_transform: Mat4::IDENTITY,
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn draws_anything(&self) -> bool {
        self.draw_bounds || self.draw_geometry
    }
}

/// Counters gathered during one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub locations: usize,
    pub pruned: usize,
    pub failures: usize,
    pub instances: usize,
}

/// One generation of the preview: the graph and its selection index.
#[derive(Debug, Clone, Default)]
pub struct PreviewBuild {
    pub scene: PreviewScene,
    pub selection: SelectionIndex,
    pub stats: BuildStats,
}

pub struct PreviewSceneBuilder<'a> {
    resolver: PathResolver,
    options: &'a BuildOptions,
    time: f64,
    pool: &'a ObjectPool,
    instances: InstanceRegistry,
    stats: BuildStats,
}

impl<'a> PreviewSceneBuilder<'a> {
    #[must_use]
    pub fn new(options: &'a BuildOptions, time: f64, pool: &'a ObjectPool) -> Self {
        Self {
            resolver: PathResolver::default(),
            options,
            time,
            pool,
            instances: InstanceRegistry::new(),
            stats: BuildStats::default(),
        }
    }

    /// Builds the preview below `root`.
    ///
    /// Only a failure to read the root itself is returned; everything below
    /// it is best effort.
    pub fn build(mut self, root: &SceneHandle) -> Result<PreviewBuild> {
        if !self.options.draws_anything() {
            log::debug!("Neither geometry nor bounds requested, preview left empty");
            return Ok(PreviewBuild::default());
        }
        self.resolver = PathResolver::new(root.path());

        let mut renderer = SceneGraphRenderer::new();
        renderer.concat_transform(self.options.root_transform);
        self.visit(&mut renderer, root.as_ref(), true)?;

        let mut scene = renderer.finish();
        let mut selection = SelectionIndex::build(&scene);
        let pending = std::mem::take(&mut self.instances).into_pending();
        self.stats.instances = create_instances(&mut scene, &mut selection, pending);

        log::debug!(
            "Preview built: {} locations, {} pruned, {} failed, {} instanced, {} groups",
            self.stats.locations,
            self.stats.pruned,
            self.stats.failures,
            self.stats.instances,
            scene.group_count()
        );
        Ok(PreviewBuild {
            scene,
            selection,
            stats: self.stats,
        })
    }

    fn visit(
        &mut self,
        renderer: &mut dyn Renderer,
        location: &dyn SceneInterface,
        is_root: bool,
    ) -> Result<()> {
        // 1. Tag filter
        if !self.options.tags.is_empty()
            && !self
                .options
                .tags
                .iter()
                .any(|tag| location.has_tag(tag, TagFilter::EVERY))
        {
            self.stats.pruned += 1;
            return Ok(());
        }

        // 2. Visibility
        if location.has_attribute(VISIBILITY_ATTRIBUTE)
            && location
                .read_attribute(VISIBILITY_ATTRIBUTE, self.time)?
                .and_then(|value| value.as_bool())
                == Some(false)
        {
            self.stats.pruned += 1;
            return Ok(());
        }

        // 3. Named group
        let name = self.resolver.relative_name(&location.path())?;
        let local = if is_root {
            None
        } else {
            Some(location.read_transform_as_matrix(self.time)?.as_mat4())
        };
        let mut named = AttributeBlock::new(renderer);
        named.set_attribute(NAME_ATTRIBUTE, AttributeValue::String(name.clone()));
        named.set_attribute(USE_GL_LINES_ATTRIBUTE, AttributeValue::Bool(true));
        if let Some(local) = local {
            named.concat_transform(local);
        }
        let mut content = AttributeBlock::new(&mut *named);
        self.stats.locations += 1;

        // 4. Linked content
        if ContentHash::is_link(location) {
            let hash = ContentHash::of(location, self.time)?;
            if let LinkStatus::Instance(canonical) = self.instances.register(hash, &name) {
                log::trace!("'{name}' instances '{canonical}'");
                return Ok(());
            }
        }

        // 5. Payload
        if self.options.draw_geometry && location.has_object() {
            match self.pool.read_object(location, self.time) {
                Ok(Some(object)) => draw_object(&mut *content, &object),
                Ok(None) => {}
                Err(err) => {
                    log::warn!("Failed to read object at '{name}': {err}");
                    self.stats.failures += 1;
                }
            }
        }

        // 6. Bound
        if self.options.draw_bounds && !is_root {
            match location.read_bound(self.time) {
                Ok(bound) if !bound.is_empty() => content.render(Arc::new(Primitive::Curves(
                    CurvesPrimitive::wire_box(&bound),
                ))),
                Ok(_) => {}
                Err(err) => {
                    log::warn!("Failed to read bound at '{name}': {err}");
                    self.stats.failures += 1;
                }
            }
        }

        // 7. Children
        if !self.options.object_only {
            for child_name in location.child_names() {
                let child = match location.child(&child_name, MissingBehaviour::NullIfMissing) {
                    Ok(Some(child)) => child,
                    Ok(None) => continue,
                    Err(err) => {
                        log::warn!("Failed to open '{child_name}' under '{name}': {err}");
                        self.stats.failures += 1;
                        continue;
                    }
                };
                if let Err(err) = self.visit(&mut *content, child.as_ref(), false) {
                    log::warn!("Skipping '{}': {err}", child.path());
                    self.stats.failures += 1;
                }
            }
        }

        Ok(())
    }
}

/// Coordinate systems are drawn as axes in their own unnamed block so they
/// keep the enclosing name state.
fn draw_object(renderer: &mut dyn Renderer, object: &SceneObject) {
    if let SceneObject::CoordinateSystem(_) = object {
        let mut block = AttributeBlock::new(renderer);
        block.set_attribute(USE_GL_LINES_ATTRIBUTE, AttributeValue::Bool(true));
        block.set_attribute(GL_LINE_WIDTH_ATTRIBUTE, AttributeValue::Float(2.0));
        block.render(Arc::new(Primitive::Curves(CurvesPrimitive::axes())));
    } else {
        object.render(renderer);
    }
}
