//! The scene-shape adapter.
//!
//! [`SceneShape`] exposes one root location of a scene to a host. It owns
//! the cached preview (graph plus selection index), the staleness flag and
//! the conversion machinery used by queries.
//!
//! # Lifecycle
//!
//! 1. Settings, time and scene edits go through setters that mark the
//!    preview stale when they affect it.
//! 2. The next preview request rebuilds the graph and the selection index
//!    in one piece and clears the flag.
//! 3. A failed rebuild keeps the previous cache and leaves the flag set.

use std::sync::Arc;

use crate::convert::{ConverterRegistry, HostObject, HostValue, ParameterParser};
use crate::errors::{Result, SceneShapeError};
use crate::preview::{BuildOptions, GroupKey, PreviewBuild, PreviewSceneBuilder};
use crate::scene::{
    Bound, MissingBehaviour, PathResolver, SceneHandle, ScenePath, TagFilter, resolve,
};
use crate::shape::dirty::{DirtyFlag, ShapeChange};
use crate::shape::materialize::{ObjectMaterializer, materialize_attribute};
use crate::shape::queries::{QueryContext, QueryOutput, SceneQuery};
use crate::shape::settings::{DrawFlags, QuerySpace, ShapeSettings};
use crate::shape::transform::world_transform;
use crate::shape::visibility::is_visible;
use crate::utils::{ObjectPool, default_pool};

pub struct SceneShape {
    scene: Option<SceneHandle>,
    resolver: PathResolver,
    settings: ShapeSettings,
    time: f64,
    dirty: DirtyFlag,
    preview: Option<PreviewBuild>,
    registry: ConverterRegistry,
    parser: ParameterParser,
    pool: Arc<ObjectPool>,
}

impl std::fmt::Debug for SceneShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneShape")
            .field("root", &self.resolver.root().to_string())
            .field("settings", &self.settings)
            .field("time", &self.time)
            .field("dirty", &self.dirty.is_dirty())
            .finish_non_exhaustive()
    }
}

impl Default for SceneShape {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneShape {
    /// An adapter with no scene attached, default settings and the
    /// process-wide object pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scene: None,
            resolver: PathResolver::default(),
            settings: ShapeSettings::default(),
            time: 0.0,
            dirty: DirtyFlag::new(),
            preview: None,
            registry: ConverterRegistry::default(),
            parser: ParameterParser::default(),
            pool: default_pool(),
        }
    }

    #[must_use]
    pub fn with_scene(scene: SceneHandle) -> Self {
        let mut shape = Self::new();
        shape.set_scene(Some(scene));
        shape
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ShapeSettings) -> Self {
        self.set_settings(settings);
        self
    }

    #[must_use]
    pub fn with_pool(mut self, pool: Arc<ObjectPool>) -> Self {
        self.pool = pool;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.registry = registry;
        self
    }

    // ========================================================================
    // Scene source
    // ========================================================================

    /// Attaches (or detaches) the root location. Always invalidates.
    pub fn set_scene(&mut self, scene: Option<SceneHandle>) {
        self.resolver = PathResolver::new(scene.as_ref().map(|s| s.path()).unwrap_or_default());
        self.scene = scene;
        self.dirty.notify(ShapeChange::SceneSource);
    }

    pub fn scene(&self) -> Result<&SceneHandle> {
        self.scene.as_ref().ok_or(SceneShapeError::SceneUnavailable)
    }

    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn relative_name(&self, path: &ScenePath) -> Result<String> {
        self.resolver.relative_name(path)
    }

    #[must_use]
    pub fn full_path(&self, relative_name: &str) -> ScenePath {
        self.resolver.full_path(relative_name)
    }

    // ========================================================================
    // Settings and time
    // ========================================================================

    #[must_use]
    pub fn settings(&self) -> &ShapeSettings {
        &self.settings
    }

    /// Replaces all settings, invalidating for each draw-affecting change.
    pub fn set_settings(&mut self, settings: ShapeSettings) {
        let changed = self.settings.draw_flags() ^ settings.draw_flags();
        if changed.contains(DrawFlags::GEOMETRY) {
            self.dirty.notify(ShapeChange::DrawGeometry);
        }
        if changed.contains(DrawFlags::CHILD_BOUNDS) {
            self.dirty.notify(ShapeChange::DrawBounds);
        }
        if changed.contains(DrawFlags::OBJECT_ONLY) {
            self.dirty.notify(ShapeChange::ObjectOnly);
        }
        if self.settings.draw_tags_filter != settings.draw_tags_filter {
            self.dirty.notify(ShapeChange::TagFilter);
        }
        self.settings = settings;
    }

    pub fn set_draw_geometry(&mut self, enabled: bool) {
        self.set_settings(ShapeSettings {
            draw_geometry: enabled,
            ..self.settings.clone()
        });
    }

    pub fn set_draw_child_bounds(&mut self, enabled: bool) {
        self.set_settings(ShapeSettings {
            draw_child_bounds: enabled,
            ..self.settings.clone()
        });
    }

    pub fn set_object_only(&mut self, enabled: bool) {
        self.set_settings(ShapeSettings {
            object_only: enabled,
            ..self.settings.clone()
        });
    }

    pub fn set_draw_tags_filter(&mut self, filter: &str) {
        self.set_settings(ShapeSettings {
            draw_tags_filter: filter.to_owned(),
            ..self.settings.clone()
        });
    }

    /// Query space only affects queries, never the preview.
    pub fn set_query_space(&mut self, space: QuerySpace) {
        self.settings.query_space = space;
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Moves the evaluation time. The preview only goes stale when the
    /// scene is animated.
    pub fn set_time(&mut self, time: f64) {
        if time == self.time {
            return;
        }
        self.time = time;
        let animated = self.scene.as_ref().is_some_and(|scene| scene.is_animated());
        self.dirty.notify(ShapeChange::Time { animated });
    }

    // ========================================================================
    // Preview
    // ========================================================================

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn mark_dirty(&mut self) {
        self.dirty.mark_dirty();
    }

    /// Number of successful preview builds.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.dirty.generation()
    }

    /// Drops unknown tags from the filter with a warning.
    fn build_options(&self, root: &SceneHandle) -> BuildOptions {
        let tags = self
            .settings
            .tags()
            .filter(|tag| {
                let known = root.has_tag(tag, TagFilter::EVERY);
                if !known {
                    log::warn!("Tag '{tag}' does not exist in scene, ignoring it for filtering");
                }
                known
            })
            .map(str::to_owned)
            .collect();
        BuildOptions {
            draw_bounds: self.settings.draw_child_bounds,
            draw_geometry: self.settings.draw_geometry,
            object_only: self.settings.object_only,
            tags,
            ..Default::default()
        }
    }

    /// The current preview, rebuilt first if stale.
    pub fn preview(&mut self) -> Result<&PreviewBuild> {
        if self.dirty.is_dirty() || self.preview.is_none() {
            self.rebuild()?;
        }
        self.preview.as_ref().ok_or(SceneShapeError::SceneUnavailable)
    }

    /// The last successfully built preview, without rebuilding.
    ///
    /// After a failed rebuild this is still the previous generation's
    /// graph, which hosts keep drawing until a rebuild succeeds.
    #[must_use]
    pub fn cached_preview(&self) -> Option<&PreviewBuild> {
        self.preview.as_ref()
    }

    fn rebuild(&mut self) -> Result<()> {
        let scene = match self.scene() {
            Ok(scene) => Arc::clone(scene),
            Err(err) => {
                log::error!("Cannot build preview: {err}");
                return Err(err);
            }
        };
        let options = self.build_options(&scene);
        match PreviewSceneBuilder::new(&options, self.time, &self.pool).build(&scene) {
            Ok(build) => {
                self.preview = Some(build);
                self.dirty.clear();
                Ok(())
            }
            Err(err) => {
                log::error!("Preview build of '{}' failed: {err}", scene.path());
                Err(err)
            }
        }
    }

    /// Selection index of `name` in the current generation.
    pub fn selection_index(&mut self, name: &str) -> Result<Option<usize>> {
        Ok(self.preview()?.selection.index_of(name))
    }

    /// Name behind selection `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a valid index of the current generation.
    pub fn selection_name(&mut self, index: usize) -> Result<String> {
        Ok(self.preview()?.selection.name(index).to_owned())
    }

    /// All selectable names, in index order.
    pub fn component_names(&mut self) -> Result<Vec<String>> {
        Ok(self.preview()?.selection.names().to_vec())
    }

    pub fn group(&mut self, name: &str) -> Result<Option<GroupKey>> {
        Ok(self.preview()?.selection.group(name))
    }

    // ========================================================================
    // Bounds
    // ========================================================================

    /// World bound of selection component `index`.
    ///
    /// Falls back to the unit box, with a warning, when the component's
    /// location can no longer be read.
    pub fn component_bound(&mut self, index: usize) -> Result<Bound> {
        let name = self.selection_name(index)?;
        let scene = Arc::clone(self.scene()?);
        let path = self.resolver.full_path(&name);
        let bound = resolve(&scene, &path, MissingBehaviour::NullIfMissing).and_then(|location| {
            let Some(location) = location else {
                return Err(SceneShapeError::LocationNotFound(path.to_string()));
            };
            let local = location.read_bound(self.time)?;
            Ok(local.transform(&world_transform(&scene, &path, self.time)?))
        });
        match bound {
            Ok(bound) => Ok(bound),
            Err(err) => {
                log::warn!("Bound of component {index} ('{name}') unavailable: {err}");
                Ok(Bound::UNIT)
            }
        }
    }

    /// Bound of the whole shape in the root's space.
    ///
    /// In object-only mode with a payload present, the payload's own bound
    /// is used. Empty or unreadable bounds become the unit box.
    #[must_use]
    pub fn bounding_box(&self) -> Bound {
        let Ok(scene) = self.scene() else {
            return Bound::UNIT;
        };
        let bound = if self.settings.object_only && scene.has_object() {
            self.pool
                .read_object(scene.as_ref(), self.time)
                .map(|object| object.map_or(Bound::EMPTY, |o| o.bound()))
        } else {
            scene.read_bound(self.time)
        };
        match bound {
            Ok(bound) if !bound.is_empty() => bound,
            Ok(_) => Bound::UNIT,
            Err(err) => {
                log::warn!("Shape bound unavailable: {err}");
                Bound::UNIT
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_location_visible(&self, relative_name: &str) -> Result<bool> {
        is_visible(self.scene()?, &self.resolver.full_path(relative_name), self.time)
    }

    fn objects(&self) -> ObjectMaterializer<'_> {
        ObjectMaterializer::new(&self.registry, self.parser, &self.pool)
    }

    /// Materializes the payload at `relative_name` in the configured space.
    pub fn materialize_object(
        &self,
        relative_name: &str,
        convert_parameters: &str,
    ) -> Result<Option<HostObject>> {
        let scene = self.scene()?;
        let path = self.resolver.full_path(relative_name);
        let location = resolve(scene, &path, MissingBehaviour::ThrowIfMissing)?
            .ok_or_else(|| SceneShapeError::LocationNotFound(path.to_string()))?;
        self.objects().materialize(
            scene,
            location.as_ref(),
            self.time,
            self.settings.query_space,
            convert_parameters,
        )
    }

    pub fn materialize_attribute(&self, relative_name: &str, attribute: &str) -> Result<HostValue> {
        let scene = self.scene()?;
        let path = self.resolver.full_path(relative_name);
        let location = resolve(scene, &path, MissingBehaviour::ThrowIfMissing)?
            .ok_or_else(|| SceneShapeError::LocationNotFound(path.to_string()))?;
        materialize_attribute(location.as_ref(), attribute, self.time).inspect_err(|err| {
            if let SceneShapeError::UnsupportedAttributeType { .. } = err {
                log::warn!("{err}");
            }
        })
    }

    /// Evaluates a batch of queries.
    ///
    /// Fails as a whole only when no scene is attached; every other
    /// problem is recorded in the affected [`QueryOutput`].
    pub fn evaluate(&self, queries: &[SceneQuery]) -> Result<Vec<QueryOutput>> {
        let scene = match self.scene() {
            Ok(scene) => scene,
            Err(err) => {
                log::error!("Cannot evaluate queries: {err}");
                return Err(err);
            }
        };
        let context = QueryContext {
            root: scene,
            resolver: &self.resolver,
            time: self.time,
            space: self.settings.query_space,
            objects: self.objects(),
        };
        Ok(context.evaluate(queries))
    }
}
