//! Converter registry keyed by payload kind.

use rustc_hash::FxHashMap;

use crate::convert::converters::{CurvesConverter, MeshConverter};
use crate::convert::host::HostObject;
use crate::convert::parameters::Parameters;
use crate::errors::{Result, SceneShapeError};
use crate::scene::{ObjectKind, SceneObject};

/// Converts a payload into its host representation.
///
/// A fresh converter is created per query, so parameter overrides never
/// leak between queries.
pub trait ToHostConverter: Send {
    fn parameters(&self) -> &Parameters;

    fn parameters_mut(&mut self) -> &mut Parameters;

    fn convert(&self, object: &SceneObject) -> Result<HostObject>;
}

type ConverterFactory = Box<dyn Fn() -> Box<dyn ToHostConverter> + Send + Sync>;

pub struct ConverterRegistry {
    factories: FxHashMap<ObjectKind, ConverterFactory>,
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ConverterRegistry {
    /// A registry with no converters.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// The built-in mesh and curves converters.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(ObjectKind::Mesh, || Box::new(MeshConverter::default()));
        registry.register(ObjectKind::Curves, || Box::new(CurvesConverter::default()));
        registry
    }

    /// Registers `factory` for `kind`, replacing any previous one.
    pub fn register<F>(&mut self, kind: ObjectKind, factory: F)
    where
        F: Fn() -> Box<dyn ToHostConverter> + Send + Sync + 'static,
    {
        self.factories.insert(kind, Box::new(factory));
    }

    #[must_use]
    pub fn contains(&self, kind: ObjectKind) -> bool {
        self.factories.contains_key(&kind)
    }

    pub fn create(&self, kind: ObjectKind) -> Result<Box<dyn ToHostConverter>> {
        self.factories
            .get(&kind)
            .map(|factory| factory())
            .ok_or(SceneShapeError::NoConverter(kind.type_name()))
    }
}
