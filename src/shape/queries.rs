//! Batch evaluation of location queries.
//!
//! A query names a location (relative to the adapter root), a list of
//! attributes and conversion parameters. Each query fills its own
//! [`QueryOutput`]; a failing query records the problem and leaves its
//! slots empty without affecting its siblings.

use glam::DVec3;

use crate::convert::{HostObject, HostValue};
use crate::errors::{Result, SceneShapeError};
use crate::scene::{Bound, MissingBehaviour, PathResolver, SceneHandle, resolve};
use crate::shape::materialize::{ObjectMaterializer, materialize_attribute};
use crate::shape::settings::QuerySpace;
use crate::shape::transform::{TransformComponents, world_transform};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneQuery {
    /// Root-relative location name, e.g. `"/tree/leaf"`.
    pub path: String,
    pub attributes: Vec<String>,
    /// `name value` pairs for the payload converter.
    pub convert_parameters: String,
}

impl SceneQuery {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_convert_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.convert_parameters = parameters.into();
        self
    }
}

/// A bound reported as corners and centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundComponents {
    pub min: DVec3,
    pub max: DVec3,
    pub center: DVec3,
}

impl From<Bound> for BoundComponents {
    fn from(bound: Bound) -> Self {
        Self {
            min: bound.min,
            max: bound.max,
            center: bound.center(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub object: Option<HostObject>,
    pub transform: Option<TransformComponents>,
    pub bound: Option<BoundComponents>,
    /// One slot per requested attribute, in request order.
    pub attributes: Vec<Option<HostValue>>,
    /// Query-local failures, in the order they occurred.
    pub issues: Vec<SceneShapeError>,
}

impl QueryOutput {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    fn record<T>(&mut self, query: &SceneQuery, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Query '{}': {err}", query.path);
                self.issues.push(err);
                None
            }
        }
    }
}

/// Everything a batch needs from the adapter.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub root: &'a SceneHandle,
    pub resolver: &'a PathResolver,
    pub time: f64,
    pub space: QuerySpace,
    pub objects: ObjectMaterializer<'a>,
}

impl QueryContext<'_> {
    /// Evaluates `queries` in order.
    #[must_use]
    pub fn evaluate(&self, queries: &[SceneQuery]) -> Vec<QueryOutput> {
        queries.iter().map(|query| self.evaluate_one(query)).collect()
    }

    fn evaluate_one(&self, query: &SceneQuery) -> QueryOutput {
        let mut output = QueryOutput {
            attributes: vec![None; query.attributes.len()],
            ..Default::default()
        };
        let path = self.resolver.full_path(&query.path);
        let location = match resolve(self.root, &path, MissingBehaviour::NullIfMissing) {
            Ok(Some(location)) => location,
            Ok(None) => {
                output.record::<()>(query, Err(SceneShapeError::LocationNotFound(path.to_string())));
                return output;
            }
            Err(err) => {
                output.record::<()>(query, Err(err));
                return output;
            }
        };

        let world = match self.space {
            QuerySpace::World => output.record(query, world_transform(self.root, &path, self.time)),
            QuerySpace::Local => None,
        };

        let reported = match self.space {
            QuerySpace::World => world,
            QuerySpace::Local => output.record(query, location.read_transform_as_matrix(self.time)),
        };
        output.transform = reported.as_ref().map(TransformComponents::from_matrix);

        if let Some(bound) = output.record(query, location.read_bound(self.time)) {
            output.bound = match self.space {
                QuerySpace::Local => Some(bound.into()),
                QuerySpace::World => world.map(|m| bound.transform(&m).into()),
            };
        }

        output.object = output
            .record(
                query,
                self.objects.materialize(
                    self.root,
                    location.as_ref(),
                    self.time,
                    self.space,
                    &query.convert_parameters,
                ),
            )
            .flatten();

        for (slot, name) in query.attributes.iter().enumerate() {
            let value = output.record(query, materialize_attribute(location.as_ref(), name, self.time));
            output.attributes[slot] = value;
        }
        output
    }
}
