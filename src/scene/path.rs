//! Hierarchical scene paths.
//!
//! A [`ScenePath`] is an ordered list of name segments. The string form is
//! slash-delimited, with the empty path rendering as `"/"`.
//!
//! [`PathResolver`] converts between absolute paths (from the true scene
//! root) and names relative to the root location an adapter was pointed at.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::errors::{Result, SceneShapeError};

/// Path separator used by the string representation.
pub const SEPARATOR: char = '/';

/// An ordered sequence of location names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenePath {
    segments: SmallVec<[String; 8]>,
}

impl ScenePath {
    /// The empty path, addressing the scene root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a slash-delimited string. Empty segments are skipped, so
    /// `"/a//b/"` and `"a/b"` both resolve to `[a, b]`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_segments(text.split(SEPARATOR).filter(|s| !s.is_empty()))
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Same as [`ScenePath::is_root`].
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the last segment, or `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Returns the parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.segments.push(name.into());
    }

    /// Returns a new path with `name` appended.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(name);
        path
    }

    /// Concatenates `other` onto this path.
    #[must_use]
    pub fn join(&self, other: &ScenePath) -> Self {
        let mut path = self.clone();
        path.segments.extend(other.segments.iter().cloned());
        path
    }

    /// Returns `true` if `prefix` is a (non-strict) leading subsequence.
    #[must_use]
    pub fn starts_with(&self, prefix: &ScenePath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Strips `prefix`, returning the remaining relative segments.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &ScenePath) -> Option<Self> {
        self.starts_with(prefix).then(|| {
            Self::from_segments(self.segments[prefix.segments.len()..].iter().cloned())
        })
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ScenePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for ScenePath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// Resolves names relative to an adapter's root location.
///
/// The root path is a prefix of every absolute path the resolver hands out,
/// and relative names are always rooted (`"/"` addresses the root itself).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    root: ScenePath,
}

impl PathResolver {
    #[must_use]
    pub fn new(root: ScenePath) -> Self {
        Self { root }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &ScenePath {
        &self.root
    }

    /// Converts an absolute path into its root-relative name.
    pub fn relative_name(&self, path: &ScenePath) -> Result<String> {
        self.relative_path(path).map(|relative| relative.to_string())
    }

    /// Converts an absolute path into a root-relative path.
    pub fn relative_path(&self, path: &ScenePath) -> Result<ScenePath> {
        path.strip_prefix(&self.root)
            .ok_or_else(|| SceneShapeError::PathOutsideRoot {
                path: path.to_string(),
                root: self.root.to_string(),
            })
    }

    /// Converts a root-relative name into an absolute path.
    #[must_use]
    pub fn full_path(&self, relative_name: &str) -> ScenePath {
        self.root.join(&ScenePath::parse(relative_name))
    }
}
