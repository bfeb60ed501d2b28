//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`SceneShapeError`] covers the failure modes of the
//! scene-shape adapter, grouped the way callers are expected to react:
//! - call-level failures (the scene source cannot be resolved at all)
//! - query-local failures (a requested location, attribute or conversion
//!   failed; sibling queries are still attempted)
//! - reader-side failures reported by a [`SceneInterface`] implementation
//!
//! Missing-but-tolerable data (an absent payload, an absent optional child)
//! is never an error: it is represented by `Option::None`.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, SceneShapeError>`.
//!
//! ```rust,ignore
//! use scene_shape::errors::{SceneShapeError, Result};
//!
//! fn query() -> Result<()> {
//!     Ok(())
//! }
//! ```
//!
//! [`SceneInterface`]: crate::scene::SceneInterface

use thiserror::Error;

/// The main error type for the scene-shape adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneShapeError {
    // ========================================================================
    // Call-level Errors
    // ========================================================================
    /// No scene source is attached to the adapter, or it failed to open.
    #[error("Scene source is unavailable")]
    SceneUnavailable,

    /// A path does not live under the adapter's root.
    #[error("Path '{path}' is not under the shape root '{root}'")]
    PathOutsideRoot {
        /// The offending absolute path
        path: String,
        /// The adapter root
        root: String,
    },

    // ========================================================================
    // Query-local Errors
    // ========================================================================
    /// The queried location does not exist.
    #[error("Queried location '{0}' does not exist")]
    LocationNotFound(String),

    /// The queried attribute does not exist at the location.
    #[error("Queried attribute '{name}' does not exist at '{path}'")]
    AttributeNotFound {
        /// Location path
        path: String,
        /// Attribute name
        name: String,
    },

    /// The attribute exists but its type has no host representation.
    #[error("Cannot convert attribute '{name}' of type {type_name} to a host value")]
    UnsupportedAttributeType {
        /// Attribute name
        name: String,
        /// Name of the stored type
        type_name: &'static str,
    },

    /// No converter is registered for the payload kind.
    #[error("No host converter registered for {0} objects")]
    NoConverter(&'static str),

    /// A converter ran but could not produce a host object.
    #[error("Conversion of {type_name} failed: {reason}")]
    ConversionFailed {
        /// Payload kind
        type_name: &'static str,
        /// Converter-provided reason
        reason: String,
    },

    // ========================================================================
    // Parameter Parsing Errors
    // ========================================================================
    /// The parameter text named a parameter the converter does not have.
    #[error("Unknown conversion parameter '{0}'")]
    UnknownParameter(String),

    /// A parameter value could not be parsed into its declared type.
    #[error("Invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Raw text value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    // ========================================================================
    // Reader Errors
    // ========================================================================
    /// Failure reported by the scene reader itself.
    #[error("Scene read error at '{path}': {message}")]
    SceneRead {
        /// Location path
        path: String,
        /// Reader message
        message: String,
    },
}

impl SceneShapeError {
    /// Returns `true` for failures that abort a whole materialize/build call
    /// rather than a single query slot.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SceneUnavailable | Self::PathOutsideRoot { .. })
    }
}

/// Alias for `Result<T, SceneShapeError>`.
pub type Result<T> = std::result::Result<T, SceneShapeError>;
