//! Custom attribute values stored at scene locations.

use glam::{DMat4, Mat4, Vec3};
use xxhash_rust::xxh3::Xxh3;

/// Attribute holding the visibility of a location.
pub const VISIBILITY_ATTRIBUTE: &str = "scene:visible";

/// File name of the linked sub-scene at a link location.
pub const LINK_FILE_NAME_ATTRIBUTE: &str = "sceneInterface:link.fileName";
/// Root path inside the linked sub-scene.
pub const LINK_ROOT_ATTRIBUTE: &str = "sceneInterface:link.root";
/// Time remapping applied to the linked sub-scene.
pub const LINK_TIME_ATTRIBUTE: &str = "sceneInterface:link.time";

/// Dynamically typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Short(i16),
    Int(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    M44f(Mat4),
    M44d(DMat4),
    V3f(Vec3),
    IntVector(Vec<i32>),
    StringVector(Vec<String>),
}

impl AttributeValue {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "BoolData",
            Self::Short(_) => "ShortData",
            Self::Int(_) => "IntData",
            Self::Int64(_) => "Int64Data",
            Self::Float(_) => "FloatData",
            Self::Double(_) => "DoubleData",
            Self::String(_) => "StringData",
            Self::M44f(_) => "M44fData",
            Self::M44d(_) => "M44dData",
            Self::V3f(_) => "V3fData",
            Self::IntVector(_) => "IntVectorData",
            Self::StringVector(_) => "StringVectorData",
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Feeds the type name and the value's bytes into `hasher`.
    ///
    /// Values of different types never hash alike, even when their bytes
    /// match (`Int(1)` vs `Float` with the same bit pattern).
    pub fn hash_into(&self, hasher: &mut Xxh3) {
        hasher.update(self.type_name().as_bytes());
        match self {
            Self::Bool(v) => hasher.update(&[u8::from(*v)]),
            Self::Short(v) => hasher.update(&v.to_le_bytes()),
            Self::Int(v) => hasher.update(&v.to_le_bytes()),
            Self::Int64(v) => hasher.update(&v.to_le_bytes()),
            Self::Float(v) => hasher.update(&v.to_le_bytes()),
            Self::Double(v) => hasher.update(&v.to_le_bytes()),
            Self::String(s) => hash_str(hasher, s),
            Self::M44f(m) => m
                .to_cols_array()
                .iter()
                .for_each(|v| hasher.update(&v.to_le_bytes())),
            Self::M44d(m) => m
                .to_cols_array()
                .iter()
                .for_each(|v| hasher.update(&v.to_le_bytes())),
            Self::V3f(v) => v
                .to_array()
                .iter()
                .for_each(|c| hasher.update(&c.to_le_bytes())),
            Self::IntVector(values) => {
                hasher.update(&(values.len() as u64).to_le_bytes());
                values.iter().for_each(|v| hasher.update(&v.to_le_bytes()));
            }
            Self::StringVector(values) => {
                hasher.update(&(values.len() as u64).to_le_bytes());
                values.iter().for_each(|s| hash_str(hasher, s));
            }
        }
    }
}

// Length-prefixed so ["ab", "c"] and ["a", "bc"] differ.
fn hash_str(hasher: &mut Xxh3, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
