//! Typed converter parameters and their text form.
//!
//! Hosts store conversion overrides as a single string per query, e.g.
//! `"-normals true -uvSet map2"`. Tokens are separated by whitespace and
//! come in `name value` pairs; the leading `-` on names is optional.
//!
//! Parsing may call into the host interpreter, so [`ParameterParser`]
//! always runs inside a [`CriticalSection`].

use std::fmt;

use crate::errors::{Result, SceneShapeError};
use crate::utils::CriticalSection;

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    String(String),
}

impl ParameterValue {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    /// Parses `text` into a value of the same type as `self`.
    fn parse_same_type(&self, name: &str, text: &str) -> Result<Self> {
        let invalid = |reason: String| SceneShapeError::InvalidParameter {
            name: name.to_owned(),
            value: text.to_owned(),
            reason,
        };
        match self {
            Self::Bool(_) => match text.to_ascii_lowercase().as_str() {
                "true" | "1" | "on" | "yes" => Ok(Self::Bool(true)),
                "false" | "0" | "off" | "no" => Ok(Self::Bool(false)),
                _ => Err(invalid("expected a boolean".to_owned())),
            },
            Self::Int(_) => text
                .parse()
                .map(Self::Int)
                .map_err(|e| invalid(format!("{e}"))),
            Self::Float(_) => text
                .parse()
                .map(Self::Float)
                .map_err(|e| invalid(format!("{e}"))),
            Self::String(_) => Ok(Self::String(text.to_owned())),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

/// An ordered set of named, typed parameters with defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParameterValue)>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a parameter and its default value.
    #[must_use]
    pub fn with(mut self, name: &str, default: ParameterValue) -> Self {
        self.entries.push((name.to_owned(), default));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParameterValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            ParameterValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParameterValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParameterValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Replaces a declared parameter's value. The type must match.
    pub fn set(&mut self, name: &str, value: ParameterValue) -> Result<()> {
        let Some(slot) = self.entries.iter_mut().find(|(n, _)| n == name) else {
            return Err(SceneShapeError::UnknownParameter(name.to_owned()));
        };
        if std::mem::discriminant(&slot.1) != std::mem::discriminant(&value) {
            return Err(SceneShapeError::InvalidParameter {
                name: name.to_owned(),
                value: value.to_string(),
                reason: format!("expected {}, got {}", slot.1.type_name(), value.type_name()),
            });
        }
        slot.1 = value;
        Ok(())
    }

    /// Applies `name value` pairs from `text`.
    ///
    /// Either every pair applies or none does.
    pub fn apply_text(&mut self, text: &str) -> Result<()> {
        let mut staged = self.clone();
        let mut tokens = text.split_whitespace();
        while let Some(token) = tokens.next() {
            let name = token.strip_prefix('-').unwrap_or(token);
            let Some(current) = staged.get(name) else {
                return Err(SceneShapeError::UnknownParameter(name.to_owned()));
            };
            let Some(raw) = tokens.next() else {
                return Err(SceneShapeError::InvalidParameter {
                    name: name.to_owned(),
                    value: String::new(),
                    reason: "missing value".to_owned(),
                });
            };
            let value = current.parse_same_type(name, raw)?;
            staged.set(name, value)?;
        }
        *self = staged;
        Ok(())
    }
}

/// Applies parameter text while holding the interpreter critical section.
#[derive(Debug, Clone, Copy)]
pub struct ParameterParser {
    section: &'static CriticalSection,
}

impl Default for ParameterParser {
    fn default() -> Self {
        Self::new(CriticalSection::global())
    }
}

impl ParameterParser {
    #[must_use]
    pub fn new(section: &'static CriticalSection) -> Self {
        Self { section }
    }

    pub fn parse(&self, text: &str, parameters: &mut Parameters) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let _guard = self.section.enter();
        parameters.apply_text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_parameters() -> Parameters {
        Parameters::new()
            .with("normals", ParameterValue::Bool(true))
            .with("uvSet", ParameterValue::String("map1".into()))
            .with("index", ParameterValue::Int(0))
    }

    #[test]
    fn parses_pairs_with_optional_dash() {
        let mut params = mesh_parameters();
        params.apply_text("-normals off  uvSet map2 -index 3").unwrap();
        assert_eq!(params.bool("normals"), Some(false));
        assert_eq!(params.string("uvSet"), Some("map2"));
        assert_eq!(params.int("index"), Some(3));
    }

    #[test]
    fn failure_leaves_parameters_untouched() {
        let mut params = mesh_parameters();
        let err = params.apply_text("-normals false -index three").unwrap_err();
        assert!(matches!(err, SceneShapeError::InvalidParameter { ref name, .. } if name == "index"));
        assert_eq!(params.bool("normals"), Some(true));

        let err = params.apply_text("-bogus 1").unwrap_err();
        assert_eq!(err, SceneShapeError::UnknownParameter("bogus".into()));

        let err = params.apply_text("-index").unwrap_err();
        assert!(matches!(err, SceneShapeError::InvalidParameter { .. }));
    }

    #[test]
    fn set_checks_type() {
        let mut params = mesh_parameters();
        assert!(params.set("index", ParameterValue::Bool(true)).is_err());
        params.set("index", ParameterValue::Int(2)).unwrap();
        assert_eq!(params.int("index"), Some(2));
    }

    #[test]
    fn parser_releases_section() {
        static SECTION: CriticalSection = CriticalSection::new();
        let parser = ParameterParser::new(&SECTION);
        let mut params = mesh_parameters();
        assert!(parser.parse("-normals maybe", &mut params).is_err());
        assert!(!SECTION.is_held());
        parser.parse("-normals 0", &mut params).unwrap();
        assert!(!SECTION.is_held());
        assert_eq!(params.bool("normals"), Some(false));
    }
}
