//! Type coercion registry
//!
//! Maps a [`SemanticType`] to a string → [`Value`] converter. Built-in types
//! get a default converter; callers override or add converters with
//! [`CoercionRegistry::register`]. Parameterized types such as `list[int]`
//! resolve through their inner type unless overridden themselves.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Typed value produced by coercion.
pub type Value = serde_json::Value;

/// Boxed conversion failure, kept as the source of
/// [`Error::TypeCoercion`](crate::Error::TypeCoercion).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// String → value conversion function.
pub type Converter = Arc<dyn Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync>;

/// Semantic type of a parameter slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SemanticType {
    /// Generic text, passed through unchanged.
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
    Char,
    /// Any JSON document.
    Json,
    /// Container of the inner type; coerces with the inner converter.
    List(Box<SemanticType>),
    /// Optional inner type; coerces with the inner converter.
    Optional(Box<SemanticType>),
    /// Caller-defined type that needs a registered converter.
    Named(String),
}

impl SemanticType {
    pub fn list(inner: SemanticType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn optional(inner: SemanticType) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// First type argument of a parameterized type.
    pub fn inner(&self) -> Option<&SemanticType> {
        match self {
            Self::List(inner) | Self::Optional(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("str"),
            Self::Integer => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("bool"),
            Self::Char => f.write_str("char"),
            Self::Json => f.write_str("json"),
            Self::List(inner) => write!(f, "list[{inner}]"),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

// Both patterns are literals known to compile
#[allow(clippy::unwrap_used)]
static PARAMETERIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\[\s*(.+?)\s*\]$").unwrap());

#[allow(clippy::unwrap_used)]
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.:]*$").unwrap());

impl FromStr for SemanticType {
    type Err = Error;

    /// Parse a type annotation such as `int`, `list[int]`, `Optional[str]`
    /// or `float?`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(inner) = s.strip_suffix('?') {
            return Ok(Self::optional(inner.parse()?));
        }

        if let Some(caps) = PARAMETERIZED.captures(s) {
            // Only the first type argument matters for coercion
            let inner: SemanticType = first_type_argument(&caps[2]).parse()?;
            let wrapper = caps[1].rsplit('.').next().unwrap_or_default();
            return Ok(match wrapper {
                "Optional" | "optional" => Self::optional(inner),
                _ => Self::list(inner),
            });
        }

        let ty = match s {
            "str" | "string" | "text" | "String" => Self::Text,
            "int" | "integer" | "i64" => Self::Integer,
            "float" | "number" | "f64" => Self::Float,
            "bool" | "boolean" => Self::Boolean,
            "char" => Self::Char,
            "json" => Self::Json,
            name if IDENTIFIER.is_match(name) => Self::named(name),
            other => {
                return Err(Error::InvalidSpec(format!(
                    "unrecognized type annotation: {other:?}"
                )));
            }
        };
        Ok(ty)
    }
}

/// Text before the first comma outside nested brackets.
fn first_type_argument(args: &str) -> &str {
    let mut depth = 0usize;
    for (i, ch) in args.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return &args[..i],
            _ => {}
        }
    }
    args
}

impl Serialize for SemanticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Failures of the built-in converters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("expected a boolean (true/false, yes/no, on/off, 1/0), got {0:?}")]
    InvalidBoolean(String),

    #[error("expected exactly one character, got {0:?}")]
    InvalidChar(String),

    #[error("{0} cannot be represented as a JSON number")]
    NonFinite(f64),

    #[error("no converter registered for type {0}")]
    NoConverter(String),
}

/// Maps semantic types to converters.
///
/// Read-only once built; clone it or share it behind a reference across
/// threads.
#[derive(Clone, Default)]
pub struct CoercionRegistry {
    overrides: HashMap<SemanticType, Converter>,
}

impl fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<String> = self.overrides.keys().map(|t| t.to_string()).collect();
        types.sort();
        f.debug_struct("CoercionRegistry")
            .field("overrides", &types)
            .finish()
    }
}

impl CoercionRegistry {
    /// Registry with only the built-in converters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the converter for `ty`.
    pub fn register<F>(&mut self, ty: SemanticType, converter: F)
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.overrides.insert(ty, Arc::new(converter));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, ty: SemanticType, converter: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register(ty, converter);
        self
    }

    /// Whether an override is registered for exactly `ty`.
    pub fn contains(&self, ty: &SemanticType) -> bool {
        self.overrides.contains_key(ty)
    }

    /// Converter for `ty`: the registered override, else the inner type's
    /// converter for parameterized types, else the built-in default.
    pub fn resolve(&self, ty: &SemanticType) -> Converter {
        if let Some(converter) = self.overrides.get(ty) {
            return Arc::clone(converter);
        }
        match ty.inner() {
            Some(inner) => self.resolve(inner),
            None => builtin(ty),
        }
    }

    /// Convert `raw` to `ty`.
    pub fn coerce(&self, ty: &SemanticType, raw: &str) -> std::result::Result<Value, BoxError> {
        (self.resolve(ty))(raw)
    }
}

fn builtin(ty: &SemanticType) -> Converter {
    match ty {
        SemanticType::Text => Arc::new(coerce_text),
        SemanticType::Integer => Arc::new(coerce_int),
        SemanticType::Float => Arc::new(coerce_float),
        SemanticType::Boolean => Arc::new(coerce_bool),
        SemanticType::Char => Arc::new(coerce_char),
        SemanticType::Json => Arc::new(coerce_json),
        other => {
            let name = other.to_string();
            Arc::new(move |_: &str| -> std::result::Result<Value, BoxError> {
                Err(ConversionError::NoConverter(name.clone()).into())
            })
        }
    }
}

fn coerce_text(raw: &str) -> std::result::Result<Value, BoxError> {
    Ok(Value::String(raw.to_string()))
}

fn coerce_int(raw: &str) -> std::result::Result<Value, BoxError> {
    Ok(Value::from(raw.trim().parse::<i64>()?))
}

fn coerce_json(raw: &str) -> std::result::Result<Value, BoxError> {
    Ok(serde_json::from_str::<Value>(raw)?)
}

fn coerce_float(raw: &str) -> std::result::Result<Value, BoxError> {
    let n: f64 = raw.trim().parse()?;
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| ConversionError::NonFinite(n).into())
}

fn coerce_bool(raw: &str) -> std::result::Result<Value, BoxError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Ok(Value::Bool(true)),
        "false" | "0" | "no" | "n" | "off" => Ok(Value::Bool(false)),
        _ => Err(ConversionError::InvalidBoolean(raw.to_string()).into()),
    }
}

fn coerce_char(raw: &str) -> std::result::Result<Value, BoxError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::String(c.to_string())),
        _ => Err(ConversionError::InvalidChar(raw.to_string()).into()),
    }
}
