//! Binder: raw strings + [`ParameterSpec`] → [`TypedArguments`]
//!
//! Binding runs in two phases:
//!
//! 1. **Positional pass** - required slots are filled in order. Leftover
//!    values become extra positionals when the parameter spec accepts them, otherwise
//!    they fill the optional keyword slots in declaration order.
//! 2. **Keyword pass** - explicit keywords go to their declared slot, or
//!    pass through as text when the parameter spec accepts extra keywords. A slot
//!    already filled by the positional pass is a duplicate.
//!
//! Optional slots that received nothing keep their declared default.

use crate::coerce::{CoercionRegistry, SemanticType, Value};
use crate::error::{ArityError, Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// An optional parameter: name, type and default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct KeywordSlot {
    pub name: String,
    /// Type annotation, e.g. `"int"` or `"list[str]"`. Defaults to `str`.
    #[serde(rename = "type", default)]
    #[schemars(with = "String")]
    pub ty: SemanticType,
    #[serde(default)]
    pub default: Value,
}

impl KeywordSlot {
    pub fn new(name: impl Into<String>, ty: SemanticType, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: default.into(),
        }
    }
}

/// Shape of a target operation.
///
/// Build it once from whatever metadata describes the operation, then reuse
/// it for every call.
///
/// ```rust
/// use argbind::{ParameterSpec, SemanticType};
///
/// let spec = ParameterSpec::new()
///     .positional(SemanticType::Text)
///     .keyword("retries", SemanticType::Integer, 0)
///     .var_kwargs();
/// assert_eq!(spec.capacity(), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ParameterSpec {
    /// Required positional slot types, in order.
    #[serde(default)]
    #[schemars(with = "Vec<String>")]
    pub positionals: Vec<SemanticType>,
    /// Optional keyword slots, in order.
    #[serde(default)]
    pub keywords: Vec<KeywordSlot>,
    /// Accept extra trailing positionals (bound as text).
    #[serde(default)]
    pub var_args: bool,
    /// Accept undeclared keywords (bound as text).
    #[serde(default)]
    pub var_kwargs: bool,
}

impl ParameterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required positional slot.
    pub fn positional(mut self, ty: SemanticType) -> Self {
        self.positionals.push(ty);
        self
    }

    /// Append an optional keyword slot.
    pub fn keyword(
        mut self,
        name: impl Into<String>,
        ty: SemanticType,
        default: impl Into<Value>,
    ) -> Self {
        self.keywords.push(KeywordSlot::new(name, ty, default));
        self
    }

    /// Accept extra trailing positionals.
    pub fn var_args(mut self) -> Self {
        self.var_args = true;
        self
    }

    /// Accept undeclared keywords.
    pub fn var_kwargs(mut self) -> Self {
        self.var_kwargs = true;
        self
    }

    /// Declared keyword slot named `name`.
    pub fn keyword_slot(&self, name: &str) -> Option<&KeywordSlot> {
        self.keywords.iter().find(|slot| slot.name == name)
    }

    /// Maximum number of positional values, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        if self.var_args {
            None
        } else {
            Some(self.positionals.len() + self.keywords.len())
        }
    }

    /// Check that keyword slot names are non-empty and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for slot in &self.keywords {
            if slot.name.is_empty() {
                return Err(Error::InvalidSpec("keyword slot with empty name".into()));
            }
            if !seen.insert(slot.name.as_str()) {
                return Err(Error::InvalidSpec(format!(
                    "keyword slot {} declared twice",
                    slot.name
                )));
            }
        }
        Ok(())
    }
}

/// Binder output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypedArguments {
    pub positionals: Vec<Value>,
    pub keywords: serde_json::Map<String, Value>,
}

impl TypedArguments {
    /// Keyword value (bound or default) by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Positional value by index.
    pub fn positional(&self, index: usize) -> Option<&Value> {
        self.positionals.get(index)
    }
}

/// Binds raw values against one spec using one registry.
pub struct Binder<'a> {
    spec: &'a ParameterSpec,
    registry: &'a CoercionRegistry,
}

impl<'a> Binder<'a> {
    pub fn new(spec: &'a ParameterSpec, registry: &'a CoercionRegistry) -> Self {
        Self { spec, registry }
    }

    /// Bind `positionals` and `keywords`.
    ///
    /// Arity is checked before any value is coerced. On error nothing is
    /// returned, even if earlier values coerced fine.
    pub fn bind(
        &self,
        positionals: &[String],
        keywords: &BTreeMap<String, String>,
    ) -> Result<TypedArguments> {
        let spec = self.spec;
        spec.validate()?;
        self.check_arity(positionals.len())?;

        let required = spec.positionals.len();
        let mut typed = TypedArguments::default();

        // Phase 1: positional pass
        for (position, (value, ty)) in positionals.iter().zip(&spec.positionals).enumerate() {
            typed
                .positionals
                .push(self.coerce(value, Some(position), ty, None)?);
        }

        for (offset, value) in positionals.iter().skip(required).enumerate() {
            let position = required + offset;
            if spec.var_args {
                typed
                    .positionals
                    .push(self.coerce(value, Some(position), &SemanticType::Text, None)?);
                continue;
            }
            let slot = spec.keywords.get(offset).ok_or(ArityError::TooMany {
                max: required + spec.keywords.len(),
                got: positionals.len(),
            })?;
            let parsed = self.coerce(value, Some(position), &slot.ty, Some(&slot.name))?;
            typed.keywords.insert(slot.name.clone(), parsed);
        }

        // Phase 2: explicit keywords
        for (name, value) in keywords {
            if typed.keywords.contains_key(name) {
                return Err(Error::DuplicateKeyword(name.clone()));
            }
            let parsed = match spec.keyword_slot(name) {
                Some(slot) => self.coerce(value, None, &slot.ty, Some(name))?,
                None if spec.var_kwargs => {
                    self.coerce(value, None, &SemanticType::Text, Some(name))?
                }
                None => return Err(Error::UnknownKeyword(name.clone())),
            };
            typed.keywords.insert(name.clone(), parsed);
        }

        for slot in &spec.keywords {
            if !typed.keywords.contains_key(&slot.name) {
                typed
                    .keywords
                    .insert(slot.name.clone(), slot.default.clone());
            }
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            positionals = typed.positionals.len(),
            keywords = ?typed.keywords.keys().collect::<Vec<_>>(),
            "bound arguments"
        );

        Ok(typed)
    }

    fn check_arity(&self, got: usize) -> Result<()> {
        let expected = self.spec.positionals.len();
        if got < expected {
            return Err(ArityError::NotEnough { expected, got }.into());
        }
        if let Some(max) = self.spec.capacity() {
            if got > max {
                return Err(ArityError::TooMany { max, got }.into());
            }
        }
        Ok(())
    }

    fn coerce(
        &self,
        value: &str,
        position: Option<usize>,
        ty: &SemanticType,
        keyword: Option<&str>,
    ) -> Result<Value> {
        self.registry
            .coerce(ty, value)
            .map_err(|source| Error::TypeCoercion {
                value: value.to_string(),
                position,
                expected: ty.clone(),
                keyword: keyword.map(str::to_string),
                source,
            })
    }
}

/// Bind `positionals` and `keywords` against `spec` using `registry`.
pub fn bind(
    positionals: &[String],
    keywords: &BTreeMap<String, String>,
    spec: &ParameterSpec,
    registry: &CoercionRegistry,
) -> Result<TypedArguments> {
    Binder::new(spec, registry).bind(positionals, keywords)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn kw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn retries_spec() -> ParameterSpec {
        ParameterSpec::new()
            .positional(SemanticType::Integer)
            .keyword("retries", SemanticType::Integer, 0)
    }

    fn run(
        spec: &ParameterSpec,
        positionals: &[&str],
        keywords: &[(&str, &str)],
    ) -> Result<TypedArguments> {
        bind(
            &strings(positionals),
            &kw(keywords),
            spec,
            &CoercionRegistry::new(),
        )
    }

    #[test]
    fn test_overflow_fills_optional_keyword() {
        let typed = run(&retries_spec(), &["3", "9"], &[]).unwrap();
        assert_eq!(typed.positionals, vec![json!(3)]);
        assert_eq!(typed.get("retries"), Some(&json!(9)));
    }

    #[test]
    fn test_default_kept_when_unfilled() {
        let typed = run(&retries_spec(), &["3"], &[]).unwrap();
        assert_eq!(typed.get("retries"), Some(&json!(0)));
    }

    #[test]
    fn test_explicit_keyword() {
        let typed = run(&retries_spec(), &["3"], &[("retries", "2")]).unwrap();
        assert_eq!(typed.get("retries"), Some(&json!(2)));
    }

    #[test]
    fn test_positional_and_explicit_is_duplicate() {
        let err = run(&retries_spec(), &["3", "9"], &[("retries", "2")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateKeyword(k) if k == "retries"));
    }

    #[test]
    fn test_too_many_positionals() {
        let err = run(&retries_spec(), &["3", "9", "9"], &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Arity(ArityError::TooMany { max: 2, got: 3 })
        ));
    }

    #[test]
    fn test_not_enough_positionals() {
        let spec = ParameterSpec::new()
            .positional(SemanticType::Text)
            .positional(SemanticType::Integer);
        let err = run(&spec, &["a"], &[]).unwrap_err();
        assert!(matches!(
            err,
            Error::Arity(ArityError::NotEnough {
                expected: 2,
                got: 1
            })
        ));

        // Extra positionals do not make up for missing required ones
        let err = run(&spec.clone().var_args(), &[], &[]).unwrap_err();
        assert!(matches!(err, Error::Arity(ArityError::NotEnough { .. })));
    }

    #[test]
    fn test_arity_checked_before_coercion() {
        // "x" is not an int, but the arity error wins
        let err = run(&retries_spec(), &["x", "1", "2"], &[]).unwrap_err();
        assert!(matches!(err, Error::Arity(_)));
    }

    #[test]
    fn test_var_args_bound_as_text() {
        let spec = retries_spec().var_args();
        let typed = run(&spec, &["3", "9", "10"], &[]).unwrap();
        assert_eq!(typed.positionals, vec![json!(3), json!("9"), json!("10")]);
        // Optional slots are not filled positionally when extras are accepted
        assert_eq!(typed.get("retries"), Some(&json!(0)));
    }

    #[test]
    fn test_unknown_keyword() {
        let err = run(&retries_spec(), &["3"], &[("verbose", "1")]).unwrap_err();
        assert!(matches!(err, Error::UnknownKeyword(k) if k == "verbose"));
    }

    #[test]
    fn test_var_kwargs_pass_through_as_text() {
        let spec = retries_spec().var_kwargs();
        let typed = run(&spec, &["3"], &[("verbose", "1"), ("retries", "4")]).unwrap();
        assert_eq!(typed.get("verbose"), Some(&json!("1")));
        assert_eq!(typed.get("retries"), Some(&json!(4)));
    }

    #[test]
    fn test_coercion_error_names_position_and_keyword() {
        let err = run(&retries_spec(), &["3", "many"], &[]).unwrap_err();
        match err {
            Error::TypeCoercion {
                value,
                position,
                expected,
                keyword,
                source,
            } => {
                assert_eq!(value, "many");
                assert_eq!(position, Some(1));
                assert_eq!(expected, SemanticType::Integer);
                assert_eq!(keyword.as_deref(), Some("retries"));
                assert!(source.downcast_ref::<std::num::ParseIntError>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_coercion_error_for_explicit_keyword() {
        let err = run(&retries_spec(), &["3"], &[("retries", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeCoercion { position: None, keyword: Some(k), .. } if k == "retries"
        ));
    }

    #[test]
    fn test_mixed_slots() {
        let spec = ParameterSpec::new()
            .positional(SemanticType::Text)
            .positional(SemanticType::Float)
            .keyword("count", SemanticType::Integer, 1)
            .keyword("force", SemanticType::Boolean, false)
            .keyword("tag", SemanticType::Text, Value::Null);
        let typed = run(&spec, &["src", "0.5", "4"], &[("force", "yes")]).unwrap();
        assert_eq!(typed.positionals, vec![json!("src"), json!(0.5)]);
        assert_eq!(
            Value::Object(typed.keywords),
            json!({"count": 4, "force": true, "tag": null})
        );
    }

    #[test]
    fn test_custom_converter() {
        let spec = ParameterSpec::new().positional(SemanticType::named("Color"));
        let registry = CoercionRegistry::new().with(SemanticType::named("Color"), |raw| {
            Ok(json!({ "color": raw }))
        });
        let typed = bind(&strings(&["red"]), &BTreeMap::new(), &spec, &registry).unwrap();
        assert_eq!(typed.positional(0), Some(&json!({"color": "red"})));
    }

    #[test]
    fn test_invalid_spec() {
        let spec = retries_spec().keyword("retries", SemanticType::Text, "");
        assert!(matches!(
            run(&spec, &["1"], &[]),
            Err(Error::InvalidSpec(_))
        ));
    }

    #[test]
    fn test_spec_from_json() {
        let spec: ParameterSpec = serde_json::from_value(json!({
            "positionals": ["int", "list[str]"],
            "keywords": [
                {"name": "retries", "type": "int", "default": 0},
                {"name": "label"}
            ],
            "var_kwargs": true
        }))
        .unwrap();
        assert_eq!(
            spec,
            ParameterSpec::new()
                .positional(SemanticType::Integer)
                .positional(SemanticType::list(SemanticType::Text))
                .keyword("retries", SemanticType::Integer, 0)
                .keyword("label", SemanticType::Text, Value::Null)
                .var_kwargs()
        );
    }

    #[test]
    fn test_spec_rejects_unknown_fields() {
        let result = serde_json::from_value::<ParameterSpec>(json!({"positional": ["int"]}));
        assert!(result.is_err());
    }
}
