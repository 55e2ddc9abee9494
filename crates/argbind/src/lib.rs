//! Argbind - text to typed arguments
//!
//! Turns a free-form line such as `copy src/ dst/ retries=3` into typed
//! arguments for an operation:
//!
//! 1. **Tokenize** the line into words, honoring quotes and escapes.
//! 2. **Extract** positionals and `name=value` keywords from the words.
//! 3. **Bind** them against a [`ParameterSpec`], coercing each value through
//!    a [`CoercionRegistry`].
//!
//! # Example
//!
//! ```rust
//! use argbind::{ArgParser, ParameterSpec, SemanticType};
//! use serde_json::json;
//!
//! # fn main() -> argbind::Result<()> {
//! let spec = ParameterSpec::new()
//!     .positional(SemanticType::Text)
//!     .keyword("retries", SemanticType::Integer, 0);
//!
//! let parser = ArgParser::new();
//! let call = parser.invocation("copy 'my file' retries=3")?;
//! assert_eq!(call.name, "copy");
//!
//! let typed = parser.bind(&call.args, &spec)?;
//! assert_eq!(typed.positionals, vec![json!("my file")]);
//! assert_eq!(typed.get("retries"), Some(&json!(3)));
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `logging`: emit `tracing` events, with secrets redacted via [`LogConfig`].

mod binder;
mod coerce;
mod error;
#[cfg(feature = "logging")]
mod logging_impl;
mod options;
pub mod parser;

pub use binder::{Binder, KeywordSlot, ParameterSpec, TypedArguments, bind};
pub use coerce::{BoxError, CoercionRegistry, ConversionError, Converter, SemanticType, Value};
pub use error::{ArityError, Error, Result};
#[cfg(feature = "logging")]
pub use logging_impl::{LogConfig, format_line_for_log, sanitize_for_log};
pub use options::{DuplicatePolicy, ParseOptions};
pub use parser::{Extractor, Lexer, Position, RawArguments, Span, extract, tokenize};

use serde::Serialize;

/// A parsed command: operation name plus its remaining arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub name: String,
    pub args: RawArguments,
}

/// Parser with fixed options and converters.
///
/// Cheap to share: every method takes `&self`.
#[derive(Debug, Clone, Default)]
pub struct ArgParser {
    options: ParseOptions,
    registry: CoercionRegistry,
    #[cfg(feature = "logging")]
    log_config: LogConfig,
}

impl ArgParser {
    /// Parser with default options and built-in converters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ArgParserBuilder {
        ArgParserBuilder::default()
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn registry(&self) -> &CoercionRegistry {
        &self.registry
    }

    /// Split `line` into words.
    pub fn tokenize(&self, line: &str) -> Result<Vec<String>> {
        #[cfg(feature = "logging")]
        tracing::trace!(
            line = %format_line_for_log(line, &self.log_config),
            "tokenizing"
        );
        Lexer::with_options(line, &self.options).tokenize()
    }

    /// Extract positionals and keywords from pre-split entries.
    pub fn extract<I, S>(&self, entries: I) -> Result<RawArguments>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw = Extractor::new(&self.options).extract(entries)?;
        #[cfg(feature = "logging")]
        self.log_raw(&raw);
        Ok(raw)
    }

    /// Tokenize and extract `line`.
    pub fn parse_line(&self, line: &str) -> Result<RawArguments> {
        let tokens = self.tokenize(line)?;
        self.extract(tokens)
    }

    /// Bind extracted arguments against `spec`.
    pub fn bind(&self, raw: &RawArguments, spec: &ParameterSpec) -> Result<TypedArguments> {
        Binder::new(spec, &self.registry).bind(&raw.positionals, &raw.keywords)
    }

    /// Tokenize, extract and bind `line` in one go.
    pub fn parse(&self, line: &str, spec: &ParameterSpec) -> Result<TypedArguments> {
        let raw = self.parse_line(line)?;
        self.bind(&raw, spec)
    }

    /// Parse `line` and split off the first positional as the operation name.
    ///
    /// Fails with [`Error::EmptyInput`] when the line has no positional.
    pub fn invocation(&self, line: &str) -> Result<Invocation> {
        let raw = self.parse_line(line)?;
        split_invocation(raw)
    }

    /// Like [`invocation`](Self::invocation) for pre-split entries.
    pub fn invocation_from_entries<I, S>(&self, entries: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw = self.extract(entries)?;
        split_invocation(raw)
    }

    #[cfg(feature = "logging")]
    fn log_raw(&self, raw: &RawArguments) {
        for (index, value) in raw.positionals.iter().enumerate() {
            tracing::trace!(
                index,
                value = %sanitize_for_log(&self.log_config.redact_value(value)),
                "positional"
            );
        }
        for (name, value) in &raw.keywords {
            tracing::trace!(
                keyword = %name,
                value = %sanitize_for_log(&self.log_config.redact_keyword_value(name, value)),
                "keyword"
            );
        }
    }
}

fn split_invocation(mut raw: RawArguments) -> Result<Invocation> {
    if raw.positionals.is_empty() {
        return Err(Error::EmptyInput);
    }
    let name = raw.positionals.remove(0);
    Ok(Invocation { name, args: raw })
}

/// Builder for [`ArgParser`].
#[derive(Default)]
pub struct ArgParserBuilder {
    options: Option<ParseOptions>,
    registry: Option<CoercionRegistry>,
    #[cfg(feature = "logging")]
    log_config: Option<LogConfig>,
}

impl ArgParserBuilder {
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Use `registry` instead of the built-in converters only.
    pub fn registry(mut self, registry: CoercionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Register one converter on top of the current registry.
    pub fn converter<F>(mut self, ty: SemanticType, converter: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.registry = Some(self.registry.unwrap_or_default().with(ty, converter));
        self
    }

    #[cfg(feature = "logging")]
    pub fn log_config(mut self, config: LogConfig) -> Self {
        self.log_config = Some(config);
        self
    }

    pub fn build(self) -> ArgParser {
        ArgParser {
            options: self.options.unwrap_or_default(),
            registry: self.registry.unwrap_or_default(),
            #[cfg(feature = "logging")]
            log_config: self.log_config.unwrap_or_default(),
        }
    }
}
