//! Error types for Argbind
//!
//! Every stage of the pipeline fails fast with one of these variants:
//! - Tokenizer / extraction: [`Error::UnterminatedQuote`], [`Error::DanglingKeyword`]
//! - Binder: [`Error::Arity`], [`Error::UnknownKeyword`], [`Error::DuplicateKeyword`],
//!   [`Error::TypeCoercion`]
//! - Caller level: [`Error::EmptyInput`]

use crate::coerce::{BoxError, SemanticType};
use crate::parser::Position;
use thiserror::Error;

/// Result type alias using Argbind's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Argbind error types.
#[derive(Error, Debug)]
pub enum Error {
    /// A quoted span was opened and never closed.
    #[error("unterminated quote: {quote} was opened{} but never closed", at(.position))]
    UnterminatedQuote {
        quote: char,
        /// Where the quote was opened. `None` when the input was pre-split entries.
        position: Option<Position>,
    },

    /// A keyword name was given without a following value.
    #[error("keyword {0} was not given a value")]
    DanglingKeyword(String),

    /// Too few or too many positional values for the declared shape.
    #[error(transparent)]
    Arity(#[from] ArityError),

    /// Keyword name is not declared and the parameter spec does not accept extra keywords.
    #[error("{0} is not a keyword argument")]
    UnknownKeyword(String),

    /// The same keyword slot was filled twice.
    #[error("keyword {0} was given twice, either as a keyword or as a positional")]
    DuplicateKeyword(String),

    /// A string value could not be converted to its declared type.
    #[error(
        "could not parse {value:?}{} as {expected}{}",
        .position.map(|p| format!(" in position {p}")).unwrap_or_default(),
        .keyword.as_deref().map(|k| format!(" for {k}")).unwrap_or_default()
    )]
    TypeCoercion {
        value: String,
        /// Index among the entered positionals; `None` for explicit keywords.
        position: Option<usize>,
        expected: SemanticType,
        /// Keyword slot being filled, if any.
        keyword: Option<String>,
        #[source]
        source: BoxError,
    },

    /// Nothing was entered.
    #[error("nothing was entered")]
    EmptyInput,

    /// Malformed escape sequence while decoding escapes.
    #[error("invalid escape sequence: {0}")]
    InvalidEscape(String),

    /// Parameter spec cannot be used as declared.
    #[error("invalid parameter spec: {0}")]
    InvalidSpec(String),

    /// Input produced more tokens than the configured limit.
    #[error("too many tokens: limit is {limit}")]
    TooManyTokens { limit: usize },
}

/// Arity violations detected by the binder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArityError {
    #[error("not enough positional arguments: expected {expected}, got {got}")]
    NotEnough { expected: usize, got: usize },

    #[error("too many arguments: supplied {got} but max (positionals and keywords) is {max}")]
    TooMany { max: usize, got: usize },
}

fn at(position: &Option<Position>) -> String {
    position.map(|p| format!(" at {p}")).unwrap_or_default()
}

impl Error {
    /// Whether the error came from the tokenizer or extraction stage.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::UnterminatedQuote { .. }
                | Self::DanglingKeyword(_)
                | Self::InvalidEscape(_)
                | Self::TooManyTokens { .. }
        )
    }
}
