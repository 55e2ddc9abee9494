//! Parser module for Argbind
//!
//! Turns a line into words ([`Lexer`]) and words into positionals and
//! keywords ([`Extractor`]).

mod extract;
mod lexer;
mod span;
mod tokens;
mod unescape;

pub use extract::{Extractor, RawArguments};
pub use lexer::Lexer;
pub use span::{Position, Span};
pub use tokens::{EscapeState, SpannedToken};
pub use unescape::unescape;

use crate::error::Result;
use crate::options::ParseOptions;

/// Split `text` into words using the default quote and escape rules.
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    Lexer::new(text).tokenize()
}

/// Extract positionals and keywords from pre-split entries using default options.
pub fn extract<I, S>(entries: I) -> Result<RawArguments>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Extractor::new(&ParseOptions::default()).extract(entries)
}

/// Tokenize then extract with the given options.
pub fn parse_line(line: &str, options: &ParseOptions) -> Result<RawArguments> {
    let tokens = Lexer::with_options(line, options).tokenize()?;
    Extractor::new(options).extract(tokens)
}
