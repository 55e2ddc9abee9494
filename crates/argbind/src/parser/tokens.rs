//! Token and tokenizer-state types

use super::span::Span;
use serde::Serialize;

/// A word produced by the tokenizer, with its source location.
///
/// `text` has quotes and escape markers already removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpannedToken {
    pub text: String,
    pub span: Span,
}

/// Tokenizer state while scanning a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeState {
    /// Outside any quoted span: whitespace separates tokens.
    Normal,

    /// Inside a span opened by the given quote character.
    InQuote(char),

    /// Escape marker seen inside a span opened by the given quote character;
    /// the next character is taken literally.
    PendingEscape(char),
}

impl EscapeState {
    /// Quote character of the open span, if any.
    pub fn open_quote(self) -> Option<char> {
        match self {
            Self::Normal => None,
            Self::InQuote(q) | Self::PendingEscape(q) => Some(q),
        }
    }
}
