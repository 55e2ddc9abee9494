//! Tokenizer for command lines
//!
//! Splits input into words with source position tracking. Whitespace
//! separates words outside quotes; a quoted span keeps its whitespace and
//! may contain the escape marker to insert its own quote character.

use super::span::{Position, Span};
use super::tokens::{EscapeState, SpannedToken};
use crate::error::{Error, Result};
use crate::options::ParseOptions;

/// Tokenizer for command lines.
pub struct Lexer<'a> {
    /// Current position in the input
    position: Position,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    quote_chars: Vec<char>,
    escape_char: Option<char>,
    max_tokens: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer with default options.
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, &ParseOptions::default())
    }

    /// Create a new lexer using the quote and escape settings of `options`.
    pub fn with_options(input: &'a str, options: &ParseOptions) -> Self {
        Self {
            position: Position::new(),
            chars: input.chars().peekable(),
            quote_chars: options.quote_chars.clone(),
            escape_char: options.escape_char,
            max_tokens: options.max_tokens,
        }
    }

    /// Get the current position in the input.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Get the next word from the input (without span info).
    pub fn next_token(&mut self) -> Result<Option<String>> {
        Ok(self.next_spanned_token()?.map(|t| t.text))
    }

    /// Get the next word with its source span.
    ///
    /// Returns `Ok(None)` once the input is exhausted. Empty words (for
    /// example a lone `''`) are skipped rather than returned.
    pub fn next_spanned_token(&mut self) -> Result<Option<SpannedToken>> {
        loop {
            self.skip_whitespace();
            if self.peek_char().is_none() {
                return Ok(None);
            }
            let start = self.position;
            let text = self.read_word()?;
            if !text.is_empty() {
                return Ok(Some(SpannedToken {
                    text,
                    span: Span::from_positions(start, self.position),
                }));
            }
        }
    }

    /// Consume the lexer and collect every word.
    pub fn tokenize(mut self) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            if tokens.len() == self.max_tokens {
                return Err(Error::TooManyTokens {
                    limit: self.max_tokens,
                });
            }
            tokens.push(token);
        }

        #[cfg(feature = "logging")]
        tracing::trace!(tokens = tokens.len(), "tokenized line");

        Ok(tokens)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if let Some(c) = ch {
            self.position.advance(c);
        }
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if is_separator(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Read one word, running the quote/escape state machine until an
    /// unquoted separator or end of input.
    fn read_word(&mut self) -> Result<String> {
        let mut word = String::new();
        let mut state = EscapeState::Normal;
        let mut quote_start = self.position;

        while let Some(ch) = self.peek_char() {
            match state {
                EscapeState::Normal => {
                    if is_separator(ch) {
                        break;
                    }
                    if self.quote_chars.contains(&ch) {
                        quote_start = self.position;
                        state = EscapeState::InQuote(ch);
                    } else {
                        word.push(ch);
                    }
                }
                EscapeState::InQuote(q) => {
                    if Some(ch) == self.escape_char {
                        state = EscapeState::PendingEscape(q);
                    } else if ch == q {
                        state = EscapeState::Normal;
                    } else {
                        word.push(ch);
                    }
                }
                EscapeState::PendingEscape(q) => {
                    // Escape marker is dropped; the next char is literal
                    word.push(ch);
                    state = EscapeState::InQuote(q);
                }
            }
            self.advance();
        }

        if let Some(quote) = state.open_quote() {
            return Err(Error::UnterminatedQuote {
                quote,
                position: Some(quote_start),
            });
        }

        Ok(word)
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}
