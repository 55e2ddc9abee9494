//! Parse options
//!
//! Configures the surface grammar shared by the tokenizer and the extraction
//! engine, plus an upper bound on how many tokens a single line may produce.

/// How the extraction engine treats a keyword given twice explicitly
/// (`n=1 n=2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`Error::DuplicateKeyword`](crate::Error::DuplicateKeyword).
    #[default]
    Reject,
    /// Keep the last assignment.
    LastWins,
}

/// Options for tokenizing and extracting a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Characters that open and close a quoted span
    /// Default: `'` and `"`
    pub quote_chars: Vec<char>,

    /// Escape marker recognized inside quoted spans, `None` disables escaping
    /// Default: `\`
    pub escape_char: Option<char>,

    /// Separator between a keyword name and its value
    /// Default: `=`
    pub equality_specifier: String,

    /// Policy for repeated explicit keywords
    /// Default: reject
    pub duplicate_keywords: DuplicatePolicy,

    /// Decode `\n`, `\t`, `\xHH`, `\u{..}` etc. in extracted values
    /// Default: false
    pub process_escapes: bool,

    /// Maximum number of tokens produced from one line
    /// Default: 10,000
    pub max_tokens: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            quote_chars: vec!['\'', '"'],
            escape_char: Some('\\'),
            equality_specifier: "=".to_string(),
            duplicate_keywords: DuplicatePolicy::Reject,
            process_escapes: false,
            max_tokens: 10_000,
        }
    }
}

impl ParseOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quote characters
    pub fn quote_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.quote_chars = chars.into_iter().collect();
        self
    }

    /// Set the escape marker (`None` disables escaping inside quotes)
    pub fn escape_char(mut self, ch: Option<char>) -> Self {
        self.escape_char = ch;
        self
    }

    /// Set the keyword/value separator
    pub fn equality_specifier(mut self, spec: impl Into<String>) -> Self {
        self.equality_specifier = spec.into();
        self
    }

    /// Set the duplicate keyword policy
    pub fn duplicate_keywords(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_keywords = policy;
        self
    }

    /// Enable or disable escape decoding of extracted values
    pub fn process_escapes(mut self, enabled: bool) -> Self {
        self.process_escapes = enabled;
        self
    }

    /// Set maximum token count
    pub fn max_tokens(mut self, count: usize) -> Self {
        self.max_tokens = count;
        self
    }

    pub(crate) fn is_quote(&self, ch: char) -> bool {
        self.quote_chars.contains(&ch)
    }
}
