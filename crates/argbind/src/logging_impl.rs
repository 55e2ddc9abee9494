//! Log redaction for argument values
//!
//! Command lines routinely carry credentials (`login password=hunter2`), so
//! anything argbind logs goes through [`LogConfig`] first:
//!
//! - keyword values whose *name* looks sensitive are replaced outright;
//! - values that *look* like secrets (API key prefixes, JWTs) are replaced;
//! - everything else is truncated to `max_value_length`.
//!
//! Raw input lines are never logged verbatim unless explicitly enabled.

use std::borrow::Cow;
use std::collections::BTreeSet;

const REDACTED: &str = "[REDACTED]";

/// Name fragments that mark a keyword as sensitive (matched case-insensitively).
const SENSITIVE_NAMES: &[&str] = &[
    "PASSWORD",
    "PASSWD",
    "PASSPHRASE",
    "SECRET",
    "TOKEN",
    "KEY",
    "CREDENTIAL",
    "AUTH",
    "PRIVATE",
    "BEARER",
    "COOKIE",
    "SESSION",
];

/// Controls what argbind writes to `tracing` events.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Redact sensitive values (default: true)
    pub redact_sensitive: bool,

    /// Keyword name fragments to redact, stored uppercase
    pub redact_keywords: BTreeSet<String>,

    /// Include raw input lines in logs (default: false)
    pub log_input_lines: bool,

    /// Maximum length of logged values before truncation (default: 120)
    pub max_value_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            redact_sensitive: true,
            redact_keywords: SENSITIVE_NAMES.iter().map(|s| s.to_string()).collect(),
            log_input_lines: false,
            max_value_length: 120,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn redaction off entirely.
    ///
    /// # Warning
    ///
    /// Secrets passed as arguments will show up in logs.
    pub fn unsafe_disable_redaction(mut self) -> Self {
        self.redact_sensitive = false;
        self
    }

    /// Also redact keywords whose name contains `pattern`.
    pub fn redact_keyword(mut self, pattern: &str) -> Self {
        self.redact_keywords.insert(pattern.to_uppercase());
        self
    }

    /// Log raw input lines (sanitized and truncated).
    pub fn unsafe_log_input(mut self) -> Self {
        self.log_input_lines = true;
        self
    }

    pub fn max_value_length(mut self, len: usize) -> Self {
        self.max_value_length = len;
        self
    }

    /// Whether values bound to keyword `name` must be hidden.
    pub fn is_sensitive_keyword(&self, name: &str) -> bool {
        if !self.redact_sensitive {
            return false;
        }
        let upper = name.to_uppercase();
        self.redact_keywords
            .iter()
            .any(|pattern| upper.contains(pattern.as_str()))
    }

    /// Redact `value` if it looks like a secret, truncate otherwise.
    pub fn redact_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if self.redact_sensitive && is_likely_secret(value) {
            return Cow::Borrowed(REDACTED);
        }
        self.truncate(value)
    }

    /// Redact the value of keyword `name` by name first, then by content.
    pub fn redact_keyword_value<'a>(&self, name: &str, value: &'a str) -> Cow<'a, str> {
        if self.is_sensitive_keyword(name) {
            return Cow::Borrowed(REDACTED);
        }
        self.redact_value(value)
    }

    fn truncate<'a>(&self, value: &'a str) -> Cow<'a, str> {
        if value.len() <= self.max_value_length {
            return Cow::Borrowed(value);
        }
        let mut end = self.max_value_length;
        while end > 0 && !value.is_char_boundary(end) {
            end -= 1;
        }
        Cow::Owned(format!(
            "{}...[truncated {} bytes]",
            &value[..end],
            value.len() - end
        ))
    }
}

fn is_likely_secret(value: &str) -> bool {
    let trimmed = value.trim();

    // JWT: three base64url segments
    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() == 3 && parts.iter().all(|p| p.len() > 10 && is_base64_like(p)) {
        return true;
    }

    const PREFIXES: &[&str] = &[
        "sk-", "pk-", "sk_live_", "sk_test_", "ghp_", "gho_", "ghs_", "xoxb-", "xoxp-", "AKIA",
    ];
    PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix) && trimmed.len() > prefix.len() + 10)
}

fn is_base64_like(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '_' | '-'))
}

/// Escape control characters so a value cannot forge extra log lines.
pub fn sanitize_for_log(input: &str) -> String {
    input
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

/// Describe an input line for logging; content only when enabled.
pub fn format_line_for_log(line: &str, config: &LogConfig) -> String {
    if !config.log_input_lines {
        return format!("[line: {} bytes]", line.len());
    }
    let sanitized = sanitize_for_log(line);
    config.truncate(&sanitized).into_owned()
}
