//! Escape sequence decoding for extracted values
//!
//! Supported: `\n \t \r \0 \\ \' \"`, `\xHH`, `\uHHHH`, `\u{H..}`.
//! Unknown escapes are kept as written, backslash included.

use crate::error::{Error, Result};
use std::borrow::Cow;

/// Decode escape sequences in `text`.
///
/// Returns the input unchanged (borrowed) when it contains no backslash.
pub fn unescape(text: &str) -> Result<Cow<'_, str>> {
    if !text.contains('\\') {
        return Ok(Cow::Borrowed(text));
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                out.push(decode_hex(&hex, 2, "\\x")?);
            }
            Some('u') => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut hex = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => hex.push(c),
                            None => {
                                return Err(Error::InvalidEscape(format!("\\u{{{hex}")));
                            }
                        }
                    }
                    if hex.is_empty() || hex.len() > 6 {
                        return Err(Error::InvalidEscape(format!("\\u{{{hex}}}")));
                    }
                    out.push(decode_hex(&hex, hex.len(), "\\u")?);
                } else {
                    let hex: String = chars.by_ref().take(4).collect();
                    out.push(decode_hex(&hex, 4, "\\u")?);
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    Ok(Cow::Owned(out))
}

fn decode_hex(hex: &str, len: usize, prefix: &str) -> Result<char> {
    let invalid = || Error::InvalidEscape(format!("{prefix}{hex}"));
    if hex.len() != len || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    u32::from_str_radix(hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(invalid)
}
