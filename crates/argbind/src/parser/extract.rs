//! Extraction engine: entries → positionals + keywords
//!
//! Works on already-split entries, either tokenizer output or a caller's own
//! argv-like list. Because raw entries may still carry quotes, an entry that
//! opens a quote without closing it starts a span that swallows following
//! entries until one ends with the same quote.
//!
//! Keyword spellings, checked in order for each entry:
//!
//! | Entries            | Meaning                                      |
//! |--------------------|----------------------------------------------|
//! | `name` `=` `value` | standalone `=` reclaims the prior positional |
//! | `name=` `value`    | trailing `=`, value is the next entry        |
//! | `name=value`       | split at the first `=`                       |
//! | `=value`           | positional text                              |

use super::unescape::unescape;
use crate::error::{Error, Result};
use crate::options::{DuplicatePolicy, ParseOptions};
use serde::Serialize;
use std::collections::BTreeMap;

/// Extraction output: positional strings in order plus keyword assignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawArguments {
    pub positionals: Vec<String>,
    pub keywords: BTreeMap<String, String>,
}

impl RawArguments {
    /// True when neither positionals nor keywords were given.
    pub fn is_empty(&self) -> bool {
        self.positionals.is_empty() && self.keywords.is_empty()
    }
}

/// A quoted span spread over several entries.
struct OpenSpan {
    quote: char,
    parts: Vec<String>,
}

/// Splits entries into positionals and keywords according to [`ParseOptions`].
pub struct Extractor<'o> {
    options: &'o ParseOptions,
}

impl<'o> Extractor<'o> {
    pub fn new(options: &'o ParseOptions) -> Self {
        Self { options }
    }

    /// Extract positionals and keywords from `entries`.
    pub fn extract<I, S>(&self, entries: I) -> Result<RawArguments>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let spec = self.options.equality_specifier.as_str();
        let mut out = RawArguments::default();
        let mut span: Option<OpenSpan> = None;
        let mut pending_keyword: Option<String> = None;

        for entry in entries {
            let entry = entry.as_ref();

            if let Some(keyword) = pending_keyword.take() {
                if entry.is_empty() {
                    pending_keyword = Some(keyword);
                } else {
                    self.insert_keyword(&mut out, keyword, entry.to_string())?;
                }
                continue;
            }

            if let Some(mut open) = span.take() {
                match entry.strip_suffix(open.quote) {
                    Some(body) => {
                        open.parts.push(body.to_string());
                        out.positionals.push(open.parts.join(" "));
                    }
                    None => {
                        open.parts.push(entry.to_string());
                        span = Some(open);
                    }
                }
                continue;
            }

            if let Some(quote) = entry.chars().next().filter(|c| self.options.is_quote(*c)) {
                let body = &entry[quote.len_utf8()..];
                match body.strip_suffix(quote) {
                    Some(inner) if !body.is_empty() => out.positionals.push(inner.to_string()),
                    _ => {
                        span = Some(OpenSpan {
                            quote,
                            parts: vec![body.to_string()],
                        })
                    }
                }
                continue;
            }

            if entry.is_empty() {
                continue;
            }

            // An empty specifier disables keyword recognition
            if !spec.is_empty() {
                if entry == spec {
                    if let Some(name) = out.positionals.pop() {
                        pending_keyword = Some(name);
                        continue;
                    }
                } else if !entry.starts_with(spec) {
                    if let Some(name) = entry.strip_suffix(spec) {
                        pending_keyword = Some(name.to_string());
                        continue;
                    }
                    if let Some((name, value)) = entry.split_once(spec) {
                        self.insert_keyword(&mut out, name.to_string(), value.to_string())?;
                        continue;
                    }
                }
            }

            out.positionals.push(entry.to_string());
        }

        if let Some(open) = span {
            return Err(Error::UnterminatedQuote {
                quote: open.quote,
                position: None,
            });
        }
        if let Some(keyword) = pending_keyword {
            return Err(Error::DanglingKeyword(keyword));
        }

        if self.options.process_escapes {
            out = decode_escapes(out)?;
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            positionals = out.positionals.len(),
            keywords = ?out.keywords.keys().collect::<Vec<_>>(),
            "extracted arguments"
        );

        Ok(out)
    }

    fn insert_keyword(&self, out: &mut RawArguments, name: String, value: String) -> Result<()> {
        if out.keywords.contains_key(&name) {
            match self.options.duplicate_keywords {
                DuplicatePolicy::Reject => return Err(Error::DuplicateKeyword(name)),
                DuplicatePolicy::LastWins => {
                    #[cfg(feature = "logging")]
                    tracing::warn!(keyword = %name, "keyword given twice, keeping last value");
                }
            }
        }
        out.keywords.insert(name, value);
        Ok(())
    }
}

fn decode_escapes(raw: RawArguments) -> Result<RawArguments> {
    let positionals = raw
        .positionals
        .iter()
        .map(|p| unescape(p).map(|v| v.into_owned()))
        .collect::<Result<Vec<_>>>()?;
    let keywords = raw
        .keywords
        .iter()
        .map(|(k, v)| unescape(v).map(|v| (k.clone(), v.into_owned())))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(RawArguments {
        positionals,
        keywords,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(entries: &[&str]) -> Result<RawArguments> {
        Extractor::new(&ParseOptions::default()).extract(entries)
    }

    fn raw(positionals: &[&str], keywords: &[(&str, &str)]) -> RawArguments {
        RawArguments {
            positionals: positionals.iter().map(|s| s.to_string()).collect(),
            keywords: keywords
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_inline_keyword() {
        assert_eq!(
            extract(&["run", "count=5"]).unwrap(),
            raw(&["run"], &[("count", "5")])
        );
    }

    #[test]
    fn test_standalone_equals_reclaims_positional() {
        assert_eq!(
            extract(&["run", "count", "=", "5"]).unwrap(),
            raw(&["run"], &[("count", "5")])
        );
    }

    #[test]
    fn test_trailing_equals_takes_next_entry() {
        assert_eq!(
            extract(&["run", "count=", "5"]).unwrap(),
            raw(&["run"], &[("count", "5")])
        );
    }

    #[test]
    fn test_leading_equals_value_split() {
        // `name =value` arrives as `name`, `=value`: the second entry is positional
        assert_eq!(
            extract(&["run", "count", "=5"]).unwrap(),
            raw(&["run", "count", "=5"], &[])
        );
    }

    #[test]
    fn test_split_at_first_specifier() {
        assert_eq!(
            extract(&["expr=a=b"]).unwrap(),
            raw(&[], &[("expr", "a=b")])
        );
    }

    #[test]
    fn test_value_taken_verbatim() {
        assert_eq!(
            extract(&["name", "=", "count=3"]).unwrap(),
            raw(&[], &[("name", "count=3")])
        );
    }

    #[test]
    fn test_lone_equals_is_positional() {
        assert_eq!(extract(&["="]).unwrap(), raw(&["="], &[]));
    }

    #[test]
    fn test_dangling_keyword() {
        assert!(matches!(
            extract(&["run", "count", "="]),
            Err(Error::DanglingKeyword(k)) if k == "count"
        ));
        assert!(matches!(
            extract(&["run", "count="]),
            Err(Error::DanglingKeyword(k)) if k == "count"
        ));
        assert!(matches!(
            extract(&["count=", ""]),
            Err(Error::DanglingKeyword(_))
        ));
    }

    #[test]
    fn test_empty_entries_skipped() {
        assert_eq!(
            extract(&["", "a", "", "count=", "", "5"]).unwrap(),
            raw(&["a"], &[("count", "5")])
        );
    }

    #[test]
    fn test_quoted_span_across_entries() {
        assert_eq!(
            extract(&["say", "\"hello", "big", "world\""]).unwrap(),
            raw(&["say", "hello big world"], &[])
        );
    }

    #[test]
    fn test_quoted_single_entry() {
        assert_eq!(
            extract(&["'a=b'", "\"\""]).unwrap(),
            raw(&["a=b", ""], &[])
        );
    }

    #[test]
    fn test_lone_quote_entries() {
        assert_eq!(
            extract(&["\"", "a", "\""]).unwrap(),
            raw(&[" a "], &[])
        );
    }

    #[test]
    fn test_span_closing_with_bare_quote() {
        assert_eq!(
            extract(&["'a", "b", "'"]).unwrap(),
            raw(&["a b "], &[])
        );
    }

    #[test]
    fn test_span_ignores_keyword_syntax() {
        assert_eq!(
            extract(&["'x", "n=1'"]).unwrap(),
            raw(&["x n=1"], &[])
        );
    }

    #[test]
    fn test_unterminated_span() {
        assert!(matches!(
            extract(&["'a", "b"]),
            Err(Error::UnterminatedQuote {
                quote: '\'',
                position: None
            })
        ));
    }

    #[test]
    fn test_duplicate_keyword_rejected_by_default() {
        assert!(matches!(
            extract(&["n=1", "n=2"]),
            Err(Error::DuplicateKeyword(k)) if k == "n"
        ));
    }

    #[test]
    fn test_duplicate_keyword_last_wins() {
        let options = ParseOptions::new().duplicate_keywords(DuplicatePolicy::LastWins);
        let out = Extractor::new(&options).extract(["n=1", "n", "=", "2"]).unwrap();
        assert_eq!(out, raw(&[], &[("n", "2")]));
    }

    #[test]
    fn test_custom_specifier() {
        let options = ParseOptions::new().equality_specifier(":=");
        let out = Extractor::new(&options)
            .extract(["a:=1", "b=2", "c", ":=", "3"])
            .unwrap();
        assert_eq!(out, raw(&["b=2"], &[("a", "1"), ("c", "3")]));
    }

    #[test]
    fn test_empty_specifier_disables_keywords() {
        let options = ParseOptions::new().equality_specifier("");
        let out = Extractor::new(&options).extract(["a=1", "b"]).unwrap();
        assert_eq!(out, raw(&["a=1", "b"], &[]));
    }

    #[test]
    fn test_process_escapes() {
        let options = ParseOptions::new().process_escapes(true);
        let out = Extractor::new(&options)
            .extract([r"a\tb", r"sep=\n"])
            .unwrap();
        assert_eq!(out, raw(&["a\tb"], &[("sep", "\n")]));
    }

    #[test]
    fn test_is_empty() {
        assert!(extract(&[]).unwrap().is_empty());
        assert!(!extract(&["a"]).unwrap().is_empty());
    }
}
