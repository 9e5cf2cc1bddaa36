//! Raw-input tokenization: the parser contract and delimiter handling.

use regex_lite::Regex;
use std::sync::Arc;

/// A candidate token produced by a parser, before duplicate detection and
/// validation have run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToken<T = String> {
    pub value: T,
    pub label: Option<String>,
}

impl<T> ParsedToken<T> {
    pub fn new(value: T) -> Self {
        Self { value, label: None }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Turns one raw input segment into a candidate token, or `None` to silently
/// drop it. Invoked once per delimiter-split segment when several tokens are
/// created from a single input.
pub type TokenParser<T> = Arc<dyn Fn(&str) -> Option<ParsedToken<T>> + Send + Sync>;

/// The stock parser: trim, drop empty, keep the rest verbatim.
pub fn default_parser() -> TokenParser<String> {
    Arc::new(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(ParsedToken::new(trimmed.to_string()))
        }
    })
}

/// Comma and semicolon, the delimiters used when the host configures none.
pub fn default_delimiters() -> Vec<String> {
    vec![",".to_string(), ";".to_string()]
}

/// True iff any delimiter occurs in `input` as a substring.
pub fn contains_delimiter(input: &str, delimiters: &[String]) -> bool {
    delimiters
        .iter()
        .any(|d| !d.is_empty() && input.contains(d.as_str()))
}

/// Split `input` on any of the configured delimiters, trimming each segment
/// and discarding empty ones, so consecutive delimiters and padding never
/// produce empty tokens.
///
/// Delimiters are regex-escaped before the split pattern is built, so `.`
/// or `|` delimiters behave as literals.
pub fn split_by_delimiters(input: &str, delimiters: &[String]) -> Vec<String> {
    let pattern = delimiters
        .iter()
        .filter(|d| !d.is_empty())
        .map(|d| regex_lite::escape(d))
        .collect::<Vec<_>>()
        .join("|");
    if pattern.is_empty() {
        return trimmed_segments([input]);
    }
    match Regex::new(&pattern) {
        Ok(re) => trimmed_segments(re.split(input)),
        Err(err) => {
            // Escaped literals should always compile; treat a failure as
            // "no delimiters" rather than dropping the user's input.
            tracing::warn!("delimiter pattern failed to compile: {err}");
            trimmed_segments([input])
        }
    }
}

fn trimmed_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
