//! Per-instance configuration: the pluggable policy slots the host fills in.
//!
//! Specializations are built by supplying functions to the generic engine,
//! not by wrapping it: [`ChipConfig::email`] is just a preset bundle of
//! parser, validator, and normalization choices.

use chipline_core::DuplicatePolicy;
use chipline_core::TokenParser;
use chipline_core::Validator;
use chipline_core::default_delimiters;
use chipline_core::default_parser;
use chipline_core::email;
use chipline_suggest::DEFAULT_DEBOUNCE;
use chipline_suggest::SearchError;
use std::sync::Arc;
use std::time::Duration;

pub type FormatFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
pub type SearchErrorHook = Arc<dyn Fn(&SearchError) + Send + Sync>;

pub struct ChipConfig<T = String> {
    pub(crate) parser: TokenParser<T>,
    pub(crate) validator: Validator<T>,
    pub(crate) duplicates: DuplicatePolicy<T>,
    pub(crate) delimiters: Vec<String>,
    pub(crate) debounce: Duration,
    pub(crate) format_value: FormatFn<T>,
    pub(crate) on_search_error: Option<SearchErrorHook>,
}

impl<T> ChipConfig<T> {
    /// Generic constructor. Non-string value types must say how a raw
    /// segment parses and how a value displays; everything else has
    /// type-independent defaults.
    pub fn new(parser: TokenParser<T>, format_value: FormatFn<T>) -> Self
    where
        T: Clone + PartialEq + 'static,
    {
        Self {
            parser,
            validator: Validator::Unset,
            duplicates: DuplicatePolicy::default(),
            delimiters: default_delimiters(),
            debounce: DEFAULT_DEBOUNCE,
            format_value,
            on_search_error: None,
        }
    }

    pub fn with_validator(mut self, validator: Validator<T>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy<T>) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn with_delimiters(mut self, delimiters: Vec<String>) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_parser(mut self, parser: TokenParser<T>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_search_error_hook(
        mut self,
        hook: impl Fn(&SearchError) + Send + Sync + 'static,
    ) -> Self {
        self.on_search_error = Some(Arc::new(hook));
        self
    }
}

impl Default for ChipConfig<String> {
    fn default() -> Self {
        Self::new(default_parser(), Arc::new(String::clone))
    }
}

impl ChipConfig<String> {
    /// Email-flavored preset: `Name <addr>` parsing, shape validation, and
    /// case-insensitive duplicate detection.
    pub fn email() -> Self {
        let parser: TokenParser<String> = Arc::new(email::parse_mailbox);
        Self::new(parser, Arc::new(String::clone))
            .with_validator(Validator::sync(|v: &String| email::looks_like_email(v)))
            .with_duplicates(
                DuplicatePolicy::default().with_normalize(|v: &String| email::normalize_email(v)),
            )
    }
}
