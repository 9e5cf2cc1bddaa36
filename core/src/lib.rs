//! Data model and policy layer for the chip-input engine.
//!
//! This crate is deliberately UI-free: it defines the chip store types and
//! the pluggable policies (token parsing, duplicate detection, validation)
//! that the interaction controller in `chipline-input` composes. Everything
//! here is a pure function of its inputs; the only async surface is the
//! validator, which may await an externally supplied predicate.

mod chip;
pub mod dedupe;
pub mod email;
pub mod token;
pub mod validate;

pub use chip::Chip;
pub use chip::ChipId;
pub use chip::Suggestion;
pub use dedupe::DuplicatePolicy;
pub use token::ParsedToken;
pub use token::TokenParser;
pub use token::contains_delimiter;
pub use token::default_delimiters;
pub use token::default_parser;
pub use token::split_by_delimiters;
pub use validate::Validator;
