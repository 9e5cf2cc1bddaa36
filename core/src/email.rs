//! Email-flavored policy functions.
//!
//! These feed the generic engine (parser/normalize/validator slots in the
//! input configuration); there is no email-specific controller.

use crate::token::ParsedToken;
use regex_lite::Regex;
use std::sync::OnceLock;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    #[expect(clippy::unwrap_used)]
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

/// Parse a mailbox in either `addr` or `Name <addr>` form.
///
/// The display name becomes the chip label; surrounding quotes on the name
/// are dropped. Empty or whitespace-only input (or an empty address inside
/// the angle brackets) parses to `None`.
pub fn parse_mailbox(raw: &str) -> Option<ParsedToken<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(open) = trimmed.find('<')
        && let Some(rest) = trimmed.get(open + 1..)
        && let Some(addr) = rest.strip_suffix('>')
    {
        let addr = addr.trim();
        if addr.is_empty() {
            return None;
        }
        let name = trimmed[..open].trim().trim_matches('"').trim();
        let mut token = ParsedToken::new(addr.to_string());
        if !name.is_empty() {
            token = token.with_label(name);
        }
        return Some(token);
    }
    Some(ParsedToken::new(trimmed.to_string()))
}

/// Conservative shape check: one `@`, no whitespace, a dotted domain.
pub fn looks_like_email(value: &str) -> bool {
    email_re().is_match(value.trim())
}

/// Case-insensitive comparison key for addresses.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_address_has_no_label() {
        assert_eq!(
            parse_mailbox(" a@b.com "),
            Some(ParsedToken::new("a@b.com".to_string())),
        );
    }

    #[test]
    fn mailbox_with_display_name() {
        assert_eq!(
            parse_mailbox("Ada Lovelace <ada@ok.com>"),
            Some(ParsedToken::new("ada@ok.com".to_string()).with_label("Ada Lovelace")),
        );
    }

    #[test]
    fn quoted_display_name_is_unquoted() {
        assert_eq!(
            parse_mailbox("\"Lovelace, Ada\" <ada@ok.com>"),
            Some(ParsedToken::new("ada@ok.com".to_string()).with_label("Lovelace, Ada")),
        );
    }

    #[test]
    fn empty_angle_address_is_rejected() {
        assert_eq!(parse_mailbox("Ada <>"), None);
        assert_eq!(parse_mailbox("   "), None);
    }

    #[test]
    fn email_shape_check() {
        assert!(looks_like_email("a@b.com"));
        assert!(looks_like_email("  first.last@sub.example.org "));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("not an email"));
        assert!(!looks_like_email("two@@x.com@y.com extra"));
    }

    #[test]
    fn normalization_lowercases_and_trims() {
        assert_eq!(normalize_email(" A@B.CoM "), "a@b.com");
    }
}
