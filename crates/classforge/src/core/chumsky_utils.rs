//! Shared chumsky parser utilities for label decoding

use chumsky::prelude::*;

/// Parse inline whitespace only (spaces and tabs, no newlines).
///
/// Labels are decoded one line at a time, so a newline never appears inside
/// a token we care about.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse a decimal unsigned integer that fits in `u32`.
///
/// Yields `None` on overflow instead of failing, so callers can degrade to a
/// default rather than reject the whole label.
pub fn unsigned<'src>() -> impl Parser<'src, &'src str, Option<u32>> + Clone {
    text::int(10).map(|digits: &str| digits.parse::<u32>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_whitespace() {
        let parser = inline_whitespace().then(just("test")).then_ignore(end());
        assert!(parser.parse("test").into_result().is_ok());
        assert!(parser.parse(" test").into_result().is_ok());
        assert!(parser.parse("\ttest").into_result().is_ok());
        // Should NOT consume newlines
        assert!(parser.parse("\ntest").into_result().is_err());
    }

    #[test]
    fn test_unsigned() {
        let parser = unsigned().then_ignore(end());
        assert_eq!(parser.parse("42").into_result().ok(), Some(Some(42)));
        assert_eq!(parser.parse("0").into_result().ok(), Some(Some(0)));
        assert_eq!(parser.parse("99999999999").into_result().ok(), Some(None));
        assert!(parser.parse("x").into_result().is_err());
    }
}
