//! Shared HTML parsing helpers.
//!
//! Thin layer over `scraper`: document parsing, selector compilation, and
//! the lenient text/number coercions every adapter relies on.

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

/// Parse a full HTML document.
pub fn parse_html(html: &str) -> Html {
    Html::parse_document(html)
}

/// Compile a CSS selector, reporting the offending text on failure.
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid CSS selector '{}': {}", css, e))
}

/// Parse a decimal integer after stripping surrounding whitespace.
///
/// Returns `None` for anything malformed instead of failing, so extraction
/// can degrade field by field.
pub fn safe_int(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

/// The element's text fragments, each trimmed, empty ones dropped, joined
/// without a separator.
pub fn stripped_text(el: &ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First whitespace-delimited token. Non-breaking spaces count as whitespace.
pub fn first_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// True when the token is non-empty and made only of ASCII digits.
pub fn is_all_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Count from text like `"45 comments"`: the first token, only when it is
/// all digits.
pub fn leading_count(text: &str) -> Option<i64> {
    first_token(text).filter(|t| is_all_digits(t)).and_then(safe_int)
}

/// Trimmed `href` attribute, or empty.
pub fn href(el: &ElementRef<'_>) -> String {
    el.value().attr("href").unwrap_or("").trim().to_string()
}

/// Rewrite a site-relative link (`/path`) against `origin`.
pub fn absolutize(link: String, origin: &str) -> String {
    if link.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), link)
    } else {
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_int_accepts_padded_digits() {
        assert_eq!(safe_int(" 42 "), Some(42));
        assert_eq!(safe_int("-3"), Some(-3));
        assert_eq!(safe_int("0"), Some(0));
    }

    #[test]
    fn test_safe_int_rejects_garbage() {
        assert_eq!(safe_int(""), None);
        assert_eq!(safe_int("12a"), None);
        assert_eq!(safe_int("1.5"), None);
        assert_eq!(safe_int("discuss"), None);
    }

    #[test]
    fn test_first_token_splits_on_nbsp() {
        assert_eq!(first_token("45\u{a0}comments"), Some("45"));
        assert_eq!(first_token("   "), None);
    }

    #[test]
    fn test_leading_count() {
        assert_eq!(leading_count("12 comments"), Some(12));
        assert_eq!(leading_count("discuss"), None);
        assert_eq!(leading_count("-1 comments"), None);
    }

    #[test]
    fn test_stripped_text_joins_trimmed_fragments() {
        let doc = parse_html("<div><span> Foo </span>\n <b>Bar</b> </div>");
        let sel = selector("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(stripped_text(&div), "FooBar");
    }

    #[test]
    fn test_selector_reports_invalid_css() {
        let err = selector("div[").unwrap_err().to_string();
        assert!(err.contains("div["));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("/posts/x".to_string(), "https://www.producthunt.com/"),
            "https://www.producthunt.com/posts/x"
        );
        assert_eq!(
            absolutize("https://a.b/c".to_string(), "https://www.producthunt.com"),
            "https://a.b/c"
        );
        assert_eq!(absolutize(String::new(), "https://x"), "");
    }
}
