//! Small string and date helpers shared by the adapters and the front end.

use crate::models::Article;
use chrono::{DateTime, Local};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// First `max_chars` characters of `text` followed by `"..."`.
///
/// Used to derive a description from a full body. Counts characters, not
/// bytes, so multi-byte text is never split.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

/// Empty or whitespace-only strings count as missing.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Human-readable publication date, or `"Unknown date"` when unparsable.
pub fn display_date(article: &Article) -> String {
    match article.published() {
        Some(dt) => {
            let local: DateTime<Local> = dt.with_timezone(&Local);
            local.format("%b %-d, %Y %H:%M").to_string()
        }
        None => "Unknown date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::article_fixture;

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundaries() {
        let result = truncate_for_log("ééé", 3);
        assert_eq!(result, "é…(+4 bytes)");
    }

    #[test]
    fn test_excerpt_counts_chars() {
        let body = "ü".repeat(300);
        let out = excerpt(&body, 200);
        assert_eq!(out.chars().count(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(excerpt("short", 200), "short...");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("x")), Some("x"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_display_date_unknown() {
        let article = article_fixture("a", "not a date");
        assert_eq!(display_date(&article), "Unknown date");
        let dated = article_fixture("b", "2024-03-15T12:00:00Z");
        assert!(display_date(&dated).contains("2024"));
    }
}
