//! Reusable line builders and small widgets for the dashboard panels.

pub mod bar_chart;
pub mod header;
pub mod heatmap;
pub mod hour_chart;
pub mod panel;
pub mod progress_bar;
pub mod summary_cards;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Pad or truncate `text` to exactly `width` display columns.
///
/// Truncated labels end in `…` so wide (CJK, emoji) names never break the
/// column alignment of the charts.
pub fn fit_label(text: &str, width: usize) -> String {
    let text_width = UnicodeWidthStr::width(text);
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Display label for an identifier, with blanks shown as `(blank)`.
pub fn display_key(key: &str) -> &str {
    if key.is_empty() {
        "(blank)"
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_label_pads() {
        assert_eq!(fit_label("abc", 5), "abc  ");
        assert_eq!(fit_label("abc", 3), "abc");
    }

    #[test]
    fn test_fit_label_truncates() {
        assert_eq!(fit_label("abcdef", 4), "abc…");
        assert_eq!(fit_label("abcdef", 0), "");
    }

    #[test]
    fn test_fit_label_wide_chars() {
        let out = fit_label("日本語テキスト", 6);
        assert_eq!(UnicodeWidthStr::width(out.as_str()), 6);
        assert!(out.starts_with("日本"));
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key(""), "(blank)");
        assert_eq!(display_key("alice"), "alice");
    }
}
