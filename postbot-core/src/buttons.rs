//! Parsing of user-typed URL buttons.
//!
//! One button per line, `Label - https://example.com`. The reply `skip` (any case) means no buttons.

use crate::draft::UrlButton;

/// Separator between label and URL on a button line.
pub const BUTTON_SEPARATOR: &str = " - ";

/// Reply that declines URL buttons.
pub const SKIP_KEYWORD: &str = "skip";

/// Parses button lines into rows of one button each, in input order.
///
/// Lines that do not split into at least two parts on [`BUTTON_SEPARATOR`], or whose label or URL
/// is blank, are discarded. Only the first two parts are used: a URL that itself contains
/// `" - "` is cut at that point (known limitation, kept for compatibility with existing posts).
pub fn parse_button_lines(text: &str) -> Vec<Vec<UrlButton>> {
    if text.trim().eq_ignore_ascii_case(SKIP_KEYWORD) {
        return Vec::new();
    }

    text.split('\n')
        .filter_map(|line| {
            let parts: Vec<&str> = line.split(BUTTON_SEPARATOR).collect();
            if parts.len() < 2 {
                return None;
            }
            let label = parts[0].trim();
            let url = parts[1].trim();
            if label.is_empty() || url.is_empty() {
                return None;
            }
            Some(vec![UrlButton::new(label, url)])
        })
        .collect()
}
