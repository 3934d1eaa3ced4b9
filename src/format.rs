//! Markdown-lite formatting for assistant replies
//!
//! Only three constructs are recognized: `**bold**` spans, `* ` bullets at
//! the start of a line, and newlines. The transforms are not idempotent, so
//! format each raw message exactly once.

use colored::Colorize;
use regex::Regex;
use std::sync::OnceLock;

/// Bullet glyph substituted for a leading `* `
pub const BULLET: &str = "• ";

fn bold_pattern() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"))
}

fn bullet_pattern() -> &'static Regex {
    static BULLET_LINE: OnceLock<Regex> = OnceLock::new();
    BULLET_LINE.get_or_init(|| Regex::new(r"(?m)^\* ").expect("bullet pattern is valid"))
}

/// Convert an assistant reply to HTML-style markup
///
/// Bold spans are replaced first (non-greedy, left to right, never crossing
/// a line), then leading `* ` bullets, then every `\n` becomes `<br/>`.
///
/// # Examples
///
/// ```
/// use chatline::format::format_ai_message;
///
/// let html = format_ai_message("**bold** line1\n* item");
/// assert_eq!(html, "<strong>bold</strong> line1<br/>• item");
/// ```
pub fn format_ai_message(content: &str) -> String {
    let bolded = bold_pattern().replace_all(content, "<strong>$1</strong>");
    let bulleted = bullet_pattern().replace_all(&bolded, BULLET);
    bulleted.replace('\n', "<br/>")
}

/// Render an assistant reply for a terminal
///
/// Same rules as [`format_ai_message`], with bold spans emitted as ANSI bold
/// and newlines left in place.
pub fn render_ai_message_ansi(content: &str) -> String {
    let bolded = bold_pattern().replace_all(content, |caps: &regex::Captures<'_>| {
        caps[1].bold().to_string()
    });
    bullet_pattern().replace_all(&bolded, BULLET).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_line_break_and_bullet_in_order() {
        let html = format_ai_message("**bold** line1\n* item");
        let strong = html.find("<strong>bold</strong>").unwrap();
        let br = html.find("<br/>").unwrap();
        let bullet = html.find("• item").unwrap();
        assert!(strong < br && br < bullet);
        assert_eq!(html, "<strong>bold</strong> line1<br/>• item");
    }

    #[test]
    fn test_bold_is_non_greedy() {
        assert_eq!(
            format_ai_message("**a** and **b**"),
            "<strong>a</strong> and <strong>b</strong>"
        );
    }

    #[test]
    fn test_unpaired_markers_are_left_alone() {
        assert_eq!(format_ai_message("**open only"), "**open only");
    }

    #[test]
    fn test_bold_does_not_cross_lines() {
        assert_eq!(format_ai_message("**a\nb**"), "**a<br/>b**");
    }

    #[test]
    fn test_bullet_only_at_line_start() {
        assert_eq!(
            format_ai_message("* one\n* two\nnot * three"),
            "• one<br/>• two<br/>not * three"
        );
    }

    #[test]
    fn test_bullet_requires_space() {
        assert_eq!(format_ai_message("*emphasis*"), "*emphasis*");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(format_ai_message("hello world"), "hello world");
    }

    #[test]
    fn test_reformatting_markup_without_markers_is_stable() {
        let once = format_ai_message("**x**");
        assert_eq!(format_ai_message(&once), once);
    }

    #[test]
    fn test_ansi_render_keeps_newlines_and_bullets() {
        colored::control::set_override(false);
        let rendered = render_ai_message_ansi("**bold** line1\n* item");
        assert_eq!(rendered, "bold line1\n• item");
    }
}
