pub mod file_picker;
pub mod files;
pub mod help;
pub mod notice;
pub mod preview;
pub mod screen;
pub mod text;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Spinner frames for animated progress indication.
const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

/// Get the current spinner character based on a tick counter.
pub fn spinner_char(tick: usize) -> char {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

/// Truncate a string to fit in `max_width` columns, appending "\u{2026}" if truncated.
pub fn truncate(s: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    truncated.push('\u{2026}');
    truncated
}

/// Create a centered rectangle of the given width (columns) and height (rows).
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area);
    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(vertical[0])[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("résumé.pdf", 10), "résumé.pdf");
        assert_eq!(truncate("résumé.pdf", 4), "rés\u{2026}");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn spinner_wraps() {
        assert_eq!(spinner_char(0), spinner_char(SPINNER_FRAMES.len()));
    }

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_rect(10, 4, area);
        assert_eq!(popup, Rect::new(5, 3, 10, 4));
    }
}
