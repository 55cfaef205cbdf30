use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use crate::theme::Theme;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let area = f.area();
    let popup = centered_rect(60, 30, area);

    let lines = vec![
        Line::from(Span::styled(
            " Keyboard Shortcuts ",
            Style::default()
                .fg(theme.header_fg)
                .bg(theme.header_bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section_header("Files", theme),
        key_line("o / a", "Open file picker", theme),
        key_line("Ctrl+w", "Close active file", theme),
        key_line("Tab / Ctrl+Tab", "Next file", theme),
        key_line("p", "First page / all pages (tabbed)", theme),
        Line::from(""),
        section_header("Text", theme),
        key_line("j / \u{2193}", "Scroll down", theme),
        key_line("k / \u{2191}", "Scroll up", theme),
        key_line("Ctrl+d / PgDn", "Page down", theme),
        key_line("Ctrl+u / PgUp", "Page up", theme),
        key_line("g / G", "Top / bottom", theme),
        key_line("J / K", "Scroll page thumbnails", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("Enter / Esc", "Dismiss message", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
        Line::from(""),
        section_header("Mouse", theme),
        key_line("Click", "Select file / \u{00D7} closes it", theme),
        key_line("Drag & drop", "Drop PDFs onto the terminal", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
