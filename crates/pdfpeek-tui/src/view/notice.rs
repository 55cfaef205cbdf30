use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use crate::theme::Theme;

/// Render a validation message as a blocking popup.
pub fn render(f: &mut Frame, theme: &Theme, message: &str) {
    let area = f.area();
    let width = 56u16.min(area.width);
    let body_rows = message.lines().count() as u16 + 4;
    let popup = centered_rect(width, body_rows.min(area.height), area);

    let mut lines = vec![Line::from("")];
    lines.extend(message.lines().map(|l| {
        Line::from(Span::styled(
            format!("  {l}"),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ))
    }));
    lines.push(Line::from(vec![
        Span::styled(
            "  Enter",
            Style::default()
                .fg(theme.active)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(": OK", Style::default().fg(theme.dim)),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.failed))
                .title(" Notice "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
