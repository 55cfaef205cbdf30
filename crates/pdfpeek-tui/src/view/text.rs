use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use pdfpeek_core::view::{TextPanel, ViewSnapshot};

use crate::theme::Theme;
use crate::view::spinner_char;

/// Render the extracted-text panel. Returns the number of visible rows.
pub fn render_in(
    f: &mut Frame,
    theme: &Theme,
    snapshot: &ViewSnapshot<'_>,
    scroll: u16,
    tick: usize,
    area: Rect,
) -> usize {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Extracted text ");
    let inner = block.inner(area);

    let body = snapshot.text.render_text();
    let paragraph = match &snapshot.text {
        TextPanel::Text(_) => Paragraph::new(body)
            .style(Style::default().fg(theme.text))
            .scroll((scroll, 0)),
        TextPanel::Processing { .. } | TextPanel::Extracting => {
            Paragraph::new(Line::from(vec![
                Span::styled(
                    format!("{} ", spinner_char(tick)),
                    Style::default().fg(theme.spinner),
                ),
                Span::styled(body, Style::default().fg(theme.processing)),
            ]))
        }
        TextPanel::Error(_) => Paragraph::new(body).style(
            Style::default()
                .fg(theme.failed)
                .add_modifier(Modifier::BOLD),
        ),
        TextPanel::Placeholder => Paragraph::new(body).style(Style::default().fg(theme.dim)),
    };

    f.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
    inner.height as usize
}
