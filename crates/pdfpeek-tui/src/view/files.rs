use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use pdfpeek_core::FileStatus;
use pdfpeek_core::view::{FileEntry, ViewSnapshot};

use crate::app::Hitbox;
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

const CLOSE: &str = "\u{00D7}";

fn icon(entry: &FileEntry, tick: usize) -> String {
    match entry.status {
        FileStatus::Processing => spinner_char(tick).to_string(),
        _ => entry.icon().to_string(),
    }
}

fn name_style(entry: &FileEntry, theme: &Theme) -> Style {
    if entry.active {
        Style::default()
            .fg(theme.active)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    }
}

/// Vertical file list. Returns the clickable rows.
pub fn render_sidebar(
    f: &mut Frame,
    theme: &Theme,
    snapshot: &ViewSnapshot<'_>,
    tick: usize,
    area: Rect,
) -> Vec<Hitbox> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(format!(" Files ({}) ", snapshot.files.len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    if snapshot.is_empty() {
        let lines = vec![
            Line::from(Span::styled(" No files", Style::default().fg(theme.dim))),
            Line::from(Span::styled(
                " o: add PDFs",
                Style::default().fg(theme.dim),
            )),
        ];
        f.render_widget(Paragraph::new(lines), inner);
        return Vec::new();
    }

    let height = inner.height as usize;
    let active = snapshot.files.iter().position(|e| e.active).unwrap_or(0);
    let offset = (active + 1).saturating_sub(height);
    let name_width = (inner.width as usize).saturating_sub(14);

    let mut hitboxes = Vec::new();
    let mut lines = Vec::new();
    for (row, entry) in snapshot.files.iter().skip(offset).take(height).enumerate() {
        let y = inner.y + row as u16;
        let base = if entry.active {
            theme.highlight_style()
        } else {
            Style::default()
        };
        lines.push(
            Line::from(vec![
                Span::styled(
                    format!(" {} ", icon(entry, tick)),
                    Style::default().fg(theme.status_color(entry.status)),
                ),
                Span::styled(
                    format!("{:<name_width$}", truncate(&entry.name, name_width)),
                    name_style(entry, theme),
                ),
                Span::styled(format!(" {:>8} ", entry.size), Style::default().fg(theme.dim)),
                Span::styled(CLOSE, Style::default().fg(theme.failed)),
            ])
            .style(base),
        );
        let close_x = inner.right().saturating_sub(2);
        hitboxes.push(Hitbox {
            area: Rect::new(inner.x, y, close_x.saturating_sub(inner.x), 1),
            id: entry.id,
            close: false,
        });
        hitboxes.push(Hitbox {
            area: Rect::new(close_x, y, 2, 1),
            id: entry.id,
            close: true,
        });
    }
    f.render_widget(Paragraph::new(lines), inner);
    hitboxes
}

/// Horizontal tab strip. Tabs that do not fit are dropped from the right,
/// except the active one which always shows.
pub fn render_tabs(
    f: &mut Frame,
    theme: &Theme,
    snapshot: &ViewSnapshot<'_>,
    tick: usize,
    area: Rect,
) -> Vec<Hitbox> {
    if snapshot.is_empty() {
        let hint = Line::from(Span::styled(
            " No PDFs loaded \u{2502} o: add files",
            Style::default().fg(theme.dim),
        ));
        f.render_widget(Paragraph::new(hint), area);
        return Vec::new();
    }

    let mut spans = Vec::new();
    let mut hitboxes = Vec::new();
    let mut x = area.x;
    let active = snapshot.files.iter().position(|e| e.active).unwrap_or(0);
    // Slide the strip so the active tab is visible.
    let mut start = 0;
    while start < active && strip_width(&snapshot.files[start..=active]) > area.width {
        start += 1;
    }

    for entry in &snapshot.files[start..] {
        let label = format!(" {} {} ", icon(entry, tick), entry.name);
        let label_w = label.chars().count() as u16;
        let tab_w = label_w + 2;
        if x + tab_w > area.right() {
            break;
        }
        let style = if entry.active {
            theme.highlight_style()
        } else {
            Style::default()
        };
        spans.push(Span::styled(label, name_style(entry, theme).patch(style)));
        spans.push(Span::styled(
            format!("{CLOSE} "),
            Style::default().fg(theme.failed).patch(style),
        ));
        hitboxes.push(Hitbox {
            area: Rect::new(x, area.y, label_w, 1),
            id: entry.id,
            close: false,
        });
        hitboxes.push(Hitbox {
            area: Rect::new(x + label_w, area.y, 2, 1),
            id: entry.id,
            close: true,
        });
        x += tab_w;
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
    hitboxes
}

fn strip_width(entries: &[FileEntry]) -> u16 {
    entries
        .iter()
        .map(|e| e.name.chars().count() as u16 + 6)
        .sum()
}
