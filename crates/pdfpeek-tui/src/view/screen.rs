use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use pdfpeek_core::view::ViewSnapshot;
use pdfpeek_core::{FileStatus, Presentation};

use crate::app::App;
use crate::theme::Theme;
use crate::view::{files, preview, spinner_char, text};

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 44;

/// Render the main screen: file strip, metadata, preview and text panels.
pub fn render_in(f: &mut Frame, app: &mut App, area: Rect) {
    let snapshot = ViewSnapshot::build(&app.widget);
    let theme = &app.theme;
    let tick = app.tick;

    let tabbed = snapshot.presentation == Presentation::Tabbed;
    let mut constraints = vec![Constraint::Length(1)]; // header + metadata
    if tabbed {
        constraints.push(Constraint::Length(1)); // tab strip
    }
    constraints.push(Constraint::Min(6)); // panels
    constraints.push(Constraint::Length(1)); // footer
    let chunks = Layout::vertical(constraints).split(area);

    render_header(f, theme, &snapshot, chunks[0]);

    let (strip, body, footer) = if tabbed {
        (Some(chunks[1]), chunks[2], chunks[3])
    } else {
        (None, chunks[1], chunks[2])
    };

    let (list_area, panels) = if tabbed {
        (None, body)
    } else {
        let cols = Layout::horizontal([
            Constraint::Length(SIDEBAR_WIDTH.min(body.width / 3)),
            Constraint::Min(20),
        ])
        .split(body);
        (Some(cols[0]), cols[1])
    };

    let halves = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(panels);

    let hitboxes = match (strip, list_area) {
        (Some(strip), _) => files::render_tabs(f, theme, &snapshot, tick, strip),
        (None, Some(list)) => files::render_sidebar(f, theme, &snapshot, tick, list),
        (None, None) => Vec::new(),
    };
    preview::render_in(f, app, &snapshot, halves[0]);
    let rows = text::render_in(f, theme, &snapshot, app.text_scroll, tick, halves[1]);
    render_footer(f, theme, &snapshot, tick, footer);

    app.hitboxes = hitboxes;
    app.visible_rows = rows;
}

fn render_header(f: &mut Frame, theme: &Theme, snapshot: &ViewSnapshot<'_>, area: Rect) {
    let mut spans = vec![Span::styled(" pdfpeek ", theme.header_style())];
    match &snapshot.meta {
        Some(meta) => {
            spans.push(Span::styled(
                format!(" {}", meta.file_name),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("  {}", meta.size),
                Style::default().fg(theme.dim),
            ));
            if let Some(summary) = &meta.loaded_summary {
                spans.push(Span::styled(
                    format!("  \u{2502} {summary}"),
                    Style::default().fg(theme.active),
                ));
            }
        }
        None => spans.push(Span::styled(
            " Upload a PDF to preview",
            Style::default().fg(theme.dim),
        )),
    }
    spans.push(Span::styled(
        format!("  \u{2502} {}", snapshot.page_indicator),
        Style::default().fg(theme.active),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(
    f: &mut Frame,
    theme: &Theme,
    snapshot: &ViewSnapshot<'_>,
    tick: usize,
    area: Rect,
) {
    let busy = snapshot
        .files
        .iter()
        .filter(|e| matches!(e.status, FileStatus::Pending | FileStatus::Processing))
        .count();

    let mut spans = Vec::new();
    if busy > 0 {
        spans.push(Span::styled(
            format!(" {} {} queued ", spinner_char(tick), busy),
            Style::default().fg(theme.spinner),
        ));
    }
    let keys = if snapshot.presentation == Presentation::Tabbed {
        " o:add  ^W:close  Tab:next  p:pages  j/k:scroll  ?:help  q:quit"
    } else {
        " o:add  ^W:close  Tab:next  j/k:scroll  ?:help  q:quit"
    };
    spans.push(Span::styled(keys, theme.footer_style()));
    spans.push(Span::styled(
        format!("  \u{2502} {}", snapshot.size_hint),
        Style::default().fg(theme.dim),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
