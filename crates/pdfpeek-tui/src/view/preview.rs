//! Page bitmaps drawn with half-block cells.
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};

use pdfpeek_core::Surface;
use pdfpeek_core::view::{PreviewPanel, ViewSnapshot};

use crate::app::App;
use crate::theme::Theme;
use crate::view::spinner_char;

/// Thumbnail width in columns for the all-pages grid.
const THUMB_WIDTH: u16 = 22;

/// A page scaled to fit its area, aspect ratio kept, centered.
pub struct PageImage<'a> {
    surface: &'a Surface,
    canvas: Color,
}

impl<'a> PageImage<'a> {
    pub fn new(surface: &'a Surface, canvas: Color) -> Self {
        Self { surface, canvas }
    }
}

impl Widget for PageImage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let max_w = u32::from(area.width);
        let max_h = u32::from(area.height) * 2;
        let (w, h) = fit(self.surface.width, self.surface.height, max_w, max_h);

        let x0 = area.x + ((max_w - w) / 2) as u16;
        // Centered in whole cells.
        let y0 = area.y + ((max_h - h) / 4) as u16;

        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ').set_bg(self.canvas);
                }
            }
        }

        for row in 0..h.div_ceil(2) {
            for col in 0..w {
                let top = sample(self.surface, col, row * 2, w, h);
                let bottom = (row * 2 + 1 < h).then(|| sample(self.surface, col, row * 2 + 1, w, h));
                let (x, y) = (x0 + col as u16, y0 + row as u16);
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char('\u{2580}')
                        .set_fg(rgb(top))
                        .set_bg(bottom.map(rgb).unwrap_or(self.canvas));
                }
            }
        }
    }
}

/// Largest `(w, h)` with the source aspect ratio inside `max_w × max_h`.
pub fn fit(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let by_width = (max_w, (u64::from(src_h) * u64::from(max_w) / u64::from(src_w)) as u32);
    if by_width.1 <= max_h {
        return (by_width.0, by_width.1.max(1));
    }
    let w = (u64::from(src_w) * u64::from(max_h) / u64::from(src_h)) as u32;
    (w.clamp(1, max_w), max_h)
}

/// Nearest-neighbour sample of the surface at target coordinates.
fn sample(surface: &Surface, x: u32, y: u32, w: u32, h: u32) -> [u8; 3] {
    let sx = (u64::from(x) * u64::from(surface.width) / u64::from(w)) as u32;
    let sy = (u64::from(y) * u64::from(surface.height) / u64::from(h)) as u32;
    surface.pixel(sx, sy)
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

/// Render the preview panel for the active file.
pub fn render_in(f: &mut Frame, app: &App, snapshot: &ViewSnapshot<'_>, area: Rect) {
    let theme = &app.theme;
    let mut title = vec![Span::styled(" Preview ", Style::default().fg(theme.text))];
    if snapshot.presentation == pdfpeek_core::Presentation::Tabbed {
        title.push(Span::styled(
            format!("[{}] ", snapshot.preview_mode.label()),
            Style::default().fg(theme.active),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(Line::from(title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &snapshot.preview {
        PreviewPanel::Image(surface) => {
            f.render_widget(PageImage::new(surface, theme.canvas), inner);
        }
        PreviewPanel::AllPages(pages) => {
            render_grid(f, theme, pages, app.preview_scroll, inner);
        }
        panel => {
            let text = panel.placeholder().unwrap_or_default();
            let busy = matches!(panel, PreviewPanel::Rendering | PreviewPanel::RenderingAll);
            render_placeholder(f, theme, &text, busy.then(|| spinner_char(app.tick)), inner);
        }
    }
}

fn render_placeholder(f: &mut Frame, theme: &Theme, text: &str, spinner: Option<char>, area: Rect) {
    let style = match spinner {
        Some(_) => Style::default().fg(theme.processing),
        None => Style::default().fg(theme.dim),
    };
    let mut spans = Vec::new();
    if let Some(c) = spinner {
        spans.push(Span::styled(format!("{c} "), Style::default().fg(theme.spinner)));
    }
    spans.push(Span::styled(text.to_string(), style));

    let top_pad = area.height.saturating_sub(1) / 2;
    let rows = Layout::vertical([Constraint::Length(top_pad), Constraint::Min(1)]).split(area);
    f.render_widget(
        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[1],
    );
}

/// Thumbnails of every page, left to right, scrolled by whole grid rows.
fn render_grid(f: &mut Frame, theme: &Theme, pages: &[Surface], scroll: usize, area: Rect) {
    let Some(first) = pages.first() else {
        return;
    };
    let cols = (area.width / (THUMB_WIDTH + 1)).max(1) as usize;
    let thumb_w = THUMB_WIDTH.min(area.width);
    let (_, px_h) = fit(first.width, first.height, u32::from(thumb_w), u32::MAX / 2);
    // Image rows plus one label row.
    let thumb_h = (px_h.div_ceil(2) as u16).clamp(1, area.height.max(2) - 1) + 1;

    let grid_rows = pages.len().div_ceil(cols);
    let scroll = scroll.min(grid_rows.saturating_sub(1));

    for (i, page) in pages.iter().enumerate().skip(scroll * cols) {
        let row = (i / cols - scroll) as u16;
        let col = (i % cols) as u16;
        let y = area.y + row * thumb_h;
        if y + thumb_h > area.bottom() {
            break;
        }
        let cell = Rect::new(area.x + col * (THUMB_WIDTH + 1), y, thumb_w, thumb_h);
        let image = Rect::new(cell.x, cell.y, cell.width, cell.height - 1);
        f.render_widget(PageImage::new(page, theme.canvas), image);

        let label = Rect::new(cell.x, cell.bottom() - 1, cell.width, 1);
        f.render_widget(
            Paragraph::new(format!("Page {}", i + 1))
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.dim).add_modifier(Modifier::ITALIC)),
            label,
        );
    }
}
