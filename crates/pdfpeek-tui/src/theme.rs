use ratatui::style::{Color, Modifier, Style};

use pdfpeek_core::FileStatus;

/// Color theme for the TUI.
pub struct Theme {
    pub completed: Color,
    pub failed: Color,
    pub processing: Color,
    pub pending: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
    /// Background behind rendered pages.
    pub canvas: Color,
}

impl Theme {
    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            completed: Color::Rgb(0, 210, 0),
            failed: Color::Red,
            processing: Color::Cyan,
            pending: Color::DarkGray,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
            canvas: Color::Rgb(20, 20, 20),
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            completed: Color::Rgb(0, 200, 80),
            failed: Color::Rgb(255, 80, 80),
            processing: Color::Rgb(60, 140, 255),
            pending: Color::Rgb(80, 80, 100),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
            canvas: Color::Rgb(24, 26, 36),
        }
    }

    /// Look a theme up by name, falling back to hacker.
    pub fn by_name(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    pub fn status_color(&self, status: FileStatus) -> Color {
        match status {
            FileStatus::Pending => self.pending,
            FileStatus::Processing => self.processing,
            FileStatus::Completed => self.completed,
            FileStatus::Error => self.failed,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
