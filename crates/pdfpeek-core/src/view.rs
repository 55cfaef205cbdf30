//! Pure derivation of what the screen should show.
//!
//! [`ViewSnapshot::build`] reads the widget state and nothing else, so two
//! builds from the same state are equal and an empty widget always yields
//! the startup snapshot.

use crate::intake::Notice;
use crate::record::{AllPagesState, FileRecord, FileStatus, PreviewState};
use crate::render::Surface;
use crate::widget::{Presentation, PreviewMode, WidgetState};
use crate::{FileId, format_file_size, page_label, truncate_filename};

pub const EMPTY_PREVIEW: &str = "\u{23FA} No PDF loaded \u{2014} upload to preview";
pub const PREVIEW_UNAVAILABLE: &str = "\u{23FA} Preview not available";
pub const EMPTY_TEXT_PANEL: &str = "\u{2B05} Upload a PDF to extract & display text";
pub const EXTRACTING: &str = "\u{23F3} Extracting text...";

/// Longest file name shown in the file strip.
pub const FILE_NAME_WIDTH: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaStrip {
    pub file_name: String,
    pub size: String,
    /// "{n} PDFs selected" in the sidebar presentation with several files.
    pub loaded_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPanel<'a> {
    Empty,
    Rendering,
    Image(&'a Surface),
    AllPages(&'a [Surface]),
    RenderingAll,
    Unavailable,
    Failed(String),
}

impl PreviewPanel<'_> {
    /// Placeholder text for panels that carry no bitmap.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            Self::Empty => Some(EMPTY_PREVIEW.to_string()),
            Self::Rendering => Some("\u{23F3} Rendering preview...".to_string()),
            Self::RenderingAll => Some("\u{23F3} Rendering all pages...".to_string()),
            Self::Unavailable => Some(PREVIEW_UNAVAILABLE.to_string()),
            Self::Failed(message) => Some(message.clone()),
            Self::Image(_) | Self::AllPages(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextPanel<'a> {
    Placeholder,
    Processing { name: String },
    Extracting,
    Text(&'a str),
    Error(String),
}

impl TextPanel<'_> {
    pub fn render_text(&self) -> String {
        match self {
            Self::Placeholder => EMPTY_TEXT_PANEL.to_string(),
            Self::Processing { name } => format!("\u{23F3} Processing {}...", name),
            Self::Extracting => EXTRACTING.to_string(),
            Self::Text(text) => text.to_string(),
            Self::Error(message) => format!("\u{274C} Failed to extract text: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub id: FileId,
    pub name: String,
    pub full_name: String,
    pub size: String,
    pub status: FileStatus,
    pub active: bool,
}

impl FileEntry {
    pub fn icon(&self) -> &'static str {
        status_icon(self.status)
    }
}

pub fn status_icon(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Pending => "\u{25CB}",
        FileStatus::Processing => "\u{25D0}",
        FileStatus::Completed => "\u{2714}",
        FileStatus::Error => "\u{2718}",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot<'a> {
    pub presentation: Presentation,
    pub preview_mode: PreviewMode,
    pub meta: Option<MetaStrip>,
    pub preview: PreviewPanel<'a>,
    pub text: TextPanel<'a>,
    pub page_indicator: String,
    pub files: Vec<FileEntry>,
    pub notice: Option<&'a Notice>,
    pub size_hint: String,
}

impl<'a> ViewSnapshot<'a> {
    pub fn build(state: &'a WidgetState) -> Self {
        let registry = state.registry();
        let active = registry.active();

        let files = registry
            .records()
            .iter()
            .map(|r| FileEntry {
                id: r.id,
                name: truncate_filename(&r.name, FILE_NAME_WIDTH),
                full_name: r.name.clone(),
                size: format_file_size(r.size_bytes),
                status: r.status(),
                active: registry.is_active(r.id),
            })
            .collect();

        let meta = active.map(|r| MetaStrip {
            file_name: r.name.clone(),
            size: format_file_size(r.size_bytes),
            loaded_summary: (state.presentation() == Presentation::Sidebar
                && registry.len() > 1)
                .then(|| format!("{} PDFs selected", registry.len())),
        });

        Self {
            presentation: state.presentation(),
            preview_mode: state.preview_mode(),
            meta,
            preview: active.map_or(PreviewPanel::Empty, |r| {
                preview_panel(r, state.preview_mode())
            }),
            text: active.map_or(TextPanel::Placeholder, text_panel),
            page_indicator: active.map_or_else(|| "ready".to_string(), page_indicator),
            files,
            notice: state.notice(),
            size_hint: state.policy().hint(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn preview_panel(record: &FileRecord, mode: PreviewMode) -> PreviewPanel<'_> {
    match mode {
        PreviewMode::FirstPage => match &record.preview {
            PreviewState::Ready(surface) => PreviewPanel::Image(surface),
            PreviewState::Failed(message) => PreviewPanel::Failed(message.clone()),
            PreviewState::NotRendered if record.status().is_terminal() => {
                PreviewPanel::Unavailable
            }
            PreviewState::NotRendered => PreviewPanel::Rendering,
        },
        PreviewMode::AllPages => match (&record.all_pages_state, &record.all_pages) {
            (AllPagesState::Ready, Some(pages)) => PreviewPanel::AllPages(pages),
            (AllPagesState::Failed(message), _) => PreviewPanel::Failed(message.clone()),
            (AllPagesState::Ready, None) => PreviewPanel::Unavailable,
            _ => PreviewPanel::RenderingAll,
        },
    }
}

fn text_panel(record: &FileRecord) -> TextPanel<'_> {
    match record.status() {
        FileStatus::Completed => match &record.extracted_text {
            Some(text) => TextPanel::Text(text),
            None => TextPanel::Text(crate::record::EMPTY_TEXT),
        },
        FileStatus::Error => TextPanel::Error(
            record
                .error_message
                .clone()
                .unwrap_or_else(|| crate::extract::GENERIC_FAILURE.to_string()),
        ),
        // Once the preview step has reported, the upload is what remains.
        FileStatus::Processing if !matches!(record.preview, PreviewState::NotRendered) => {
            TextPanel::Extracting
        }
        FileStatus::Pending | FileStatus::Processing => TextPanel::Processing {
            name: record.name.clone(),
        },
    }
}

fn page_indicator(record: &FileRecord) -> String {
    match (record.status(), record.page_count) {
        (FileStatus::Error, _) => "error".to_string(),
        (_, Some(n)) => page_label(n),
        (status, None) if !status.is_terminal() => "loading\u{2026}".to_string(),
        _ => "\u{2014}".to_string(),
    }
}
