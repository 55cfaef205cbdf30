use std::path::PathBuf;

use crate::FileId;
use crate::render::Surface;

/// Text stored when the server succeeds but returns no text.
pub const EMPTY_TEXT: &str = "[No text extracted]";

/// Processing status of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing...",
            Self::Completed => "Done",
            Self::Error => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Completed | Self::Error => 2,
        }
    }

    /// Status only moves forward; terminal states are final.
    pub fn can_advance_to(&self, next: FileStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

/// First-page preview of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewState {
    NotRendered,
    Ready(Surface),
    Failed(String),
}

/// Progress of the lazy all-pages render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllPagesState {
    NotRequested,
    Rendering,
    Ready,
    Failed(String),
}

/// State of a single uploaded file.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub id: FileId,
    pub name: String,
    pub size_bytes: u64,
    pub source: PathBuf,
    status: FileStatus,
    pub page_count: Option<u32>,
    pub preview: PreviewState,
    pub all_pages: Option<Vec<Surface>>,
    pub all_pages_state: AllPagesState,
    pub extracted_text: Option<String>,
    pub error_message: Option<String>,
}

impl FileRecord {
    pub fn new(id: FileId, name: String, size_bytes: u64, source: PathBuf) -> Self {
        Self {
            id,
            name,
            size_bytes,
            source,
            status: FileStatus::Pending,
            page_count: None,
            preview: PreviewState::NotRendered,
            all_pages: None,
            all_pages_state: AllPagesState::NotRequested,
            extracted_text: None,
            error_message: None,
        }
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    /// Move to `next` if the transition is forward. Returns whether it moved.
    pub fn advance(&mut self, next: FileStatus) -> bool {
        if self.status.can_advance_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }

    /// Store a successful first-page render.
    pub fn set_preview(&mut self, page_count: u32, surface: Surface) {
        // A server-reported count already arrived; it wins.
        if self.page_count.is_none() || !self.status.is_terminal() {
            self.page_count = Some(page_count);
        }
        self.preview = PreviewState::Ready(surface);
    }

    /// Record a preview failure. Status is left alone; extraction decides it.
    pub fn set_preview_failed(&mut self, message: String) {
        if self.error_message.is_none() {
            self.error_message = Some(message.clone());
        }
        self.preview = PreviewState::Failed(message);
    }

    /// Store a successful extraction and finish the record.
    pub fn complete(&mut self, text: String, server_pages: Option<u32>) {
        if !self.advance(FileStatus::Completed) {
            return;
        }
        self.extracted_text = Some(if text.is_empty() {
            EMPTY_TEXT.to_string()
        } else {
            text
        });
        if let Some(pages) = server_pages.filter(|&p| p > 0) {
            self.page_count = Some(pages);
        }
        // A preview failure message does not outlive a successful extraction.
        self.error_message = None;
    }

    /// Record an extraction failure and finish the record.
    pub fn fail(&mut self, message: String) {
        if self.advance(FileStatus::Error) {
            self.error_message = Some(message);
        }
    }

    pub fn preview_surface(&self) -> Option<&Surface> {
        match &self.preview {
            PreviewState::Ready(surface) => Some(surface),
            _ => None,
        }
    }

    /// Whether an all-pages render should be started for this record.
    pub fn wants_all_pages(&self) -> bool {
        matches!(self.all_pages_state, AllPagesState::NotRequested)
    }

    pub fn set_all_pages(&mut self, pages: Vec<Surface>) {
        if self.all_pages.is_none() {
            self.all_pages = Some(pages);
        }
        self.all_pages_state = AllPagesState::Ready;
    }

    /// Release rendered surfaces (teardown).
    pub fn release_surfaces(&mut self) {
        self.preview = PreviewState::NotRendered;
        self.all_pages = None;
        self.all_pages_state = AllPagesState::NotRequested;
    }
}
