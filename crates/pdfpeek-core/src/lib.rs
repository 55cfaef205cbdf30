use std::fmt;

pub mod extract;
pub mod intake;
pub mod mock;
pub mod pipeline;
pub mod preview;
pub mod record;
pub mod registry;
pub mod render;
pub mod view;
pub mod widget;

// Re-export for convenience
pub use extract::{ExtractError, Extraction, ExtractionClient, TextExtractor};
pub use intake::{
    BatchSource, Candidate, CandidateBatch, DeviceClass, DeviceProfile, InputPolicy, Notice,
};
pub use pipeline::{FileJob, JobKind, Pipeline, PipelineEvent, Ticket};
pub use preview::{FirstPage, PreviewRenderer};
pub use record::{AllPagesState, FileRecord, FileStatus, PreviewState};
pub use registry::Registry;
pub use render::{PdfRenderer, RenderDocument, RenderError, Surface};
pub use view::ViewSnapshot;
pub use widget::{ApplyOutcome, Presentation, PreviewMode, WidgetConfig, WidgetState};

/// MIME type accepted by the intake.
pub const PDF_MIME: &str = "application/pdf";

/// Default extraction endpoint (the Flask service's route on its default port).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/clean-pdf";

/// Opaque identifier of an uploaded file, unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u64);

impl FileId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pdf_{}", self.0)
    }
}

/// Human-readable size: `B` below 1 KiB, one decimal `KB`/`MB` above.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1_048_576 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    }
}

/// Shorten a filename to at most `max_len` characters, keeping the extension.
///
/// `"a_very_long_report_name.pdf"` at 20 becomes `"a_very_long_re...pdf"`.
pub fn truncate_filename(filename: &str, max_len: usize) -> String {
    let len = filename.chars().count();
    if len <= max_len {
        return filename.to_string();
    }
    let Some((stem, ext)) = filename.rsplit_once('.') else {
        let mut out: String = filename.chars().take(max_len.saturating_sub(3)).collect();
        out.push_str("...");
        return out;
    };
    let keep = max_len.saturating_sub(3 + ext.chars().count());
    let head: String = stem.chars().take(keep).collect();
    format!("{}...{}", head, ext)
}

/// "1 page" / "N pages".
pub fn page_label(pages: u32) -> String {
    format!("{} page{}", pages, if pages > 1 { "s" } else { "" })
}
