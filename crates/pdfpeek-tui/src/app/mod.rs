mod update;
mod update_file_picker;

use std::path::PathBuf;

use ratatui::layout::Rect;
use tokio::sync::mpsc;

use pdfpeek_core::intake::mime_for_path;
use pdfpeek_core::{
    BatchSource, CandidateBatch, FileId, FileJob, PDF_MIME, ViewSnapshot, WidgetState,
};

use crate::theme::Theme;

/// Which screen is currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Main,
    FilePicker,
}

/// State for the file picker screen.
#[derive(Debug, Clone)]
pub struct FilePickerState {
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// Entries in the current directory (dirs first, then files).
    pub entries: Vec<FileEntry>,
    /// Cursor position in the entries list.
    pub cursor: usize,
    /// Selected PDF files, in the order they were picked.
    pub selected: Vec<PathBuf>,
}

/// A single entry in the file picker.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_pdf: bool,
}

impl FilePickerState {
    pub fn new() -> Self {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::at(current_dir)
    }

    pub fn at(dir: PathBuf) -> Self {
        let mut state = Self {
            current_dir: dir,
            entries: Vec::new(),
            cursor: 0,
            selected: Vec::new(),
        };
        state.refresh_entries();
        state
    }

    /// Refresh the entries list from the current directory.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        // Parent directory entry
        if let Some(parent) = self.current_dir.parent() {
            entries.push(FileEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
                is_pdf: false,
            });
        }

        if let Ok(read_dir) = std::fs::read_dir(&self.current_dir) {
            let mut dirs = Vec::new();
            let mut files = Vec::new();

            for entry in read_dir.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();

                // Skip hidden files/dirs
                if name.starts_with('.') {
                    continue;
                }

                if path.is_dir() {
                    dirs.push(FileEntry {
                        name,
                        path,
                        is_dir: true,
                        is_pdf: false,
                    });
                } else {
                    let is_pdf = mime_for_path(&path) == PDF_MIME;
                    files.push(FileEntry {
                        name,
                        path,
                        is_dir: false,
                        is_pdf,
                    });
                }
            }

            dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
            files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

            entries.extend(dirs);
            entries.extend(files);
        }

        self.entries = entries;
        self.cursor = 0;
    }

    /// Toggle selection of the PDF under the cursor. With `multiple` off the
    /// new pick replaces the previous one.
    pub fn toggle_selected(&mut self, multiple: bool) {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_pdf
        {
            if let Some(pos) = self.selected.iter().position(|p| p == &entry.path) {
                self.selected.remove(pos);
            } else {
                if !multiple {
                    self.selected.clear();
                }
                self.selected.push(entry.path.clone());
            }
        }
    }

    /// Enter the directory at cursor, or return false if not a directory.
    pub fn enter_directory(&mut self) -> bool {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_dir
        {
            self.current_dir = entry.path.clone();
            self.refresh_entries();
            return true;
        }
        false
    }

    pub fn is_selected(&self, path: &PathBuf) -> bool {
        self.selected.contains(path)
    }
}

/// A clickable region of the file strip. `close` marks the × control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hitbox {
    pub area: Rect,
    pub id: FileId,
    pub close: bool,
}

impl Hitbox {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.area.x
            && x < self.area.x.saturating_add(self.area.width)
            && y >= self.area.y
            && y < self.area.y.saturating_add(self.area.height)
    }
}

/// Main application state.
pub struct App {
    pub screen: Screen,
    pub widget: WidgetState,
    pub theme: Theme,
    pub tick: usize,
    pub should_quit: bool,
    pub show_help: bool,
    /// Vertical scroll of the extracted-text panel.
    pub text_scroll: u16,
    /// Row offset into the all-pages thumbnail grid.
    pub preview_scroll: usize,
    /// Height of the text panel (set on draw, used for page up/down).
    pub visible_rows: usize,
    pub file_picker: FilePickerState,
    /// Channel to the processing pipeline. `None` in tests.
    pub job_tx: Option<mpsc::UnboundedSender<FileJob>>,
    /// Clickable file entries from the last draw.
    pub hitboxes: Vec<Hitbox>,
}

impl App {
    pub fn new(widget: WidgetState, theme: Theme) -> Self {
        Self {
            screen: Screen::Main,
            widget,
            theme,
            tick: 0,
            should_quit: false,
            show_help: false,
            text_scroll: 0,
            preview_scroll: 0,
            visible_rows: 20,
            file_picker: FilePickerState::new(),
            job_tx: None,
            hitboxes: Vec::new(),
        }
    }

    /// Validate and enqueue files from either input source.
    pub fn submit_paths(&mut self, source: BatchSource, paths: &[PathBuf]) {
        if paths.is_empty() {
            return;
        }
        let (batch, unreadable) = CandidateBatch::from_paths(source, paths);
        for err in unreadable {
            tracing::warn!(error = %err, "unreadable input");
            self.widget.push_notice(err);
        }
        let jobs = self.widget.submit(batch);
        if !jobs.is_empty() {
            self.reset_scroll();
        }
        self.dispatch(jobs);
        self.request_pending_renders();
    }

    /// Hand jobs to the pipeline.
    pub(crate) fn dispatch(&mut self, jobs: Vec<FileJob>) {
        for job in jobs {
            match &self.job_tx {
                Some(tx) => {
                    if tx.send(job).is_err() {
                        tracing::error!("pipeline is gone; dropping job");
                    }
                }
                None => tracing::debug!(file = %job.name, "no pipeline attached"),
            }
        }
    }

    /// Start any render the current view is waiting on.
    pub(crate) fn request_pending_renders(&mut self) {
        if let Some(job) = self.widget.pending_all_pages() {
            self.dispatch(vec![job]);
        }
    }

    pub(crate) fn reset_scroll(&mut self) {
        self.text_scroll = 0;
        self.preview_scroll = 0;
    }

    /// Render the current screen.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        if self.screen == Screen::FilePicker {
            crate::view::file_picker::render_in(f, self, area);
        } else {
            crate::view::screen::render_in(f, self, area);
        }

        if let Some(notice) = self.widget.notice() {
            crate::view::notice::render(f, &self.theme, &notice.message);
        }

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }
    }

    /// Snapshot of the widget for drawing.
    pub fn snapshot(&self) -> ViewSnapshot<'_> {
        ViewSnapshot::build(&self.widget)
    }
}

#[cfg(test)]
mod tests;
