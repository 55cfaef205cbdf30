use pdfpeek_core::intake::parse_dropped_paths;
use pdfpeek_core::{ApplyOutcome, BatchSource, PipelineEvent};

use super::{App, Screen};
use crate::action::Action;

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        // Notice modal: Enter/Esc acknowledges, everything else waits.
        if self.widget.notice().is_some() {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::DrillIn | Action::NavigateBack => {
                    self.widget.dismiss_notice();
                }
                Action::Tick => {
                    self.tick = self.tick.wrapping_add(1);
                }
                Action::Resize(_w, h) => {
                    self.visible_rows = text_rows(h);
                }
                _ => {}
            }
            return false;
        }

        if self.show_help {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::ToggleHelp | Action::NavigateBack | Action::DrillIn => {
                    self.show_help = false;
                }
                Action::Tick => {
                    self.tick = self.tick.wrapping_add(1);
                }
                _ => {}
            }
            return false;
        }

        if self.screen == Screen::FilePicker {
            self.handle_file_picker_action(action);
            return self.should_quit;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
                return true;
            }
            Action::MoveDown => {
                self.text_scroll = self.text_scroll.saturating_add(1);
            }
            Action::MoveUp => {
                self.text_scroll = self.text_scroll.saturating_sub(1);
            }
            Action::PageDown => {
                let page = self.visible_rows.max(1) as u16;
                self.text_scroll = self.text_scroll.saturating_add(page);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1) as u16;
                self.text_scroll = self.text_scroll.saturating_sub(page);
            }
            Action::GoTop => {
                self.text_scroll = 0;
            }
            Action::GoBottom => {
                let lines = self.snapshot().text.render_text().lines().count();
                let bottom = lines.saturating_sub(self.visible_rows);
                self.text_scroll = u16::try_from(bottom).unwrap_or(u16::MAX);
            }
            Action::ScrollPreviewDown => {
                self.preview_scroll = self.preview_scroll.saturating_add(1);
            }
            Action::ScrollPreviewUp => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
            Action::AddFiles => {
                self.file_picker.selected.clear();
                self.file_picker.refresh_entries();
                self.screen = Screen::FilePicker;
            }
            Action::CloseFile => {
                if self.widget.remove_active() {
                    self.after_active_changed();
                }
            }
            Action::NextFile => {
                if self.widget.cycle().is_some() {
                    self.after_active_changed();
                }
            }
            Action::TogglePreviewMode => {
                if self.widget.toggle_preview_mode() {
                    self.preview_scroll = 0;
                    self.request_pending_renders();
                }
            }
            Action::ToggleHelp => {
                self.show_help = true;
            }
            Action::Paste(text) => {
                let paths = parse_dropped_paths(&text);
                if paths.is_empty() {
                    tracing::debug!(len = text.len(), "paste held no paths");
                } else {
                    self.submit_paths(BatchSource::Drop, &paths);
                }
            }
            Action::ClickAt(x, y) => {
                self.handle_click(x, y);
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            Action::Resize(_w, h) => {
                self.visible_rows = text_rows(h);
            }
            Action::DrillIn | Action::NavigateBack | Action::ToggleSelect | Action::None => {}
        }
        false
    }

    /// Select or close the file under a mouse click.
    pub(super) fn handle_click(&mut self, x: u16, y: u16) {
        let Some(hit) = self.hitboxes.iter().find(|h| h.contains(x, y)).copied() else {
            return;
        };
        let changed = if hit.close {
            self.widget.remove(hit.id)
        } else {
            self.widget.select(hit.id)
        };
        if changed {
            self.after_active_changed();
        }
    }

    /// Apply a pipeline event. Results for removed files are dropped.
    pub fn handle_pipeline_event(&mut self, event: PipelineEvent) -> ApplyOutcome {
        let outcome = self.widget.apply(event);
        if outcome == ApplyOutcome::Stale {
            tracing::debug!("ignored result for a removed file");
        }
        outcome
    }

    fn after_active_changed(&mut self) {
        self.reset_scroll();
        self.request_pending_renders();
    }
}

/// Rows left for the text panel once chrome and preview are laid out.
fn text_rows(height: u16) -> usize {
    (height as usize / 2).saturating_sub(4)
}
