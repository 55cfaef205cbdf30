use pdfpeek_core::BatchSource;

use super::{App, Screen};
use crate::action::Action;

impl App {
    /// Handle input while on the file picker screen.
    pub(super) fn handle_file_picker_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::NavigateBack => {
                // Leaving the picker submits whatever was selected.
                let selected = std::mem::take(&mut self.file_picker.selected);
                self.screen = Screen::Main;
                self.submit_paths(BatchSource::Picker, &selected);
            }
            Action::MoveDown => {
                let max = self.file_picker.entries.len().saturating_sub(1);
                if self.file_picker.cursor < max {
                    self.file_picker.cursor += 1;
                }
            }
            Action::MoveUp => {
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(1);
            }
            Action::PageDown => {
                let page = self.visible_rows.max(1);
                let max = self.file_picker.entries.len().saturating_sub(1);
                self.file_picker.cursor = (self.file_picker.cursor + page).min(max);
            }
            Action::PageUp => {
                let page = self.visible_rows.max(1);
                self.file_picker.cursor = self.file_picker.cursor.saturating_sub(page);
            }
            Action::GoTop => {
                self.file_picker.cursor = 0;
            }
            Action::GoBottom => {
                self.file_picker.cursor = self.file_picker.entries.len().saturating_sub(1);
            }
            Action::ToggleSelect => {
                let multiple = self.widget.policy().allows_multiple();
                self.file_picker.toggle_selected(multiple);
            }
            Action::DrillIn => {
                // Enter on directory opens it, on file toggles selection
                if !self.file_picker.enter_directory() {
                    let multiple = self.widget.policy().allows_multiple();
                    self.file_picker.toggle_selected(multiple);
                }
            }
            Action::Paste(text) => {
                let paths = pdfpeek_core::intake::parse_dropped_paths(&text);
                if !paths.is_empty() {
                    self.screen = Screen::Main;
                    self.submit_paths(BatchSource::Drop, &paths);
                }
            }
            Action::ToggleHelp => {
                self.show_help = true;
            }
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(6);
            }
            _ => {}
        }
    }
}
