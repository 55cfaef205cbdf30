use std::path::{Path, PathBuf};

use pdfpeek_core::{JobKind, Presentation, PreviewMode, WidgetConfig};
use ratatui::layout::Rect;

use super::*;
use crate::action::Action;

/// Create a minimal App for testing (no pipeline, no files).
fn test_app() -> App {
    App::new(WidgetState::new(WidgetConfig::default()), Theme::hacker())
}

/// An app with a job channel attached, so dispatched work can be inspected.
fn wired_app(config: WidgetConfig) -> (App, mpsc::UnboundedReceiver<FileJob>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(WidgetState::new(config), Theme::hacker());
    app.job_tx = Some(tx);
    (app, rx)
}

fn tabbed() -> WidgetConfig {
    WidgetConfig {
        presentation: Presentation::Tabbed,
        ..Default::default()
    }
}

fn write_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"%PDF-1.4\n%%EOF\n").unwrap();
            path
        })
        .collect()
}

fn drain(rx: &mut mpsc::UnboundedReceiver<FileJob>) -> Vec<FileJob> {
    let mut jobs = Vec::new();
    while let Ok(job) = rx.try_recv() {
        jobs.push(job);
    }
    jobs
}

// ── File picker ─────────────────────────────────────────────────

#[test]
fn add_files_opens_picker() {
    let mut app = test_app();
    app.update(Action::AddFiles);
    assert_eq!(app.screen, Screen::FilePicker);
}

#[test]
fn picker_lists_dirs_first_and_flags_pdfs() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["b.pdf", "a.txt"]);
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let picker = FilePickerState::at(dir.path().to_path_buf());
    let names: Vec<_> = picker.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["..", "sub", "a.txt", "b.pdf"]);
    assert!(picker.entries[3].is_pdf);
    assert!(!picker.entries[2].is_pdf);
}

#[test]
fn picker_selection_is_submitted_on_esc() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.pdf", "b.pdf"]);
    let (mut app, mut rx) = wired_app(WidgetConfig::default());

    app.update(Action::AddFiles);
    app.file_picker = FilePickerState::at(dir.path().to_path_buf());
    app.update(Action::MoveDown); // skip ".."
    app.update(Action::ToggleSelect);
    app.update(Action::MoveDown);
    app.update(Action::DrillIn);
    assert_eq!(app.file_picker.selected.len(), 2);

    app.update(Action::NavigateBack);
    assert_eq!(app.screen, Screen::Main);
    assert!(app.file_picker.selected.is_empty());
    assert_eq!(app.widget.registry().len(), 2);

    let jobs = drain(&mut rx);
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].name, "a.pdf");
    assert!(jobs.iter().all(|j| j.kind == JobKind::Process));
}

#[test]
fn picker_ignores_non_pdf_entries() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["notes.txt"]);
    let mut app = test_app();
    app.screen = Screen::FilePicker;
    app.file_picker = FilePickerState::at(dir.path().to_path_buf());
    app.update(Action::GoBottom);
    app.update(Action::ToggleSelect);
    assert!(app.file_picker.selected.is_empty());
}

#[test]
fn single_select_replaces_pick_on_mobile() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &["a.pdf", "b.pdf"]);
    let device = pdfpeek_core::DeviceProfile::from_user_agent(Some("iPhone; Mobile"), 390);
    let mut app = App::new(
        WidgetState::new(WidgetConfig {
            policy: pdfpeek_core::InputPolicy::new(device),
            ..Default::default()
        }),
        Theme::hacker(),
    );
    app.screen = Screen::FilePicker;
    app.file_picker = FilePickerState::at(dir.path().to_path_buf());
    app.update(Action::MoveDown);
    app.update(Action::ToggleSelect);
    app.update(Action::MoveDown);
    app.update(Action::ToggleSelect);
    assert_eq!(app.file_picker.selected, vec![dir.path().join("b.pdf")]);
}

// ── Drops ───────────────────────────────────────────────────────

#[test]
fn paste_submits_drop_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &["one.pdf", "two.pdf"]);
    let (mut app, mut rx) = wired_app(WidgetConfig::default());

    let text = format!("'{}' '{}'", paths[0].display(), paths[1].display());
    app.update(Action::Paste(text));
    assert_eq!(drain(&mut rx).len(), 2);
    assert_eq!(app.widget.registry().len(), 2);
}

#[test]
fn pasted_non_pdf_raises_blocking_notice() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &["notes.txt"]);
    let mut app = test_app();

    app.update(Action::Paste(paths[0].display().to_string()));
    assert!(app.widget.registry().is_empty());
    assert_eq!(
        app.widget.notice().map(|n| n.message.as_str()),
        Some("Only PDF files are supported.")
    );

    // Everything but acknowledge is swallowed while the notice is up.
    app.update(Action::AddFiles);
    assert_eq!(app.screen, Screen::Main);
    app.update(Action::DrillIn);
    assert!(app.widget.notice().is_none());
    app.update(Action::AddFiles);
    assert_eq!(app.screen, Screen::FilePicker);
}

#[test]
fn missing_path_reports_unreadable() {
    let mut app = test_app();
    app.update(Action::Paste("/definitely/not/here.pdf".into()));
    assert!(app.widget.notice().is_some());
    assert!(app.widget.registry().is_empty());
}

#[test]
fn plain_text_paste_is_ignored() {
    let mut app = test_app();
    app.update(Action::Paste("   ".into()));
    assert!(app.widget.notice().is_none());
}

// ── File strip ──────────────────────────────────────────────────

#[test]
fn close_and_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &["a.pdf", "b.pdf", "c.pdf"]);
    let mut app = test_app();
    app.submit_paths(pdfpeek_core::BatchSource::Picker, &paths);
    let ids = app.widget.registry().ids();

    app.update(Action::NextFile);
    assert_eq!(app.widget.registry().active_id(), Some(ids[1]));

    app.text_scroll = 7;
    app.update(Action::CloseFile);
    assert_eq!(app.widget.registry().len(), 2);
    assert_eq!(app.widget.registry().active_id(), Some(ids[0]));
    assert_eq!(app.text_scroll, 0);

    app.update(Action::CloseFile);
    app.update(Action::CloseFile);
    assert!(app.widget.registry().is_empty());
    assert!(app.snapshot().is_empty());
    assert!(!app.update(Action::CloseFile));
}

#[test]
fn clicks_select_and_close() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &["a.pdf", "b.pdf"]);
    let mut app = test_app();
    app.submit_paths(pdfpeek_core::BatchSource::Picker, &paths);
    let ids = app.widget.registry().ids();

    app.hitboxes = vec![
        Hitbox {
            area: Rect::new(0, 5, 20, 1),
            id: ids[1],
            close: false,
        },
        Hitbox {
            area: Rect::new(20, 5, 2, 1),
            id: ids[1],
            close: true,
        },
    ];

    app.update(Action::ClickAt(3, 5));
    assert_eq!(app.widget.registry().active_id(), Some(ids[1]));

    app.update(Action::ClickAt(21, 5));
    assert_eq!(app.widget.registry().ids(), vec![ids[0]]);

    app.update(Action::ClickAt(50, 50));
    assert_eq!(app.widget.registry().len(), 1);
}

// ── Preview mode ────────────────────────────────────────────────

#[test]
fn toggle_in_tabbed_requests_all_pages_once() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &["a.pdf"]);
    let (mut app, mut rx) = wired_app(tabbed());
    app.submit_paths(pdfpeek_core::BatchSource::Picker, &paths);
    drain(&mut rx);

    app.update(Action::TogglePreviewMode);
    assert_eq!(app.widget.preview_mode(), PreviewMode::AllPages);
    let jobs = drain(&mut rx);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].kind, JobKind::AllPages);

    app.update(Action::TogglePreviewMode);
    app.update(Action::TogglePreviewMode);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn all_pages_mode_follows_active_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &["a.pdf", "b.pdf"]);
    let (mut app, mut rx) = wired_app(tabbed());
    app.update(Action::TogglePreviewMode);
    app.submit_paths(pdfpeek_core::BatchSource::Picker, &paths);

    let kinds: Vec<_> = drain(&mut rx).into_iter().map(|j| j.kind).collect();
    assert_eq!(
        kinds,
        vec![JobKind::Process, JobKind::Process, JobKind::AllPages]
    );

    app.update(Action::NextFile);
    let jobs = drain(&mut rx);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].name, "b.pdf");
}

#[test]
fn sidebar_ignores_preview_toggle() {
    let (mut app, mut rx) = wired_app(WidgetConfig::default());
    app.update(Action::TogglePreviewMode);
    assert_eq!(app.widget.preview_mode(), PreviewMode::FirstPage);
    assert!(drain(&mut rx).is_empty());
}

// ── Scrolling, help, quit ───────────────────────────────────────

#[test]
fn text_scroll_saturates() {
    let mut app = test_app();
    app.update(Action::MoveUp);
    assert_eq!(app.text_scroll, 0);
    app.update(Action::MoveDown);
    app.update(Action::MoveDown);
    assert_eq!(app.text_scroll, 2);
    app.update(Action::GoTop);
    assert_eq!(app.text_scroll, 0);
}

#[test]
fn help_overlay_swallows_keys() {
    let mut app = test_app();
    app.update(Action::ToggleHelp);
    assert!(app.show_help);
    app.update(Action::AddFiles);
    assert_eq!(app.screen, Screen::Main);
    app.update(Action::NavigateBack);
    assert!(!app.show_help);
}

#[test]
fn quit_from_any_screen() {
    let mut app = test_app();
    assert!(app.update(Action::Quit));
    assert!(app.should_quit);

    let mut app = test_app();
    app.screen = Screen::FilePicker;
    assert!(app.update(Action::Quit));
}

#[test]
fn tick_advances_spinner() {
    let mut app = test_app();
    app.update(Action::Tick);
    app.update(Action::Tick);
    assert_eq!(app.tick, 2);
}
