/// Everything the user (or the terminal) can ask the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveDown,
    MoveUp,
    PageDown,
    PageUp,
    GoTop,
    GoBottom,
    /// Enter: open directory / toggle file / dismiss notice.
    DrillIn,
    /// Esc: leave the picker / close overlays.
    NavigateBack,
    /// Space in the file picker.
    ToggleSelect,
    AddFiles,
    CloseFile,
    NextFile,
    TogglePreviewMode,
    ScrollPreviewDown,
    ScrollPreviewUp,
    ToggleHelp,
    /// Bracketed paste, which is how terminals deliver dropped files.
    Paste(String),
    ClickAt(u16, u16),
    Resize(u16, u16),
    Tick,
    None,
}
