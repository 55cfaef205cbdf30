use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pdfpeek_core::{
    BatchSource, ExtractionClient, Pipeline, PipelineEvent, Presentation, PreviewRenderer,
    WidgetState,
};
use pdfpeek_mupdf::MupdfRenderer;

mod action;
mod app;
mod config_file;
mod input;
mod logging;
mod model;
mod theme;
mod view;

use app::App;
use model::config::ConfigState;

/// pdfpeek: upload PDFs, preview their pages and read the extracted text.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF files to load on startup
    pdf_paths: Vec<PathBuf>,

    /// Extraction endpoint (multipart POST)
    #[arg(long)]
    endpoint: Option<String>,

    /// File list layout: sidebar or tabbed
    #[arg(long)]
    presentation: Option<Presentation>,

    /// User agent used to pick desktop or mobile limits
    #[arg(long)]
    user_agent: Option<String>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = logging::init();

    for path in &args.pdf_paths {
        if !path.exists() {
            anyhow::bail!("PDF file not found: {}", path.display());
        }
    }

    // Resolve config: CLI flags > env vars > config file > defaults
    let mut config = ConfigState::default();
    config_file::apply_to_config_state(&config_file::load_config(), &mut config);
    if let Ok(endpoint) = std::env::var("PDFPEEK_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Ok(ua) = std::env::var("PDFPEEK_USER_AGENT") {
        config.user_agent = Some(ua);
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(presentation) = args.presentation {
        config.presentation = presentation;
    }
    if let Some(ua) = args.user_agent {
        config.user_agent = Some(ua);
    }
    if let Some(theme) = args.theme {
        config.theme_name = theme;
    }

    tracing::info!(
        endpoint = %config.endpoint,
        presentation = %config.presentation,
        device = ?config.device().class(),
        "starting"
    );

    let preview = PreviewRenderer::new(Arc::new(MupdfRenderer), config.device());
    let extractor = Arc::new(ExtractionClient::new(
        config.endpoint.clone(),
        config.timeout(),
    ));
    let pipeline = Pipeline::new(preview, extractor);

    let (job_tx, job_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PipelineEvent>();
    let pipeline_task = tokio::spawn(pipeline.run(job_rx, event_tx));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(
        WidgetState::new(config.widget_config()),
        theme::Theme::by_name(&config.theme_name),
    );
    app.job_tx = Some(job_tx);
    app.submit_paths(BatchSource::Picker, &args.pdf_paths);

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_for_signal.cancel();
        }
    });

    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            maybe_event = event_rx.recv() => {
                if let Some(pipeline_event) = maybe_event {
                    app.handle_pipeline_event(pipeline_event);
                    while let Ok(evt) = event_rx.try_recv() {
                        app.handle_pipeline_event(evt);
                    }
                }
            }
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    let action = input::map_event(&evt, &app.screen);
                    app.update(action);
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit || cancel.is_cancelled() {
            break;
        }
    }

    // Cancel queued work and stop the pipeline.
    app.widget.teardown();
    app.job_tx = None;
    pipeline_task.abort();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;

    Ok(())
}
