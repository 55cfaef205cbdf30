//! The widget's owned state: registry, intake policy, presentation and
//! notices, plus the entry points the front end drives.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use tokio_util::sync::CancellationToken;

use crate::FileId;
use crate::intake::{CandidateBatch, InputPolicy, Notice};
use crate::pipeline::{FileJob, JobKind, PipelineEvent, Ticket};
use crate::preview::preview_failure_message;
use crate::record::{AllPagesState, FileStatus};
use crate::registry::Registry;

/// How loaded files are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presentation {
    /// Vertical list beside the preview.
    #[default]
    Sidebar,
    /// Horizontal tab strip with a first/all pages toggle.
    Tabbed,
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sidebar => write!(f, "sidebar"),
            Self::Tabbed => write!(f, "tabbed"),
        }
    }
}

impl FromStr for Presentation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sidebar" | "list" => Ok(Self::Sidebar),
            "tabbed" | "tabs" => Ok(Self::Tabbed),
            other => Err(format!("unknown presentation '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewMode {
    #[default]
    FirstPage,
    AllPages,
}

impl PreviewMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::FirstPage => Self::AllPages,
            Self::AllPages => Self::FirstPage,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FirstPage => "First page",
            Self::AllPages => "All pages",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidgetConfig {
    pub policy: InputPolicy,
    pub presentation: Presentation,
    pub preview_mode: PreviewMode,
}

/// What applying a pipeline event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The record is gone or predates a teardown; nothing changed.
    Stale,
    /// A background record changed.
    Hidden,
    /// The active record changed; redraw.
    Visible,
}

pub struct WidgetState {
    registry: Registry,
    policy: InputPolicy,
    presentation: Presentation,
    preview_mode: PreviewMode,
    initial_mode: PreviewMode,
    notices: VecDeque<Notice>,
    tokens: HashMap<FileId, CancellationToken>,
}

impl WidgetState {
    pub fn new(config: WidgetConfig) -> Self {
        // The all-pages view only exists in the tabbed strip.
        let preview_mode = match config.presentation {
            Presentation::Tabbed => config.preview_mode,
            Presentation::Sidebar => PreviewMode::FirstPage,
        };
        Self {
            registry: Registry::new(),
            policy: config.policy,
            presentation: config.presentation,
            preview_mode,
            initial_mode: preview_mode,
            notices: VecDeque::new(),
            tokens: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn policy(&self) -> &InputPolicy {
        &self.policy
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn preview_mode(&self) -> PreviewMode {
        self.preview_mode
    }

    /// The oldest unacknowledged notice.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    pub fn push_notice(&mut self, notice: impl Into<Notice>) {
        self.notices.push_back(notice.into());
    }

    /// Validate a batch, create records for accepted files and return their
    /// processing jobs in submission order. Rejections become notices.
    pub fn submit(&mut self, batch: CandidateBatch) -> Vec<FileJob> {
        let source = batch.source;
        let outcome = self.policy.screen(batch);
        for error in outcome.rejected {
            self.push_notice(error);
        }

        let mut jobs = Vec::with_capacity(outcome.accepted.len());
        for candidate in &outcome.accepted {
            let id = self.registry.create(candidate);
            tracing::info!(
                id = %id,
                file = %candidate.name,
                size = candidate.size_bytes,
                ?source,
                "file accepted"
            );
            let cancel = CancellationToken::new();
            self.tokens.insert(id, cancel.clone());
            jobs.push(FileJob {
                ticket: self.ticket(id),
                kind: JobKind::Process,
                name: candidate.name.clone(),
                path: candidate.path.clone(),
                cancel,
            });
        }
        if let Some(first) = jobs.first() {
            self.registry.set_active(first.ticket.id);
        }
        jobs
    }

    fn ticket(&self, id: FileId) -> Ticket {
        Ticket {
            id,
            epoch: self.registry.epoch(),
        }
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.registry.epoch() && self.registry.contains(ticket.id)
    }

    /// Fold a pipeline event into the matching record.
    pub fn apply(&mut self, event: PipelineEvent) -> ApplyOutcome {
        let ticket = event.ticket();
        if !self.is_current(ticket) {
            tracing::debug!(id = %ticket.id, epoch = ticket.epoch, "dropping stale result");
            return ApplyOutcome::Stale;
        }
        let failure_text = preview_failure_message(&self.policy.device);
        let Some(record) = self.registry.get_mut(ticket.id) else {
            return ApplyOutcome::Stale;
        };

        match event {
            PipelineEvent::Started { .. } => {
                record.advance(FileStatus::Processing);
            }
            PipelineEvent::PreviewRendered { result, .. } => match result {
                Ok(first) => record.set_preview(first.page_count, first.surface),
                Err(_) => record.set_preview_failed(failure_text.to_string()),
            },
            PipelineEvent::Extracted { result, .. } => match result {
                Ok(extraction) => record.complete(extraction.text, extraction.page_count),
                Err(e) => record.fail(e.to_string()),
            },
            PipelineEvent::AllPagesRendered { result, .. } => match result {
                Ok(pages) => record.set_all_pages(pages),
                Err(e) => record.all_pages_state = AllPagesState::Failed(e.to_string()),
            },
            PipelineEvent::Skipped { .. } => return ApplyOutcome::Hidden,
        }

        if self.registry.is_active(ticket.id) {
            ApplyOutcome::Visible
        } else {
            ApplyOutcome::Hidden
        }
    }

    /// Remove a file. Queued work for it is skipped; work already running
    /// finishes and its result is dropped.
    pub fn remove(&mut self, id: FileId) -> bool {
        let Some(record) = self.registry.remove(id) else {
            return false;
        };
        if let Some(token) = self.tokens.remove(&id) {
            token.cancel();
        }
        tracing::info!(id = %id, file = %record.name, "file removed");
        if self.registry.is_empty() {
            self.preview_mode = self.initial_mode;
        }
        true
    }

    pub fn remove_active(&mut self) -> bool {
        match self.registry.active_id() {
            Some(id) => self.remove(id),
            None => false,
        }
    }

    pub fn select(&mut self, id: FileId) -> bool {
        self.registry.set_active(id)
    }

    /// Select the file at `index` in list order.
    pub fn select_index(&mut self, index: usize) -> bool {
        match self.registry.records().get(index) {
            Some(record) => {
                let id = record.id;
                self.select(id)
            }
            None => false,
        }
    }

    pub fn cycle(&mut self) -> Option<FileId> {
        self.registry.cycle_next()
    }

    /// Switch between first-page and all-pages preview. Only the tabbed
    /// presentation has the toggle; returns whether the mode changed.
    pub fn toggle_preview_mode(&mut self) -> bool {
        if self.presentation != Presentation::Tabbed {
            return false;
        }
        self.preview_mode = self.preview_mode.toggled();
        true
    }

    /// Mark `id` as rendering all pages and return the job, unless its pages
    /// were already requested.
    pub fn request_all_pages(&mut self, id: FileId) -> Option<FileJob> {
        let ticket = self.ticket(id);
        let record = self.registry.get_mut(id)?;
        if !record.wants_all_pages() {
            return None;
        }
        record.all_pages_state = AllPagesState::Rendering;
        let name = record.name.clone();
        let path = record.source.clone();
        let cancel = self.tokens.get(&id).cloned().unwrap_or_default();
        Some(FileJob {
            ticket,
            kind: JobKind::AllPages,
            name,
            path,
            cancel,
        })
    }

    /// The all-pages job the current view needs, if any.
    pub fn pending_all_pages(&mut self) -> Option<FileJob> {
        if self.preview_mode != PreviewMode::AllPages {
            return None;
        }
        let id = self.registry.active_id()?;
        self.request_all_pages(id)
    }

    /// Drop every record and notice. Results still in flight become stale.
    pub fn teardown(&mut self) {
        for (_, token) in self.tokens.drain() {
            token.cancel();
        }
        self.registry.clear();
        self.notices.clear();
        self.preview_mode = self.initial_mode;
        tracing::debug!(epoch = self.registry.epoch(), "widget torn down");
    }
}
