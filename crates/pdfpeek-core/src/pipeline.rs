//! Background processing of uploaded files.
//!
//! Jobs arrive on a channel and results leave as [`PipelineEvent`]s, each
//! stamped with the [`Ticket`] of the job that produced it. The pipeline
//! never touches widget state; the receiver decides whether a result is
//! still wanted.
//!
//! `Process` jobs run strictly one after another in submission order.
//! `AllPages` jobs are render-only and run alongside them.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::FileId;
use crate::extract::{ExtractError, Extraction, TextExtractor};
use crate::preview::{FirstPage, PreviewRenderer};
use crate::render::{RenderError, Surface};

/// Identifies the record a job was issued for and the registry generation
/// it was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub id: FileId,
    pub epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Render the first page, then upload for extraction.
    Process,
    /// Render every page as a thumbnail.
    AllPages,
}

#[derive(Debug, Clone)]
pub struct FileJob {
    pub ticket: Ticket,
    pub kind: JobKind,
    pub name: String,
    pub path: PathBuf,
    /// Cancelled when the record is removed. Checked between steps only.
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// The job left the queue and its first step is running.
    Started { ticket: Ticket },
    PreviewRendered {
        ticket: Ticket,
        result: Result<FirstPage, RenderError>,
    },
    Extracted {
        ticket: Ticket,
        result: Result<Extraction, ExtractError>,
    },
    AllPagesRendered {
        ticket: Ticket,
        result: Result<Vec<Surface>, RenderError>,
    },
    /// The job was cancelled before (or between) its steps.
    Skipped { ticket: Ticket },
}

impl PipelineEvent {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Started { ticket }
            | Self::PreviewRendered { ticket, .. }
            | Self::Extracted { ticket, .. }
            | Self::AllPagesRendered { ticket, .. }
            | Self::Skipped { ticket } => *ticket,
        }
    }
}

#[derive(Clone)]
pub struct Pipeline {
    preview: PreviewRenderer,
    extractor: Arc<dyn TextExtractor>,
}

impl Pipeline {
    pub fn new(preview: PreviewRenderer, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { preview, extractor }
    }

    /// Run one `Process` job to completion, emitting its events in order.
    pub async fn process(&self, job: FileJob, events: &mpsc::UnboundedSender<PipelineEvent>) {
        let ticket = job.ticket;
        if job.cancel.is_cancelled() {
            tracing::debug!(file = %job.name, id = %ticket.id, "skipping removed file");
            let _ = events.send(PipelineEvent::Skipped { ticket });
            return;
        }
        tracing::info!(file = %job.name, id = %ticket.id, "processing");
        let _ = events.send(PipelineEvent::Started { ticket });

        let result = self.preview.first_page(job.path.clone()).await;
        if let Err(e) = &result {
            tracing::warn!(file = %job.name, error = %e, "preview render failed");
        }
        let _ = events.send(PipelineEvent::PreviewRendered { ticket, result });

        if job.cancel.is_cancelled() {
            tracing::debug!(file = %job.name, "removed before upload, skipping extraction");
            let _ = events.send(PipelineEvent::Skipped { ticket });
            return;
        }

        let result = self.extractor.extract(&job.path).await;
        match &result {
            Ok(extraction) => tracing::info!(
                file = %job.name,
                chars = extraction.text.len(),
                pages = ?extraction.page_count,
                "extraction complete"
            ),
            Err(e) => tracing::warn!(file = %job.name, error = %e, "extraction failed"),
        }
        let _ = events.send(PipelineEvent::Extracted { ticket, result });
    }

    /// Run one `AllPages` job.
    pub async fn render_all(&self, job: FileJob, events: &mpsc::UnboundedSender<PipelineEvent>) {
        let ticket = job.ticket;
        if job.cancel.is_cancelled() {
            let _ = events.send(PipelineEvent::Skipped { ticket });
            return;
        }
        let result = self.preview.all_pages(job.path).await;
        if let Err(e) = &result {
            tracing::warn!(file = %job.name, error = %e, "all-pages render failed");
        }
        let _ = events.send(PipelineEvent::AllPagesRendered { ticket, result });
    }

    /// Consume jobs until the sender is dropped.
    ///
    /// `Process` jobs go through a single sequential worker. `AllPages`
    /// jobs are spawned as they arrive. Returns once every queued
    /// `Process` job has finished.
    pub async fn run(
        self,
        mut jobs: mpsc::UnboundedReceiver<FileJob>,
        events: mpsc::UnboundedSender<PipelineEvent>,
    ) {
        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<FileJob>();

        let worker = {
            let this = self.clone();
            let events = events.clone();
            tokio::spawn(async move {
                while let Some(job) = queue_rx.recv().await {
                    this.process(job, &events).await;
                }
            })
        };

        while let Some(job) = jobs.recv().await {
            match job.kind {
                JobKind::Process => {
                    if queue_tx.send(job).is_err() {
                        tracing::error!("processing worker stopped");
                        break;
                    }
                }
                JobKind::AllPages => {
                    let this = self.clone();
                    let events = events.clone();
                    tokio::spawn(async move { this.render_all(job, &events).await });
                }
            }
        }

        drop(queue_tx);
        if let Err(e) = worker.await {
            tracing::error!(error = %e, "processing worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::DeviceProfile;
    use crate::mock::{MockExtraction, MockExtractor, MockRenderer};
    use std::time::Duration;

    fn job(dir: &tempfile::TempDir, n: u64, name: &str, kind: JobKind) -> FileJob {
        let path = dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        FileJob {
            ticket: Ticket {
                id: FileId::new(n),
                epoch: 0,
            },
            kind,
            name: name.to_string(),
            path,
            cancel: CancellationToken::new(),
        }
    }

    fn pipeline(extractor: Arc<MockExtractor>) -> Pipeline {
        Pipeline::new(
            PreviewRenderer::new(Arc::new(MockRenderer::with_pages(2)), DeviceProfile::default()),
            extractor,
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    #[tokio::test]
    async fn process_emits_started_preview_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockExtractor::text("hello", Some(2)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        pipeline(extractor.clone())
            .process(job(&dir, 1, "a.pdf", JobKind::Process), &tx)
            .await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], PipelineEvent::Started { .. }));
        assert!(matches!(
            &events[1],
            PipelineEvent::PreviewRendered { result: Ok(fp), .. } if fp.page_count == 2
        ));
        assert!(matches!(
            &events[2],
            PipelineEvent::Extracted { result: Ok(e), .. } if e.text == "hello"
        ));
        assert_eq!(extractor.call_count(), 1);
    }

    #[tokio::test]
    async fn cancelled_job_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockExtractor::text("x", None));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let j = job(&dir, 1, "a.pdf", JobKind::Process);
        j.cancel.cancel();

        pipeline(extractor.clone()).process(j, &tx).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::Skipped { .. }));
        assert_eq!(extractor.call_count(), 0);
    }

    #[tokio::test]
    async fn preview_failure_still_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(MockExtractor::text("text layer", Some(1)));
        let p = Pipeline::new(
            PreviewRenderer::new(
                Arc::new(MockRenderer::failing(RenderError::Encrypted)),
                DeviceProfile::default(),
            ),
            extractor.clone(),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        p.process(job(&dir, 1, "locked.pdf", JobKind::Process), &tx).await;

        let events = drain(&mut rx);
        assert!(matches!(
            &events[1],
            PipelineEvent::PreviewRendered { result: Err(RenderError::Encrypted), .. }
        ));
        assert!(matches!(&events[2], PipelineEvent::Extracted { result: Ok(_), .. }));
    }

    #[tokio::test]
    async fn run_processes_in_submission_order() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Arc::new(
            MockExtractor::with_sequence(vec![
                MockExtraction::Ok {
                    text: "one".into(),
                    pages: Some(1),
                },
                MockExtraction::ServerError {
                    status: 500,
                    message: "boom".into(),
                },
                MockExtraction::Ok {
                    text: "three".into(),
                    pages: Some(3),
                },
            ])
            .with_delay(Duration::from_millis(5)),
        );
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();

        for (n, name) in ["a.pdf", "b.pdf", "c.pdf"].iter().enumerate() {
            job_tx
                .send(job(&dir, n as u64 + 1, name, JobKind::Process))
                .unwrap();
        }
        drop(job_tx);
        pipeline(extractor.clone()).run(job_rx, ev_tx).await;

        assert_eq!(extractor.seen(), vec!["a.pdf", "b.pdf", "c.pdf"]);

        // Each file's events finish before the next file starts.
        let order: Vec<u64> = drain(&mut ev_rx)
            .iter()
            .map(|e| e.ticket().id.raw())
            .collect();
        assert_eq!(order, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[tokio::test]
    async fn all_pages_job_renders_thumbnails() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pipeline(Arc::new(MockExtractor::text("", None)))
            .render_all(job(&dir, 7, "a.pdf", JobKind::AllPages), &tx)
            .await;
        match drain(&mut rx).pop() {
            Some(PipelineEvent::AllPagesRendered {
                ticket,
                result: Ok(pages),
            }) => {
                assert_eq!(ticket.id, FileId::new(7));
                assert_eq!(pages.len(), 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
