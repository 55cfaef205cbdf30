//! Hand-rolled renderer and extractor mocks for tests.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::extract::{ExtractError, Extraction, TextExtractor};
use crate::render::{PdfRenderer, RenderDocument, RenderError, Surface};

/// A [`PdfRenderer`] that produces blank pages.
///
/// Every rendered page is a grey surface sized `scale * 100` by
/// `scale * 140` pixels. Calls are recorded for inspection.
pub struct MockRenderer {
    pages: usize,
    failure: Option<RenderError>,
    open_calls: AtomicUsize,
    rendered: std::sync::Arc<Mutex<Vec<(usize, f32)>>>,
}

impl MockRenderer {
    pub fn with_pages(pages: usize) -> Self {
        Self {
            pages,
            failure: None,
            open_calls: AtomicUsize::new(0),
            rendered: Default::default(),
        }
    }

    /// A renderer whose `open` always fails with `error`.
    pub fn failing(error: RenderError) -> Self {
        Self {
            failure: Some(error),
            ..Self::with_pages(0)
        }
    }

    pub fn open_calls(&self) -> usize {
        self.open_calls.load(Ordering::SeqCst)
    }

    pub fn render_calls(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }

    /// `(page index, scale)` for every page rendered so far.
    pub fn rendered_pages(&self) -> Vec<(usize, f32)> {
        self.rendered.lock().unwrap().clone()
    }
}

struct MockDocument {
    pages: usize,
    rendered: std::sync::Arc<Mutex<Vec<(usize, f32)>>>,
}

impl PdfRenderer for MockRenderer {
    fn open(&self, _bytes: &[u8]) -> Result<Box<dyn RenderDocument>, RenderError> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(Box::new(MockDocument {
            pages: self.pages,
            rendered: self.rendered.clone(),
        }))
    }
}

impl RenderDocument for MockDocument {
    fn page_count(&self) -> Result<usize, RenderError> {
        Ok(self.pages)
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<Surface, RenderError> {
        if index >= self.pages {
            return Err(RenderError::PageError {
                page: index,
                message: "out of range".into(),
            });
        }
        self.rendered.lock().unwrap().push((index, scale));
        let width = ((scale * 100.0) as u32).max(1);
        let height = ((scale * 140.0) as u32).max(1);
        Ok(Surface::filled(width, height, [200, 200, 200]))
    }
}

/// A configurable canned response for [`MockExtractor`].
#[derive(Debug, Clone)]
pub enum MockExtraction {
    Ok { text: String, pages: Option<u32> },
    ServerError { status: u16, message: String },
    Network(String),
}

/// A [`TextExtractor`] returning canned responses.
///
/// Responses are consumed in order; the last one repeats.
pub struct MockExtractor {
    responses: Mutex<Vec<MockExtraction>>,
    fallback: MockExtraction,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl MockExtractor {
    pub fn new(response: MockExtraction) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            call_count: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str, pages: Option<u32>) -> Self {
        Self::new(MockExtraction::Ok {
            text: text.to_string(),
            pages,
        })
    }

    pub fn with_sequence(mut responses: Vec<MockExtraction>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        responses.reverse();
        let fallback = responses[0].clone();
        Self {
            responses: Mutex::new(responses),
            ..Self::new(fallback)
        }
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// File names in the order they were extracted.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockExtraction {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl TextExtractor for MockExtractor {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Extraction, ExtractError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match response {
                MockExtraction::Ok { text, pages } => Ok(Extraction {
                    text,
                    page_count: pages,
                }),
                MockExtraction::ServerError { status, message } => {
                    Err(ExtractError::Server { status, message })
                }
                MockExtraction::Network(msg) => Err(ExtractError::Http(msg)),
            }
        })
    }
}
