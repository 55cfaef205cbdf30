use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("failed to read file: {0}")]
    Io(String),
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("document is encrypted")]
    Encrypted,
    #[error("document has no pages")]
    NoPages,
    #[error("failed to render page {page}: {message}")]
    PageError { page: usize, message: String },
    #[error("render task failed: {0}")]
    Task(String),
}

/// An in-memory RGB bitmap of one rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 3);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A uniformly filled surface.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgb);
        }
        Self::new(width, height, pixels)
    }

    /// RGB at `(x, y)`, clamped to the surface bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if self.width == 0 || self.height == 0 {
            return [255, 255, 255];
        }
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }
}

/// PDF rendering capability: parse a document from bytes.
///
/// Implementors wrap a concrete rendering library; the preview pipeline
/// only ever sees this trait.
pub trait PdfRenderer: Send + Sync {
    /// Parse a document. Encrypted documents must fail with
    /// [`RenderError::Encrypted`].
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn RenderDocument>, RenderError>;
}

/// An opened document.
pub trait RenderDocument {
    fn page_count(&self) -> Result<usize, RenderError>;

    /// Render the zero-based page `index` at `scale` (1.0 = 72 dpi).
    fn render_page(&self, index: usize, scale: f32) -> Result<Surface, RenderError>;
}
