use mupdf::{Colorspace, Document, Matrix, Pixmap};

use pdfpeek_core::{PdfRenderer, RenderDocument, RenderError, Surface};

/// MuPDF-based implementation of [`PdfRenderer`].
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so the core library
/// and its tests never link against it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfRenderer;

impl MupdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PdfRenderer for MupdfRenderer {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn RenderDocument>, RenderError> {
        let document = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| RenderError::OpenError(e.to_string()))?;
        if document
            .needs_password()
            .map_err(|e| RenderError::OpenError(e.to_string()))?
        {
            return Err(RenderError::Encrypted);
        }
        Ok(Box::new(MupdfDocument { document }))
    }
}

struct MupdfDocument {
    document: Document,
}

impl RenderDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, RenderError> {
        let count = self
            .document
            .page_count()
            .map_err(|e| RenderError::OpenError(e.to_string()))?;
        Ok(count.max(0) as usize)
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<Surface, RenderError> {
        let page_error = |e: mupdf::Error| RenderError::PageError {
            page: index,
            message: e.to_string(),
        };
        let page = self.document.load_page(index as i32).map_err(page_error)?;
        let pixmap = page
            .to_pixmap(
                &Matrix::new_scale(scale, scale),
                &Colorspace::device_rgb(),
                false,
                true,
            )
            .map_err(page_error)?;
        let surface = pixmap_to_surface(&pixmap);
        tracing::trace!(page = index, width = surface.width, height = surface.height, "rendered");
        Ok(surface)
    }
}

/// Copy a pixmap into a tightly packed RGB surface, dropping any alpha or
/// row padding.
fn pixmap_to_surface(pixmap: &Pixmap) -> Surface {
    let width = pixmap.width();
    let height = pixmap.height();
    let n = pixmap.n() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();

    let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height as usize {
        let row = &samples[y * stride..];
        for x in 0..width as usize {
            let px = &row[x * n..x * n + n.min(3)];
            match px {
                [r, g, b] => pixels.extend_from_slice(&[*r, *g, *b]),
                // Grey pixmaps carry a single channel.
                [v, ..] => pixels.extend_from_slice(&[*v, *v, *v]),
                [] => pixels.extend_from_slice(&[255, 255, 255]),
            }
        }
    }
    Surface::new(width, height, pixels)
}
