use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::intake::{DeviceClass, DeviceProfile};
use crate::render::{PdfRenderer, RenderError, Surface};

/// Result of rendering the first page.
#[derive(Debug, Clone)]
pub struct FirstPage {
    pub page_count: u32,
    pub surface: Surface,
}

/// Scale for the first-page preview on `device`.
pub fn preview_scale(device: &DeviceProfile) -> f32 {
    match device.class() {
        DeviceClass::Mobile if device.viewport_width < 400 => 0.6,
        DeviceClass::Mobile => 0.8,
        DeviceClass::Tablet => 1.2,
        DeviceClass::Desktop => 1.65,
    }
}

/// Scale for all-pages thumbnails: half the preview scale, floored at 0.4.
pub fn thumbnail_scale(device: &DeviceProfile) -> f32 {
    (preview_scale(device) / 2.0).max(0.4)
}

/// Placeholder text shown when the first page cannot be rendered.
pub fn preview_failure_message(device: &DeviceProfile) -> &'static str {
    if device.mobile {
        "\u{26A0}\u{FE0F} Preview failed \u{2014} file may be too large for mobile"
    } else {
        "\u{26A0}\u{FE0F} Could not render preview \u{2014} corrupted or encrypted file"
    }
}

/// Renders page previews through a [`PdfRenderer`] at device-appropriate scales.
#[derive(Clone)]
pub struct PreviewRenderer {
    renderer: Arc<dyn PdfRenderer>,
    device: DeviceProfile,
}

impl PreviewRenderer {
    pub fn new(renderer: Arc<dyn PdfRenderer>, device: DeviceProfile) -> Self {
        Self { renderer, device }
    }

    pub fn device(&self) -> &DeviceProfile {
        &self.device
    }

    /// Open the file, count its pages and render page 1.
    pub fn render_first_page(&self, path: &Path) -> Result<FirstPage, RenderError> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::Io(e.to_string()))?;
        let document = self.renderer.open(&bytes)?;
        let page_count = document.page_count()?;
        if page_count == 0 {
            return Err(RenderError::NoPages);
        }
        let scale = preview_scale(&self.device);
        tracing::debug!(path = %path.display(), page_count, scale, "rendering first page");
        let surface = document.render_page(0, scale)?;
        Ok(FirstPage {
            page_count: u32::try_from(page_count).unwrap_or(u32::MAX),
            surface,
        })
    }

    /// Render every page at thumbnail scale.
    pub fn render_all_pages(&self, path: &Path) -> Result<Vec<Surface>, RenderError> {
        let bytes = std::fs::read(path).map_err(|e| RenderError::Io(e.to_string()))?;
        let document = self.renderer.open(&bytes)?;
        let page_count = document.page_count()?;
        if page_count == 0 {
            return Err(RenderError::NoPages);
        }
        let scale = thumbnail_scale(&self.device);
        tracing::debug!(path = %path.display(), page_count, scale, "rendering all pages");
        (0..page_count)
            .map(|index| document.render_page(index, scale))
            .collect()
    }

    /// [`render_first_page`](Self::render_first_page) on the blocking pool.
    pub async fn first_page(&self, path: PathBuf) -> Result<FirstPage, RenderError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.render_first_page(&path))
            .await
            .unwrap_or_else(|e| Err(RenderError::Task(e.to_string())))
    }

    /// [`render_all_pages`](Self::render_all_pages) on the blocking pool.
    pub async fn all_pages(&self, path: PathBuf) -> Result<Vec<Surface>, RenderError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.render_all_pages(&path))
            .await
            .unwrap_or_else(|e| Err(RenderError::Task(e.to_string())))
    }
}
