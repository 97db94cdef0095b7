//! OCR fallback for scanned PDFs.
//!
//! Two seams keep the pipeline testable without native libraries: a
//! [`Rasterizer`] turns PDF bytes into page bitmaps and an [`OcrEngine`]
//! turns one bitmap into text. The production implementations (pdfium and
//! tesseract) are compiled only with the `ocr` cargo feature.

use thiserror::Error;
use tracing::warn;

/// Pages past this index are skipped; recall letters fit well within it and
/// OCR cost grows linearly with page count.
pub const MAX_OCR_PAGES: usize = 10;

/// One rasterized page as tightly packed RGBA bytes.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("invalid PDF: {0}")]
    InvalidPdf(String),
    #[error("OCR stack unavailable")]
    Unavailable,
    #[error("rasterization failed: {0}")]
    Rasterize(String),
}

pub trait Rasterizer: Send + Sync {
    /// Render up to `max_pages` pages of `pdf` to bitmaps, in page order.
    fn rasterize(&self, pdf: &[u8], max_pages: usize) -> Result<Vec<PageImage>, OcrError>;
}

pub trait OcrEngine: Send + Sync {
    fn recognize(&self, page: &PageImage) -> anyhow::Result<String>;
}

/// Run OCR over a PDF and concatenate per-page text in page order.
///
/// Failing to rasterize at all is an error; a single page failing to
/// recognize only costs that page's contribution.
pub fn recognize_pdf(
    pdf: &[u8],
    rasterizer: &dyn Rasterizer,
    engine: &dyn OcrEngine,
) -> Result<String, OcrError> {
    let pages = rasterizer.rasterize(pdf, MAX_OCR_PAGES)?;
    let mut out = String::new();
    for (index, page) in pages.iter().enumerate() {
        match engine.recognize(page) {
            Ok(text) => {
                out.push_str(text.trim_end());
                out.push('\n');
            }
            Err(e) => {
                warn!(page = index + 1, error = %e, "OCR failed on page, skipping");
            }
        }
    }
    Ok(out)
}

#[cfg(feature = "ocr")]
mod pdfium_rasterizer {
    use pdfium_render::prelude::*;

    use super::{OcrError, PageImage, Rasterizer};

    /// Target render width in pixels. Wide enough for tesseract to resolve
    /// body text in a scanned letter.
    const RENDER_WIDTH: i32 = 1600;

    /// Rasterizer backed by the pdfium library.
    #[derive(Default)]
    pub struct PdfiumRasterizer;

    impl Rasterizer for PdfiumRasterizer {
        fn rasterize(&self, pdf: &[u8], max_pages: usize) -> Result<Vec<PageImage>, OcrError> {
            let pdfium = Pdfium::new(
                Pdfium::bind_to_system_library().map_err(|_| OcrError::Unavailable)?,
            );
            let document = pdfium
                .load_pdf_from_byte_slice(pdf, None)
                .map_err(|e| OcrError::InvalidPdf(e.to_string()))?;

            let config = PdfRenderConfig::new().set_target_width(RENDER_WIDTH);
            let mut pages = Vec::new();
            for page in document.pages().iter().take(max_pages) {
                let bitmap = page
                    .render_with_config(&config)
                    .map_err(|e| OcrError::Rasterize(e.to_string()))?;
                pages.push(PageImage {
                    width: bitmap.width() as u32,
                    height: bitmap.height() as u32,
                    rgba: bitmap.as_rgba_bytes(),
                });
            }
            Ok(pages)
        }
    }
}

#[cfg(feature = "ocr")]
mod tesseract_engine {
    use anyhow::Context;
    use tesseract::Tesseract;

    use super::{OcrEngine, PageImage};

    /// Engine backed by the tesseract library.
    pub struct TesseractEngine {
        lang: String,
    }

    impl TesseractEngine {
        pub fn new(lang: impl Into<String>) -> Self {
            Self { lang: lang.into() }
        }
    }

    impl Default for TesseractEngine {
        fn default() -> Self {
            Self::new("eng")
        }
    }

    impl OcrEngine for TesseractEngine {
        fn recognize(&self, page: &PageImage) -> anyhow::Result<String> {
            let tess = Tesseract::new(None, Some(&self.lang))
                .context("failed to initialize tesseract")?;
            let text = tess
                .set_frame(
                    &page.rgba,
                    page.width as i32,
                    page.height as i32,
                    4,
                    page.width as i32 * 4,
                )
                .context("failed to load page frame")?
                .get_text()
                .context("text recognition failed")?;
            Ok(text)
        }
    }
}

#[cfg(feature = "ocr")]
pub use pdfium_rasterizer::PdfiumRasterizer;
#[cfg(feature = "ocr")]
pub use tesseract_engine::TesseractEngine;
