//! Content extraction: raw HTML or PDF bytes in, structured text out.
//!
//! PDF extraction tries direct text first (`lopdf`); a low-yield result is
//! handed to the OCR fallback instead of being returned. Total failure
//! produces a sentinel result whose placeholder text is persisted so
//! failures stay auditable.

pub mod html;
pub mod ocr;
pub mod pdf;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extract::ocr::{recognize_pdf, OcrEngine, Rasterizer};

/// How the text in an [`ExtractionResult`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Direct HTML/PDF text extraction.
    Direct,
    /// Optical character recognition over rasterized pages.
    Ocr,
    /// Extraction failed; the text is a synthetic placeholder.
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub text: String,
    pub confidence: Confidence,
}

impl ExtractionResult {
    pub fn is_usable(&self) -> bool {
        self.confidence != Confidence::None
    }
}

/// Placeholder persisted as `raw_text` when extraction fails entirely.
pub fn placeholder_text(source: &str, reason: &str) -> String {
    format!("[extraction failed] source: {source} | reason: {reason}")
}

/// Direct-extraction yield threshold: fewer words than this, or a majority
/// of non-printable characters, flags the text as low confidence.
pub const MIN_WORD_YIELD: usize = 20;

/// Content extractor with an optional OCR stack.
///
/// Both OCR seams are trait objects so tests can substitute stubs; the
/// production implementations (pdfium + tesseract) sit behind the `ocr`
/// cargo feature.
#[derive(Clone)]
pub struct Extractor {
    rasterizer: Option<Arc<dyn Rasterizer>>,
    engine: Option<Arc<dyn OcrEngine>>,
    min_word_yield: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            rasterizer: None,
            engine: None,
            min_word_yield: MIN_WORD_YIELD,
        }
    }

    pub fn with_ocr(rasterizer: Arc<dyn Rasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            rasterizer: Some(rasterizer),
            engine: Some(engine),
            min_word_yield: MIN_WORD_YIELD,
        }
    }

    pub fn min_word_yield(mut self, min: usize) -> Self {
        self.min_word_yield = min;
        self
    }

    /// Extract visible text from an HTML page.
    pub fn extract_html(&self, html_text: &str, source: &str) -> ExtractionResult {
        let text = html::extract_visible_text(html_text);
        if text.trim().is_empty() {
            return ExtractionResult {
                text: placeholder_text(source, "empty HTML body"),
                confidence: Confidence::None,
            };
        }
        ExtractionResult { text, confidence: Confidence::Direct }
    }

    /// Extract text from PDF bytes: direct first, OCR on low yield,
    /// sentinel on total failure.
    ///
    /// When the direct text is low-yield and OCR is unavailable or comes
    /// back empty, the thin direct text is still returned (tagged
    /// `Direct`) rather than dropped: a few words from a scan beat a
    /// placeholder. CPU-bound; callers run it under `spawn_blocking`.
    pub fn extract_pdf(&self, bytes: &[u8], source: &str) -> ExtractionResult {
        let direct = match pdf::extract_pdf_text(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(source, error = %e, "Direct PDF extraction failed");
                None
            }
        };

        if let Some(ref text) = direct {
            if !pdf::low_yield(text, self.min_word_yield) {
                return ExtractionResult {
                    text: text.clone(),
                    confidence: Confidence::Direct,
                };
            }
            debug!(source, words = text.split_whitespace().count(), "Low-yield PDF text, trying OCR");
        }

        match self.run_ocr(bytes) {
            Some(text) if !text.trim().is_empty() => {
                return ExtractionResult { text, confidence: Confidence::Ocr };
            }
            Some(_) => warn!(source, "OCR produced no text"),
            None => {}
        }

        // OCR unavailable or empty: a low-yield direct result is still
        // better than nothing, but only if it has any words at all.
        if let Some(text) = direct {
            if !text.trim().is_empty() {
                return ExtractionResult { text, confidence: Confidence::Direct };
            }
        }

        ExtractionResult {
            text: placeholder_text(source, "PDF unparseable and OCR unavailable"),
            confidence: Confidence::None,
        }
    }

    fn run_ocr(&self, bytes: &[u8]) -> Option<String> {
        let (rasterizer, engine) = match (&self.rasterizer, &self.engine) {
            (Some(r), Some(e)) => (r, e),
            _ => return None,
        };
        match recognize_pdf(bytes, rasterizer.as_ref(), engine.as_ref()) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "OCR fallback failed");
                None
            }
        }
    }
}
