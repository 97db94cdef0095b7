//! Direct PDF text extraction via `lopdf`.

use lopdf::Document;

use regwatch_common::{RegwatchError, Result};

/// Extract text from every page of a PDF, in page order.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| RegwatchError::Extraction(format!("failed to parse PDF document: {e}")))?;
    let mut out = String::new();
    for (page_number, _) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => {
                out.push_str(&text);
                out.push('\n');
            }
            // Pages without a text layer (scans) simply contribute nothing.
            Err(e) => {
                tracing::debug!(page = page_number, error = %e, "No text extracted from page");
            }
        }
    }
    Ok(out)
}

/// Whether directly extracted text is too thin to trust.
///
/// Scanned PDFs typically yield a handful of words or a soup of replacement
/// and control characters. Either signal routes the document to OCR.
pub fn low_yield(text: &str, min_words: usize) -> bool {
    if text.split_whitespace().count() < min_words {
        return true;
    }
    let total = text.chars().count();
    if total == 0 {
        return true;
    }
    let junk = text
        .chars()
        .filter(|c| (c.is_control() && !matches!(c, '\n' | '\r' | '\t')) || *c == '\u{FFFD}')
        .count();
    junk * 2 > total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_are_an_error() {
        assert!(extract_pdf_text(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_low_yield_on_short_text() {
        assert!(low_yield("only four short words", 20));
        let long = "word ".repeat(30);
        assert!(!low_yield(&long, 20));
    }

    #[test]
    fn test_low_yield_on_garbage_text() {
        // Two junk characters per three, comfortably past the majority bar.
        let mut garbage = String::new();
        for _ in 0..40 {
            garbage.push('\u{FFFD}');
            garbage.push('\u{0001}');
            garbage.push(' ');
        }
        assert!(low_yield(&garbage, 20));
    }

    #[test]
    fn test_exactly_half_junk_is_not_low_yield() {
        // The bar is a strict majority of non-printable characters.
        let mut text = String::new();
        for _ in 0..40 {
            text.push('\u{FFFD}');
            text.push('\u{FFFD}');
            text.push('x');
            text.push(' ');
        }
        assert!(!low_yield(&text, 20));
    }

    #[test]
    fn test_empty_text_is_low_yield() {
        assert!(low_yield("", 20));
    }
}
