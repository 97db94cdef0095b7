//! Layered extraction of the reason a product was recalled.
//!
//! Strategy order: an explicitly labeled reason, then the first sentence
//! mentioning a hazard keyword, then the first prose paragraph. Text made
//! up entirely of labeled fields carries no narrative, so nothing is
//! guessed for it.

use lazy_static::lazy_static;
use regex::Regex;

const MIN_REASON_LEN: usize = 10;
const MAX_REASON_LEN: usize = 1000;
const MIN_SENTENCE_LEN: usize = 30;

const REASON_KEYWORDS: [&str; 11] = [
    "contamination",
    "contaminated",
    "mislabel",
    "substandard",
    "defect",
    "counterfeit",
    "expired",
    "unregistered",
    "quality",
    "safety",
    "recall",
];

lazy_static! {
    static ref LABELED_REASON_RE: Regex = Regex::new(
        r"(?is)(?:reason\s+for\s+(?:recall|action)|recall\s+reason|why\s+recalled|problem|issue|defect|hazard)\s*[:\-]\s*(.+?)(?:\n\s*\n|\n\s*[A-Z][A-Za-z ()/]{1,40}\s*:|\z)"
    )
    .expect("static regex");
    static ref LABELED_LINE_RE: Regex =
        Regex::new(r"(?m)^\s*[A-Za-z][A-Za-z ()/.]{1,40}\s*[:\-]\s*\S").expect("static regex");
}

/// Extract the reason from an explicitly labeled field only.
pub fn labeled_reason(text: &str) -> Option<String> {
    let cap = LABELED_REASON_RE.captures(text)?;
    let value = collapse(&cap[1]);
    if value.len() < MIN_REASON_LEN {
        return None;
    }
    Some(truncate(value))
}

/// Layered reason extraction over a whole document.
pub fn extract_reason(text: &str) -> Option<String> {
    if let Some(reason) = labeled_reason(text) {
        return Some(reason);
    }
    if let Some(sentence) = keyword_sentence(text) {
        return Some(sentence);
    }
    first_prose_paragraph(text)
}

/// First sentence long enough to be informative that names a hazard.
fn keyword_sentence(text: &str) -> Option<String> {
    for sentence in text.split_inclusive(['.', '!', '?']) {
        let sentence = collapse(sentence);
        if sentence.len() <= MIN_SENTENCE_LEN {
            continue;
        }
        let lower = sentence.to_lowercase();
        if REASON_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return Some(truncate(sentence));
        }
    }
    None
}

/// First paragraph that reads as prose rather than a run of labeled fields.
fn first_prose_paragraph(text: &str) -> Option<String> {
    for paragraph in text.split("\n\n") {
        let collapsed = collapse(paragraph);
        if collapsed.len() < MIN_REASON_LEN {
            continue;
        }
        let lines: Vec<&str> = paragraph.lines().filter(|l| !l.trim().is_empty()).collect();
        let labeled = lines.iter().filter(|l| LABELED_LINE_RE.is_match(l)).count();
        if !lines.is_empty() && labeled == lines.len() {
            continue;
        }
        return Some(truncate(collapsed));
    }
    None
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(mut text: String) -> String {
    if text.len() > MAX_REASON_LEN {
        let mut cut = MAX_REASON_LEN;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_reason_wins() {
        let text = "Product Name: Syrup X\nReason for Recall: presence of diethylene glycol above safe limits\nBatch: B1";
        let reason = extract_reason(text).unwrap();
        assert_eq!(reason, "presence of diethylene glycol above safe limits");
    }

    #[test]
    fn test_labeled_reason_stops_at_next_label() {
        let text = "Reason for recall: microbial contamination found\nExpiry Date: 01/2025";
        assert_eq!(labeled_reason(text).as_deref(), Some("microbial contamination found"));
    }

    #[test]
    fn test_keyword_sentence_fallback() {
        let text = "The FDA wishes to inform the public. Laboratory analysis confirmed the product is counterfeit and unsafe for use.";
        let reason = extract_reason(text).unwrap();
        assert!(reason.contains("counterfeit"));
    }

    #[test]
    fn test_prose_paragraph_fallback() {
        let text = "The affected syrup was withdrawn after consumer complaints in three regions.\n\nBatch No: B99";
        let reason = extract_reason(text).unwrap();
        assert!(reason.starts_with("The affected syrup"));
    }

    #[test]
    fn test_labeled_fields_only_yields_none() {
        let text = "Product Name: Syrup X\nBatch No: B1\nExpiry Date: 01/2025";
        assert_eq!(extract_reason(text), None);
    }

    #[test]
    fn test_empty_text_yields_none() {
        assert_eq!(extract_reason(""), None);
    }

    #[test]
    fn test_long_reason_is_truncated() {
        let text = format!("Reason for recall: {}", "contamination detail ".repeat(100));
        let reason = extract_reason(&text).unwrap();
        assert!(reason.len() <= 1000);
    }
}
