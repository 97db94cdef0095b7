//! Record normalization: extracted text plus listing context in, typed
//! event drafts out.

pub mod dates;
pub mod fields;
pub mod reason;
pub mod recall;

use regwatch_store::EventCategory;

use crate::models::{EventDetail, EventDraft, PageMetadata};
use crate::normalise::dates::parse_date;
use crate::normalise::recall::normalize_recall;

/// Normalize one publication into event drafts.
///
/// Recalls may split into several drafts, one per product. Alerts and
/// notices are always a single draft carrying only the shared fields.
pub fn normalize(category: EventCategory, raw_text: &str, meta: &PageMetadata) -> Vec<EventDraft> {
    match category {
        EventCategory::Recall => normalize_recall(raw_text, meta),
        EventCategory::Alert | EventCategory::Notice => vec![EventDraft {
            category,
            title: meta.title.clone(),
            event_date: meta.date_text.as_deref().and_then(parse_date),
            source_url: meta.source_url.clone(),
            pdf_path: meta.pdf_path.clone(),
            raw_text: raw_text.to_string(),
            detail: match category {
                EventCategory::Alert => EventDetail::Alert,
                _ => EventDetail::Notice,
            },
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_is_a_single_untyped_draft() {
        let meta = PageMetadata {
            title: "Counterfeit Antimalarial Alert".into(),
            source_url: "https://fda.example.gov/alerts/1".into(),
            date_text: Some("02/01/2023".into()),
            ..Default::default()
        };
        let drafts = normalize(EventCategory::Alert, "Alert body text", &meta);
        assert_eq!(drafts.len(), 1);
        assert!(matches!(drafts[0].detail, EventDetail::Alert));
        assert!(drafts[0].event_date.is_some());
        assert_eq!(drafts[0].discriminator(), None);
    }

    #[test]
    fn test_recall_dispatches_to_splitting() {
        let meta = PageMetadata {
            title: "Recall".into(),
            source_url: "https://fda.example.gov/recalls/1".into(),
            ..Default::default()
        };
        let text = "Product Name: A\nBatch: 1\n\nProduct Name: B\nBatch: 2";
        let drafts = normalize(EventCategory::Recall, text, &meta);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].discriminator().as_deref(), Some("A"));
        assert_eq!(drafts[1].discriminator().as_deref(), Some("B"));
    }
}
