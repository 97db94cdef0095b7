//! Data models for the ingestion pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use regwatch_store::EventCategory;

/// A normalized event before company resolution and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDraft {
    pub category: EventCategory,
    pub title: String,
    pub event_date: Option<NaiveDate>,
    pub source_url: String,
    pub pdf_path: Option<String>,
    pub raw_text: String,
    pub detail: EventDetail,
}

/// Category-specific payload. Alerts and notices carry no structured fields
/// beyond the shared ones; recalls carry the product block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventDetail {
    Recall(RecallDetail),
    Alert,
    Notice,
}

impl EventDraft {
    pub fn recall(&self) -> Option<&RecallDetail> {
        match &self.detail {
            EventDetail::Recall(r) => Some(r),
            _ => None,
        }
    }

    /// Value that, together with `source_url`, identifies this draft across
    /// runs. Recalls use the product name so split records from one page
    /// stay distinct; alerts and notices are one row per page.
    pub fn discriminator(&self) -> Option<String> {
        self.recall().map(|r| r.product_name.clone())
    }
}

/// Product-level fields of a recall. Company mentions are unresolved names
/// here; the resolver turns them into identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecallDetail {
    pub product_name: String,
    pub product_type: Option<String>,
    pub batches: Vec<String>,
    pub manufacturing_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub reason_for_action: Option<String>,
    pub manufacturer: Option<String>,
    pub recalling_firm: Option<String>,
    pub distributor: Option<String>,
}

/// Page-level context handed to the normalizer alongside the raw text.
///
/// Listing tables already carry some structured cells (date, product,
/// manufacturer, ...); the normalizer prefers labeled fields found in the
/// raw text and falls back to these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub source_url: String,
    pub date_text: Option<String>,
    pub pdf_path: Option<String>,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub manufacturer: Option<String>,
    pub recalling_firm: Option<String>,
    pub batches: Option<String>,
    pub manufacturing_date: Option<String>,
    pub expiry_date: Option<String>,
}
