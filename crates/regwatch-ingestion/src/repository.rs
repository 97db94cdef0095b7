//! Persistence facade used by the pipeline.
//!
//! Builds storage rows from drafts and resolved company ids, keeping the
//! upsert key logic in one place.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;
use uuid::Uuid;

use regwatch_store::{EventRecord, Store};

use crate::models::EventDraft;

/// Company ids resolved for one draft.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolvedCompanies {
    pub manufacturer_id: Option<Uuid>,
    pub recalling_firm_id: Option<Uuid>,
    pub distributor_id: Option<Uuid>,
}

pub struct IngestionRepository {
    store: Arc<dyn Store>,
}

impl IngestionRepository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Upsert one draft; the row is keyed on (source_url, discriminator) so
    /// re-runs update in place instead of duplicating.
    pub async fn upsert_draft(
        &self,
        draft: &EventDraft,
        resolved: &ResolvedCompanies,
    ) -> anyhow::Result<Uuid> {
        let mut record = EventRecord::new(
            draft.category,
            draft.title.clone(),
            draft.source_url.clone(),
            draft.raw_text.clone(),
        );
        record.event_date = draft.event_date;
        record.discriminator = draft.discriminator();
        record.pdf_path = draft.pdf_path.clone();

        if let Some(recall) = draft.recall() {
            record.product_name = Some(recall.product_name.clone());
            record.product_type = recall.product_type.clone();
            record.batches = recall.batches.clone();
            record.manufacturing_date = recall.manufacturing_date;
            record.expiry_date = recall.expiry_date;
            record.reason_for_action = recall.reason_for_action.clone();
        }

        record.manufacturer_id = resolved.manufacturer_id;
        record.recalling_firm_id = resolved.recalling_firm_id;
        record.distributor_id = resolved.distributor_id;

        let id = self
            .store
            .upsert_event(&record)
            .await
            .with_context(|| format!("upserting event from {}", draft.source_url))?;
        debug!(event = %id, url = %draft.source_url, discriminator = ?record.discriminator, "Upserted event");
        Ok(id)
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        self.store.ping().await.context("store unreachable")
    }
}
