//! In-process reference store.
//!
//! Keeps both tables behind one mutex so the upsert and lookup-or-create
//! sequences observe a consistent view. The natural-key map enforces the
//! same replace semantics a relational backend would provide with a unique
//! index on `(source_url, discriminator)`.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::schema::{normalize_name, Company, CompanyRole, EventRecord};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    /// Natural key -> event row.
    events: HashMap<(String, Option<String>), EventRecord>,
    /// Company id -> row.
    companies: HashMap<uuid::Uuid, Company>,
    /// Normalized name -> company id.
    companies_by_name: HashMap<String, uuid::Uuid>,
}

/// In-memory `Store` implementation used by tests and local runs.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all persisted events, for assertions.
    pub async fn events(&self) -> Vec<EventRecord> {
        let tables = self.tables.lock().await;
        tables.events.values().cloned().collect()
    }

    /// Snapshot of all companies, for assertions.
    pub async fn companies(&self) -> Vec<Company> {
        let tables = self.tables.lock().await;
        tables.companies.values().cloned().collect()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_event(&self, event: &EventRecord) -> Result<uuid::Uuid> {
        if event.source_url.trim().is_empty() {
            return Err(StoreError::InvalidRecord("empty source_url".into()));
        }

        let mut tables = self.tables.lock().await;
        let key = event.natural_key();

        if let Some(existing) = tables.events.get_mut(&key) {
            // Replace in place, keeping the original identity and creation time.
            let id = existing.id;
            let created_at = existing.created_at;
            let mut updated = event.clone();
            updated.id = id;
            updated.created_at = created_at;
            *existing = updated;
            tracing::debug!(source_url = %event.source_url, discriminator = ?event.discriminator, "Event replaced on natural key");
            return Ok(id);
        }

        let id = event.id;
        tables.events.insert(key, event.clone());
        tracing::debug!(source_url = %event.source_url, discriminator = ?event.discriminator, "Event inserted");
        Ok(id)
    }

    async fn find_company_by_normalized_name(&self, normalized: &str) -> Result<Option<Company>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .companies_by_name
            .get(normalized)
            .and_then(|id| tables.companies.get(id))
            .cloned())
    }

    async fn create_company(&self, name: &str, role: CompanyRole) -> Result<Company> {
        let mut tables = self.tables.lock().await;
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return Err(StoreError::InvalidRecord("empty company name".into()));
        }
        if tables.companies_by_name.contains_key(&normalized) {
            return Err(StoreError::DuplicateCompany(normalized));
        }

        let company = Company::new(name, role);
        tables.companies_by_name.insert(normalized, company.id);
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn add_company_role(&self, id: uuid::Uuid, role: CompanyRole) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let company = tables
            .companies
            .get_mut(&id)
            .ok_or(StoreError::CompanyNotFound(id))?;
        if !company.roles.contains(&role) {
            company.roles.push(role);
        }
        Ok(())
    }

    async fn event_count(&self) -> Result<usize> {
        Ok(self.tables.lock().await.events.len())
    }

    async fn company_count(&self) -> Result<usize> {
        Ok(self.tables.lock().await.companies.len())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
