//! Company resolution: free-text mentions to stable identities.
//!
//! The same company appears across publications with inconsistent casing,
//! punctuation and spacing. Resolution keys on the normalized form and
//! creates a row on first sight. The lookup-or-create pair runs under a
//! single mutex so two concurrent tasks meeting a new name cannot both
//! create it.

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use regwatch_store::{normalize_name, CompanyRole, Store};

pub struct CompanyResolver {
    store: Arc<dyn Store>,
    creation_lock: Mutex<()>,
}

impl CompanyResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store, creation_lock: Mutex::new(()) }
    }

    /// Resolve a company mention to its id, creating the company on first
    /// sight and unioning `role` into an existing one.
    pub async fn resolve(&self, name: &str, role: CompanyRole) -> anyhow::Result<Uuid> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            bail!("company name {name:?} normalizes to nothing");
        }

        let _guard = self.creation_lock.lock().await;

        if let Some(existing) = self
            .store
            .find_company_by_normalized_name(&normalized)
            .await
            .context("company lookup failed")?
        {
            if !existing.has_role(role) {
                self.store
                    .add_company_role(existing.id, role)
                    .await
                    .with_context(|| format!("adding role {role} to {}", existing.id))?;
            }
            return Ok(existing.id);
        }

        let created = self
            .store
            .create_company(name, role)
            .await
            .with_context(|| format!("creating company {name:?}"))?;
        debug!(company = %created.id, name, %role, "Created company");
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regwatch_store::MemoryStore;

    #[tokio::test]
    async fn test_same_name_different_casing_resolves_once() {
        let store = Arc::new(MemoryStore::new());
        let resolver = CompanyResolver::new(store.clone());

        let a = resolver.resolve("Acme Pharma Ltd.", CompanyRole::Manufacturer).await.unwrap();
        let b = resolver.resolve("ACME  PHARMA LTD", CompanyRole::Distributor).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.company_count().await.unwrap(), 1);

        let companies = store.companies().await;
        assert!(companies[0].has_role(CompanyRole::Manufacturer));
        assert!(companies[0].has_role(CompanyRole::Distributor));
    }

    #[tokio::test]
    async fn test_concurrent_first_sight_creates_one_company() {
        let store = Arc::new(MemoryStore::new());
        let resolver = Arc::new(CompanyResolver::new(store.clone()));

        let r1 = resolver.clone();
        let r2 = resolver.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { r1.resolve("New Firm Ltd", CompanyRole::Manufacturer).await }),
            tokio::spawn(async move { r2.resolve("new firm ltd", CompanyRole::RecallingFirm).await }),
        );
        assert_eq!(a.unwrap().unwrap(), b.unwrap().unwrap());
        assert_eq!(store.company_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unnormalizable_name_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let resolver = CompanyResolver::new(store);
        assert!(resolver.resolve("  ---  ", CompanyRole::Manufacturer).await.is_err());
    }
}
