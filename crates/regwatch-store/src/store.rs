//! Storage contract consumed by the ingestion pipeline.

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::{Company, CompanyRole, EventRecord};

/// Persistence capability the pipeline writes through.
///
/// Implementations must guarantee that `upsert_event` keyed on
/// `(source_url, discriminator)` is safe to call repeatedly with the same
/// key (replace semantics), so that re-running ingestion never grows the
/// row count. `create_company` must reject a name whose normalized form
/// already exists; callers serialize the lookup-or-create sequence, but the
/// store-level check is the backstop.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace an event on its natural key. Returns the row id
    /// (the existing id when an earlier run already persisted the key).
    async fn upsert_event(&self, event: &EventRecord) -> Result<uuid::Uuid>;

    /// Exact lookup on the normalized company name.
    async fn find_company_by_normalized_name(&self, normalized: &str) -> Result<Option<Company>>;

    /// Create a company with the given display name and initial role.
    async fn create_company(&self, name: &str, role: CompanyRole) -> Result<Company>;

    /// Enlarge a company's role set with `role` (no-op if already present).
    async fn add_company_role(&self, id: uuid::Uuid, role: CompanyRole) -> Result<()>;

    async fn event_count(&self) -> Result<usize>;

    async fn company_count(&self) -> Result<usize>;

    /// Cheap reachability probe. A failure here is fatal to a run, unlike
    /// per-item write failures.
    async fn ping(&self) -> Result<()>;
}
