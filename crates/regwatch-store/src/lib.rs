//! Regwatch persistence layer.
//!
//! Defines the storage contract the ingestion pipeline writes through
//! (`Store`), the row types for the two tables it maintains
//! (`regulatory_events` and `companies`), and an in-process reference
//! implementation (`MemoryStore`) with the same upsert and uniqueness
//! semantics a relational backend must provide:
//!
//! - `upsert_event` replaces on the natural key `(source_url, discriminator)`
//! - company names are unique after normalization, never raw-string unique

pub mod error;
pub mod memory;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use schema::{normalize_name, Company, CompanyRole, EventCategory, EventRecord};
pub use store::Store;
