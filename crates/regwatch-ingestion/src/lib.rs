//! Regulatory publication ingestion pipeline.
//!
//! Turns loosely structured source pages (HTML listing tables, detail
//! pages, linked PDFs, scanned PDFs) into typed, deduplicated records:
//! - Content extraction (HTML and PDF, with OCR fallback for scans)
//! - Record normalization (labeled-field patterns, multi-product splitting,
//!   layered reason extraction, permissive date parsing)
//! - Company resolution (lookup-or-create on normalized names)
//! - Per-category orchestration with per-item error isolation and
//!   idempotent upserts

pub mod extract;
pub mod fetcher;
pub mod models;
pub mod normalise;
pub mod pipeline;
pub mod repository;
pub mod resolver;

pub use extract::{Confidence, ExtractionResult, Extractor};
pub use fetcher::{Fetched, Fetcher, HttpFetcher};
pub use models::{EventDetail, EventDraft, PageMetadata, RecallDetail};
pub use pipeline::{IngestionJob, IngestionProgress, IngestionSummary, Pipeline, Stage};
pub use resolver::CompanyResolver;

// The category and role enums live with the row types; re-export them so
// pipeline callers only need this crate.
pub use regwatch_store::{CompanyRole, EventCategory};
