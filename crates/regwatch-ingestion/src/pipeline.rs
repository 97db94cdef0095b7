//! Ingestion orchestration.
//!
//! One run walks each category's listing page, then for every listed item:
//! fetch content, extract text, normalize into drafts, resolve company
//! mentions, upsert. Item failures are recorded and skipped; only an
//! unreachable store aborts a run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use regwatch_store::{CompanyRole, EventCategory, Store};

use crate::extract::{html::ListingRow, html::parse_listing, Extractor};
use crate::fetcher::{Fetched, Fetcher};
use crate::models::{EventDraft, PageMetadata};
use crate::normalise::normalize;
use crate::repository::{IngestionRepository, ResolvedCompanies};
use crate::resolver::CompanyResolver;

// ── Job configuration ───────────────────────────────────────────────────────

/// Configuration for one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionJob {
    pub recalls_url: String,
    pub alerts_url: String,
    pub notices_url: String,
    /// Per-category cap on items processed; `None` means everything listed.
    pub limit: Option<usize>,
    /// Fetched PDFs are archived under `<output_dir>/<category>/`.
    pub output_dir: PathBuf,
    /// Direct PDF text below this word count is retried through OCR.
    pub min_word_yield: usize,
}

impl Default for IngestionJob {
    fn default() -> Self {
        Self {
            recalls_url: "https://fdaghana.gov.gh/newsroom/product-recalls/".into(),
            alerts_url: "https://fdaghana.gov.gh/newsroom/product-alerts/".into(),
            notices_url: "https://fdaghana.gov.gh/newsroom/public-notices/".into(),
            limit: None,
            output_dir: PathBuf::from("data/pdfs"),
            min_word_yield: crate::extract::MIN_WORD_YIELD,
        }
    }
}

impl IngestionJob {
    fn listing_url(&self, category: EventCategory) -> &str {
        match category {
            EventCategory::Recall => &self.recalls_url,
            EventCategory::Alert => &self.alerts_url,
            EventCategory::Notice => &self.notices_url,
        }
    }
}

// ── Progress and summaries ──────────────────────────────────────────────────

/// Pipeline stages an item moves through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Discovered,
    ContentFetched,
    Extracted,
    Normalized,
    Resolved,
    Persisted,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Discovered     => "discovered",
            Stage::ContentFetched => "content_fetched",
            Stage::Extracted      => "extracted",
            Stage::Normalized     => "normalized",
            Stage::Resolved       => "resolved",
            Stage::Persisted      => "persisted",
        };
        write!(f, "{name}")
    }
}

/// Failure of one item, tagged with the stage it failed at.
#[derive(Debug)]
struct StageError {
    stage: Stage,
    source: anyhow::Error,
}

impl StageError {
    fn new(stage: Stage, source: anyhow::Error) -> Self {
        Self { stage, source }
    }
}

/// Progress event published on the broadcast channel during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionProgress {
    pub run_id: Uuid,
    pub category: EventCategory,
    pub stage: Stage,
    pub message: String,
    pub items_done: usize,
    pub items_total: usize,
    /// Set when the item failed at `stage`.
    pub error: Option<String>,
}

/// Per-category outcome of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySummary {
    pub items_discovered: usize,
    pub items_persisted: usize,
    pub items_failed: usize,
    pub errors: Vec<String>,
}

/// Aggregated outcome of a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub run_id: Uuid,
    pub items_discovered: usize,
    pub items_persisted: usize,
    pub items_failed: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

// ── Pipeline ────────────────────────────────────────────────────────────────

pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn Store>,
    extractor: Extractor,
    resolver: Arc<CompanyResolver>,
    repository: IngestionRepository,
    job: IngestionJob,
    run_id: Uuid,
    progress: Option<broadcast::Sender<IngestionProgress>>,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, store: Arc<dyn Store>, job: IngestionJob) -> Self {
        Self {
            fetcher,
            extractor: Extractor::new().min_word_yield(job.min_word_yield),
            resolver: Arc::new(CompanyResolver::new(store.clone())),
            repository: IngestionRepository::new(store.clone()),
            store,
            job,
            run_id: Uuid::new_v4(),
            progress: None,
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Subscribe to progress events for this run.
    pub fn progress_channel(&mut self, capacity: usize) -> broadcast::Receiver<IngestionProgress> {
        let (tx, rx) = broadcast::channel(capacity);
        self.progress = Some(tx);
        rx
    }

    /// Run all categories concurrently and aggregate the outcome.
    ///
    /// The store is probed up front; an unreachable store is the one fatal
    /// condition, everything downstream is isolated per item.
    #[instrument(skip(self), fields(run_id = %self.run_id))]
    pub async fn run_all(&self) -> anyhow::Result<IngestionSummary> {
        let started = Instant::now();
        self.store.ping().await.context("store is unreachable, aborting run")?;

        let (recalls, alerts, notices) = tokio::join!(
            self.run_category(EventCategory::Recall),
            self.run_category(EventCategory::Alert),
            self.run_category(EventCategory::Notice),
        );

        let mut summary = IngestionSummary {
            run_id: self.run_id,
            items_discovered: 0,
            items_persisted: 0,
            items_failed: 0,
            errors: Vec::new(),
            duration_ms: 0,
        };
        for (category, outcome) in EventCategory::ALL.iter().zip([recalls, alerts, notices]) {
            match outcome {
                Ok(cat) => {
                    summary.items_discovered += cat.items_discovered;
                    summary.items_persisted += cat.items_persisted;
                    summary.items_failed += cat.items_failed;
                    summary.errors.extend(cat.errors);
                }
                // A broken listing page fails its category, not the run.
                Err(e) => {
                    warn!(%category, error = %e, "Category run failed");
                    summary.errors.push(format!("{category}: {e:#}"));
                }
            }
        }
        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            persisted = summary.items_persisted,
            failed = summary.items_failed,
            duration_ms = summary.duration_ms,
            "Run complete"
        );
        Ok(summary)
    }

    /// Ingest one category's listing end to end.
    #[instrument(skip(self), fields(run_id = %self.run_id, %category))]
    pub async fn run_category(&self, category: EventCategory) -> anyhow::Result<CategorySummary> {
        let listing_url = self.job.listing_url(category);
        let listing = match self
            .fetcher
            .fetch(listing_url)
            .await
            .with_context(|| format!("failed to fetch listing {listing_url}"))?
        {
            Fetched::Html(html) => html,
            Fetched::Pdf(_) => anyhow::bail!("listing {listing_url} returned a PDF"),
        };

        let mut rows = parse_listing(&listing, listing_url);
        if let Some(limit) = self.job.limit {
            rows.truncate(limit);
        }
        let total = rows.len();
        info!(items = total, "Listing parsed");

        let mut summary = CategorySummary { items_discovered: total, ..Default::default() };
        for (index, row) in rows.into_iter().enumerate() {
            self.emit(category, Stage::Discovered, index, total, None);
            match self.ingest_item(category, &row).await {
                Ok(persisted) => {
                    summary.items_persisted += persisted;
                    self.emit(category, Stage::Persisted, index + 1, total, None);
                }
                Err(e) => {
                    summary.items_failed += 1;
                    let detail =
                        format!("{category} item {} failed at {}: {:#}", index + 1, e.stage, e.source);
                    warn!(item = index + 1, stage = %e.stage, error = %e.source, "Item failed, continuing");
                    self.emit(category, e.stage, index + 1, total, Some(detail.clone()));
                    summary.errors.push(detail);
                }
            }
        }
        Ok(summary)
    }

    /// Carry one listing row through fetch, extract, normalize, resolve and
    /// persist. Returns the number of rows upserted (splitting can make it
    /// more than one).
    async fn ingest_item(
        &self,
        category: EventCategory,
        row: &ListingRow,
    ) -> Result<usize, StageError> {
        let content_url = row
            .pdf_url
            .as_deref()
            .or(row.detail_url.as_deref())
            .ok_or_else(|| {
                StageError::new(Stage::Discovered, anyhow::anyhow!("listing row carries no link"))
            })?;

        let mut meta = metadata_from_row(category, row, content_url);

        let fetched = self.fetcher.fetch(content_url).await.map_err(|e| {
            StageError::new(
                Stage::ContentFetched,
                anyhow::Error::new(e).context(format!("failed to fetch {content_url}")),
            )
        })?;

        let extraction = match fetched {
            Fetched::Html(html) => self.extractor.extract_html(&html, content_url),
            Fetched::Pdf(bytes) => {
                meta.pdf_path = self
                    .archive_pdf(category, &meta.title, &bytes)
                    .await
                    .map(|p| p.to_string_lossy().into_owned());
                let extractor = self.extractor.clone();
                let url = content_url.to_string();
                tokio::task::spawn_blocking(move || extractor.extract_pdf(&bytes, &url))
                    .await
                    .map_err(|e| {
                        StageError::new(
                            Stage::Extracted,
                            anyhow::Error::new(e).context("PDF extraction task panicked"),
                        )
                    })?
            }
        };

        if !extraction.is_usable() {
            warn!(url = content_url, "Extraction failed, persisting placeholder text");
        }

        let drafts = normalize(category, &extraction.text, &meta);
        if drafts.is_empty() {
            return Err(StageError::new(
                Stage::Normalized,
                anyhow::anyhow!("normalization produced no drafts"),
            ));
        }

        let mut persisted = 0;
        for draft in &drafts {
            let resolved = self.resolve_companies(draft).await;
            self.repository
                .upsert_draft(draft, &resolved)
                .await
                .map_err(|e| StageError::new(Stage::Persisted, e))?;
            persisted += 1;
        }
        Ok(persisted)
    }

    /// Resolve the companies a draft mentions. A failed resolution leaves
    /// that id unset rather than failing the draft.
    async fn resolve_companies(&self, draft: &EventDraft) -> ResolvedCompanies {
        let Some(recall) = draft.recall() else {
            return ResolvedCompanies::default();
        };

        let mut resolved = ResolvedCompanies::default();
        let mentions = [
            (recall.manufacturer.as_deref(), CompanyRole::Manufacturer),
            (recall.recalling_firm.as_deref(), CompanyRole::RecallingFirm),
            (recall.distributor.as_deref(), CompanyRole::Distributor),
        ];
        for (mention, role) in mentions {
            let Some(name) = mention else { continue };
            match self.resolver.resolve(name, role).await {
                Ok(id) => match role {
                    CompanyRole::Manufacturer => resolved.manufacturer_id = Some(id),
                    CompanyRole::RecallingFirm => resolved.recalling_firm_id = Some(id),
                    CompanyRole::Distributor => resolved.distributor_id = Some(id),
                },
                Err(e) => warn!(name, %role, error = %e, "Company resolution failed"),
            }
        }
        resolved
    }

    /// Archive fetched PDF bytes under the job's output directory. Archival
    /// is best effort; a write failure only loses the local copy.
    async fn archive_pdf(&self, category: EventCategory, title: &str, bytes: &[u8]) -> Option<PathBuf> {
        let dir = self.job.output_dir.join(category_dir(category));
        let path = dir.join(format!("{}.pdf", sanitize_filename(title)));
        let result: anyhow::Result<()> = async {
            tokio::fs::create_dir_all(&dir).await?;
            tokio::fs::write(&path, bytes).await?;
            Ok(())
        }
        .await;
        match result {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to archive PDF");
                None
            }
        }
    }

    fn emit(
        &self,
        category: EventCategory,
        stage: Stage,
        items_done: usize,
        items_total: usize,
        error: Option<String>,
    ) {
        let Some(tx) = &self.progress else { return };
        // Send failures just mean nobody is listening anymore.
        let _ = tx.send(IngestionProgress {
            run_id: self.run_id,
            category,
            stage,
            message: format!("{category}: {stage} {items_done}/{items_total}"),
            items_done,
            items_total,
            error,
        });
    }
}

// ── Row mapping helpers ─────────────────────────────────────────────────────

/// Map listing cells to page context. Recall tables carry structured
/// product columns; alert and notice tables are just date and title.
fn metadata_from_row(category: EventCategory, row: &ListingRow, source_url: &str) -> PageMetadata {
    let cell = |i: usize| row.cells.get(i).filter(|c| !c.is_empty()).cloned();

    match category {
        EventCategory::Recall => PageMetadata {
            title: cell(1).unwrap_or_else(|| "Untitled recall".into()),
            source_url: source_url.to_string(),
            date_text: cell(0),
            pdf_path: None,
            product_name: cell(1),
            product_type: cell(2),
            manufacturer: cell(3),
            recalling_firm: cell(4),
            batches: cell(5),
            manufacturing_date: cell(6),
            expiry_date: cell(7),
        },
        EventCategory::Alert | EventCategory::Notice => PageMetadata {
            title: cell(1).unwrap_or_else(|| "Untitled publication".into()),
            source_url: source_url.to_string(),
            date_text: cell(0),
            ..Default::default()
        },
    }
}

fn category_dir(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Recall => "recalls",
        EventCategory::Alert => "alerts",
        EventCategory::Notice => "notices",
    }
}

/// Conservative filename from a publication title.
fn sanitize_filename(title: &str) -> String {
    let mut name: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    name.truncate(100);
    if name.trim_matches('_').is_empty() {
        name = "document".into();
    }
    name
}
