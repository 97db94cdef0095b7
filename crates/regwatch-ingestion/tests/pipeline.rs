//! End-to-end pipeline tests over canned pages and the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use regwatch_common::RegwatchError;
use regwatch_ingestion::{
    EventCategory, Fetched, Fetcher, IngestionJob, Pipeline, Stage,
};
use regwatch_store::{CompanyRole, MemoryStore, Store};

struct StubFetcher {
    pages: HashMap<String, Fetched>,
}

impl StubFetcher {
    fn new(pages: Vec<(String, Fetched)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> regwatch_common::Result<Fetched> {
        self.pages.get(url).cloned().ok_or_else(|| RegwatchError::Fetch {
            url: url.to_string(),
            reason: "connection refused".into(),
        })
    }
}

const BASE: &str = "https://fda.example.gov";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn recalls_listing() -> String {
    format!(
        r#"<html><body><table><tbody>
            <tr><th>Date</th><th>Product Name</th></tr>
            <tr>
              <td>15/03/2023</td>
              <td><a href="{BASE}/recalls/affected-syrups/">Affected Syrups</a></td>
              <td>Syrup</td>
              <td>Acme Pharma Ltd</td>
              <td>Acme Pharma Ltd</td>
              <td></td>
              <td></td>
              <td></td>
            </tr>
            <tr>
              <td>10/03/2023</td>
              <td><a href="{BASE}/recalls/gone/">Withdrawn Tonic</a></td>
            </tr>
        </tbody></table></body></html>"#
    )
}

fn multi_product_detail() -> Fetched {
    Fetched::Html(
        r#"<html><body><main>
            <p>Manufacturer: Acme Pharma Ltd</p>
            <p>Recalling Firm: Acme Pharma Ltd</p>
            <p>Reason for recall: contamination found in both batches</p>
            <p>Product Name: Syrup A</p>
            <p>Batch No: B1</p>
            <p>Product Name: Syrup B</p>
            <p>Batch No: B2</p>
        </main></body></html>"#
            .to_string(),
    )
}

fn single_item_listing(href: &str, title: &str) -> Fetched {
    Fetched::Html(format!(
        r#"<html><body><table><tbody>
            <tr><td>01/02/2023</td><td><a href="{href}">{title}</a></td></tr>
        </tbody></table></body></html>"#
    ))
}

fn job(output_dir: &std::path::Path) -> IngestionJob {
    IngestionJob {
        recalls_url: format!("{BASE}/recalls/"),
        alerts_url: format!("{BASE}/alerts/"),
        notices_url: format!("{BASE}/notices/"),
        output_dir: output_dir.to_path_buf(),
        ..IngestionJob::default()
    }
}

fn fetcher() -> Arc<StubFetcher> {
    Arc::new(StubFetcher::new(vec![
        (format!("{BASE}/recalls/"), Fetched::Html(recalls_listing())),
        (format!("{BASE}/recalls/affected-syrups/"), multi_product_detail()),
        (
            format!("{BASE}/alerts/"),
            single_item_listing(&format!("{BASE}/uploads/alert.pdf"), "Counterfeit Alert"),
        ),
        (
            format!("{BASE}/uploads/alert.pdf"),
            Fetched::Pdf(b"not really a pdf".to_vec()),
        ),
        (
            format!("{BASE}/notices/"),
            single_item_listing(&format!("{BASE}/notices/closure/"), "Facility Closure"),
        ),
        (
            format!("{BASE}/notices/closure/"),
            Fetched::Html(
                "<html><body><main><p>The facility was closed after inspection.</p></main></body></html>"
                    .into(),
            ),
        ),
    ]))
}

#[tokio::test]
async fn test_full_run_splits_resolves_and_isolates_failures() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(fetcher(), store.clone(), job(dir.path()));

    let summary = pipeline.run_all().await.unwrap();

    // Four listed items; the dead recall link fails, everything else lands.
    assert_eq!(summary.items_discovered, 4);
    assert_eq!(summary.items_failed, 1);
    assert_eq!(summary.items_persisted, 4);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("gone"));

    // The multi-product recall split into two rows sharing page context.
    let events = store.events().await;
    let mut recalls: Vec<_> = events
        .iter()
        .filter(|e| e.category == EventCategory::Recall)
        .collect();
    recalls.sort_by_key(|e| e.product_name.clone());
    assert_eq!(recalls.len(), 2);
    assert_eq!(recalls[0].product_name.as_deref(), Some("Syrup A"));
    assert_eq!(recalls[1].product_name.as_deref(), Some("Syrup B"));
    assert_eq!(recalls[0].batches, vec!["B1"]);
    assert_eq!(recalls[1].batches, vec!["B2"]);
    assert_eq!(recalls[0].reason_for_action, recalls[1].reason_for_action);
    assert!(recalls[0]
        .reason_for_action
        .as_deref()
        .unwrap()
        .contains("contamination"));

    // One company, shared across both rows, holding both roles.
    assert_eq!(store.company_count().await.unwrap(), 1);
    assert!(recalls[0].manufacturer_id.is_some());
    assert_eq!(recalls[0].manufacturer_id, recalls[1].manufacturer_id);
    assert_eq!(recalls[0].manufacturer_id, recalls[0].recalling_firm_id);
    let company = &store.companies().await[0];
    assert!(company.has_role(CompanyRole::Manufacturer));
    assert!(company.has_role(CompanyRole::RecallingFirm));

    // The unparseable PDF still produced an auditable row.
    let alert = events
        .iter()
        .find(|e| e.category == EventCategory::Alert)
        .unwrap();
    assert!(alert.raw_text.contains("[extraction failed]"));
    assert_eq!(alert.title, "Counterfeit Alert");

    // And its bytes were archived locally.
    let pdf_path = alert.pdf_path.as_deref().unwrap();
    assert!(std::path::Path::new(pdf_path).exists());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(fetcher(), store.clone(), job(dir.path()));

    pipeline.run_all().await.unwrap();
    let events_after_first = store.event_count().await.unwrap();
    let companies_after_first = store.company_count().await.unwrap();

    pipeline.run_all().await.unwrap();
    assert_eq!(store.event_count().await.unwrap(), events_after_first);
    assert_eq!(store.company_count().await.unwrap(), companies_after_first);
}

#[tokio::test]
async fn test_limit_caps_each_category() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let mut config = job(dir.path());
    config.limit = Some(1);
    let pipeline = Pipeline::new(fetcher(), store.clone(), config);

    let summary = pipeline.run_all().await.unwrap();
    // One item per category; the dead recall link is past the cap.
    assert_eq!(summary.items_discovered, 3);
    assert_eq!(summary.items_failed, 0);
}

#[tokio::test]
async fn test_progress_events_are_published() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::new());
    let mut pipeline = Pipeline::new(fetcher(), store, job(dir.path()));
    let mut progress = pipeline.progress_channel(64);

    pipeline.run_all().await.unwrap();

    let mut persisted = 0;
    let mut failed = 0;
    while let Ok(event) = progress.try_recv() {
        if event.stage == Stage::Persisted {
            persisted += 1;
        }
        if event.error.is_some() {
            failed += 1;
        }
    }
    assert_eq!(persisted, 3);
    assert_eq!(failed, 1);
}
