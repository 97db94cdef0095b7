//! HTTP fetching behind a trait so the pipeline can be driven by canned
//! responses in tests.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use regwatch_common::{RegwatchError, Result};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// A fetched document, discriminated by content type.
#[derive(Debug, Clone)]
pub enum Fetched {
    Html(String),
    Pdf(Vec<u8>),
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Fetched>;
}

/// Production fetcher over a shared reqwest client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegwatchError::Fetch {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        let is_pdf = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_lowercase().contains("pdf"))
            .unwrap_or(false)
            || url.to_lowercase().split('?').next().unwrap_or("").ends_with(".pdf");

        debug!(url, %status, is_pdf, "Fetched document");

        if is_pdf {
            let bytes = response.bytes().await?;
            Ok(Fetched::Pdf(bytes.to_vec()))
        } else {
            let text = response.text().await?;
            Ok(Fetched::Html(text))
        }
    }
}
