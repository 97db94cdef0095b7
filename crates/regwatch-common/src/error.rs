use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegwatchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RegwatchError>;
