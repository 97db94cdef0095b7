//! Store error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Company not found: {0}")]
    CompanyNotFound(uuid::Uuid),

    #[error("Duplicate company name after normalization: {0}")]
    DuplicateCompany(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
