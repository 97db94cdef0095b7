//! Shared error type used across all regwatch crates.

pub mod error;

pub use error::{RegwatchError, Result};
