//! Labeled-field extraction from recall text.
//!
//! Source documents label the same field many ways ("Manufacturer:",
//! "Manufactured by:", "Mfg:"). Each field keeps an ordered list of
//! patterns; the first match in text order wins, so more specific label
//! wordings are listed before looser ones.

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallField {
    ProductName,
    ProductType,
    Manufacturer,
    RecallingFirm,
    Distributor,
    Batches,
    ManufacturingDate,
    ExpiryDate,
}

/// Value capture stops at the end of the line; label wording is matched
/// case-insensitively and tolerates `:` or `-` separators.
fn labeled(label: &str) -> Regex {
    let pattern = format!(r"(?im)^\s*(?:{label})\s*[:\-]\s*(.+)$");
    Regex::new(&pattern).expect("static field pattern")
}

fn variants(labels: &[&str]) -> Vec<Regex> {
    labels.iter().map(|l| labeled(l)).collect()
}

lazy_static! {
    static ref FIELD_PATTERNS: Vec<(RecallField, Vec<Regex>)> = vec![
        (
            RecallField::ProductName,
            variants(&[r"product\s+name", r"name\s+of\s+product", r"product"]),
        ),
        (
            RecallField::ProductType,
            variants(&[r"product\s+type", r"type\s+of\s+product", r"dosage\s+form", r"category"]),
        ),
        (
            RecallField::Manufacturer,
            variants(&[
                r"manufacturer",
                r"manufactured\s+by",
                r"made\s+by",
                r"produced\s+by",
                r"manufacturing\s+firm",
                r"mfg",
            ]),
        ),
        (
            RecallField::RecallingFirm,
            variants(&[
                r"recalling\s+firm",
                r"initiating\s+firm",
                r"responsible\s+firm",
                r"recall\s+initiator",
            ]),
        ),
        (
            RecallField::Distributor,
            variants(&[
                r"distributor",
                r"distributed\s+by",
                r"distributing\s+firm",
                r"importer",
                r"imported\s+by",
                r"supplier",
            ]),
        ),
        (
            RecallField::Batches,
            variants(&[
                r"batch\s+numbers?",
                r"batch\s+nos?",
                r"lot\s+numbers?",
                r"lot\s+nos?",
                r"batch(?:es)?",
                r"lots?",
            ]),
        ),
        (
            RecallField::ManufacturingDate,
            variants(&[
                r"manufacturing\s+date",
                r"date\s+of\s+manufacture",
                r"mfg\.?\s+date",
                r"manufactured\s+on",
            ]),
        ),
        (
            RecallField::ExpiryDate,
            variants(&[
                r"expiry\s+date",
                r"expiration\s+date",
                r"exp\.?\s+date",
                r"expiry",
                r"expires?\s+on",
            ]),
        ),
    ];
}

/// Find the first labeled value for `field` in `text`.
///
/// Variants are tried one at a time over the whole text, so a specific
/// label wording anywhere in the document beats a looser one earlier in it.
pub fn first_match(field: RecallField, text: &str) -> Option<String> {
    let patterns = FIELD_PATTERNS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .map(|(_, patterns)| patterns)?;
    for pattern in patterns {
        if let Some(cap) = pattern.captures(text) {
            let value = tidy_value(&cap[1]);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

fn tidy_value(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '.' || c == ',' || c == ';')
        .trim()
        .to_string()
}

/// Values meaning "we do not know", in any casing.
const FILLER_VALUES: [&str; 6] = ["unknown", "n/a", "na", "not available", "not specified", "none"];

/// Clean a company mention for resolution. Rejects filler values and
/// implausible lengths; preserves the original casing and any legal suffix.
pub fn clean_company_name(raw: &str) -> Option<String> {
    let mut name = tidy_value(raw);
    for article in ["the ", "The ", "a ", "A ", "an ", "An "] {
        if let Some(rest) = name.strip_prefix(article) {
            name = rest.trim().to_string();
            break;
        }
    }
    if name.len() < 2 || name.len() > 100 {
        return None;
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if FILLER_VALUES.contains(&name.to_lowercase().as_str()) {
        return None;
    }
    Some(name)
}
