//! Recall normalization, including multi-product splitting.
//!
//! A single recall publication may cover several products, each introduced
//! by its own "Product Name:" label. Splitting yields one draft per
//! product; page-level context (manufacturer, reason) is shared across the
//! drafts while product-specific fields come from each block.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use regwatch_store::EventCategory;

use crate::models::{EventDetail, EventDraft, PageMetadata, RecallDetail};
use crate::normalise::dates::parse_date;
use crate::normalise::fields::{clean_company_name, first_match, RecallField};
use crate::normalise::reason::{extract_reason, labeled_reason};

lazy_static! {
    static ref PRODUCT_LABEL_RE: Regex =
        Regex::new(r"(?im)^\s*product\s*name\s*[:\-]").expect("static regex");
}

/// Normalize one recall page into one draft per product.
pub fn normalize_recall(raw_text: &str, meta: &PageMetadata) -> Vec<EventDraft> {
    let offsets: Vec<usize> = PRODUCT_LABEL_RE
        .find_iter(raw_text)
        .map(|m| m.start())
        .collect();

    if offsets.len() < 2 {
        return vec![draft_from(page_fields(raw_text, raw_text, meta), meta, raw_text)];
    }

    debug!(products = offsets.len(), url = %meta.source_url, "Splitting multi-product recall");

    // Product-specific defaults come from the preamble only; a value labeled
    // inside one product's block must never leak into a sibling block that
    // lacks its own label.
    let preamble = &raw_text[..offsets[0]];
    let page = page_fields(preamble, raw_text, meta);

    offsets
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = offsets.get(i + 1).copied().unwrap_or(raw_text.len());
            let mut detail = page.clone();
            apply_block_overrides(&mut detail, &raw_text[start..end]);
            draft_from(detail, meta, raw_text)
        })
        .collect()
}

/// Fields resolved at page scope: labeled text wins, listing cells fill in.
///
/// Product-specific fields (name, type, batches, manufacturing and expiry
/// dates) are searched in `product_scope`; shared fields (companies, reason)
/// in `shared_scope`. On a single-product page both are the whole text; on a
/// multi-product page `product_scope` is the preamble before the first
/// product block.
fn page_fields(product_scope: &str, shared_scope: &str, meta: &PageMetadata) -> RecallDetail {
    let product = |field, fallback: &Option<String>| {
        first_match(field, product_scope).or_else(|| fallback.clone())
    };
    let shared = |field, fallback: &Option<String>| {
        first_match(field, shared_scope).or_else(|| fallback.clone())
    };

    RecallDetail {
        product_name: product(RecallField::ProductName, &meta.product_name)
            .unwrap_or_else(|| meta.title.clone()),
        product_type: product(RecallField::ProductType, &meta.product_type),
        batches: split_batches(product(RecallField::Batches, &meta.batches).as_deref()),
        manufacturing_date: product(RecallField::ManufacturingDate, &meta.manufacturing_date)
            .as_deref()
            .and_then(parse_date),
        expiry_date: product(RecallField::ExpiryDate, &meta.expiry_date)
            .as_deref()
            .and_then(parse_date),
        reason_for_action: extract_reason(shared_scope),
        manufacturer: shared(RecallField::Manufacturer, &meta.manufacturer)
            .as_deref()
            .and_then(clean_company_name),
        recalling_firm: shared(RecallField::RecallingFirm, &meta.recalling_firm)
            .as_deref()
            .and_then(clean_company_name),
        distributor: first_match(RecallField::Distributor, shared_scope)
            .as_deref()
            .and_then(clean_company_name),
    }
}

/// Product-specific fields found inside a block replace the page values.
fn apply_block_overrides(detail: &mut RecallDetail, block: &str) {
    if let Some(name) = first_match(RecallField::ProductName, block) {
        detail.product_name = name;
    }
    if let Some(product_type) = first_match(RecallField::ProductType, block) {
        detail.product_type = Some(product_type);
    }
    if let Some(batches) = first_match(RecallField::Batches, block) {
        detail.batches = split_batches(Some(&batches));
    }
    if let Some(date) = first_match(RecallField::ManufacturingDate, block).as_deref().and_then(parse_date) {
        detail.manufacturing_date = Some(date);
    }
    if let Some(date) = first_match(RecallField::ExpiryDate, block).as_deref().and_then(parse_date) {
        detail.expiry_date = Some(date);
    }
    if let Some(reason) = labeled_reason(block) {
        detail.reason_for_action = Some(reason);
    }
}

fn split_batches(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else { return Vec::new() };
    raw.split([',', ';'])
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect()
}

fn draft_from(detail: RecallDetail, meta: &PageMetadata, raw_text: &str) -> EventDraft {
    EventDraft {
        category: EventCategory::Recall,
        title: meta.title.clone(),
        event_date: meta.date_text.as_deref().and_then(parse_date),
        source_url: meta.source_url.clone(),
        pdf_path: meta.pdf_path.clone(),
        raw_text: raw_text.to_string(),
        detail: EventDetail::Recall(detail),
    }
}
