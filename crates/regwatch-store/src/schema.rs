//! Row types for the `regulatory_events` and `companies` tables.
//!
//! The event model is a tagged union over three categories sharing common
//! fields; the variants differ only in which optional fields are populated,
//! so the row keeps everything flat and nullable with `category` as the tag.

// ── Event category ──────────────────────────────────────────────────────────

/// The three kinds of regulatory publication the pipeline ingests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EventCategory {
    Recall,
    Alert,
    Notice,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Recall => "Product Recall",
            EventCategory::Alert  => "Alert",
            EventCategory::Notice => "Public Notice",
        }
    }

    /// All categories, in the order a full run processes them.
    pub const ALL: [EventCategory; 3] =
        [EventCategory::Recall, EventCategory::Alert, EventCategory::Notice];
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Regulatory event row ────────────────────────────────────────────────────

/// A persisted regulatory event.
///
/// The natural key is `(source_url, discriminator)`: a multi-product recall
/// page yields several rows sharing `source_url`, distinguished by the
/// product name carried in `discriminator`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventRecord {
    pub id: uuid::Uuid,
    pub category: EventCategory,
    pub title: String,
    /// Source dates are often missing or malformed; `None` means unknown.
    pub event_date: Option<chrono::NaiveDate>,
    pub source_url: String,
    /// Distinguishes split records from one multi-product source page.
    pub discriminator: Option<String>,
    pub pdf_path: Option<String>,
    pub raw_text: String,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub batches: Vec<String>,
    pub manufacturing_date: Option<chrono::NaiveDate>,
    pub expiry_date: Option<chrono::NaiveDate>,
    pub reason_for_action: Option<String>,
    pub manufacturer_id: Option<uuid::Uuid>,
    pub recalling_firm_id: Option<uuid::Uuid>,
    pub distributor_id: Option<uuid::Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EventRecord {
    pub fn new(category: EventCategory, title: String, source_url: String, raw_text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            category,
            title,
            event_date: None,
            source_url,
            discriminator: None,
            pdf_path: None,
            raw_text,
            product_name: None,
            product_type: None,
            batches: Vec::new(),
            manufacturing_date: None,
            expiry_date: None,
            reason_for_action: None,
            manufacturer_id: None,
            recalling_firm_id: None,
            distributor_id: None,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn natural_key(&self) -> (String, Option<String>) {
        (self.source_url.clone(), self.discriminator.clone())
    }
}

// ── Company row ─────────────────────────────────────────────────────────────

/// Roles a company can hold across events. A single company may appear as
/// both manufacturer and recalling firm, so the row stores the union of
/// roles it has been seen in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CompanyRole {
    Manufacturer,
    RecallingFirm,
    Distributor,
}

impl std::fmt::Display for CompanyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanyRole::Manufacturer  => write!(f, "manufacturer"),
            CompanyRole::RecallingFirm => write!(f, "recalling_firm"),
            CompanyRole::Distributor   => write!(f, "distributor"),
        }
    }
}

impl std::str::FromStr for CompanyRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manufacturer"                     => Ok(CompanyRole::Manufacturer),
            "recalling_firm" | "recallingfirm" => Ok(CompanyRole::RecallingFirm),
            "distributor"                      => Ok(CompanyRole::Distributor),
            _ => Err(format!("Unknown company role: {}", s)),
        }
    }
}

/// A deduplicated company identity.
///
/// `name` keeps the original casing from the first mention; equality is
/// decided on `normalized_name`. The enrichment fields (`founding_date`,
/// `founders`, `description`) are written by the external enrichment
/// collaborator, never by the ingestion core.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Company {
    pub id: uuid::Uuid,
    pub name: String,
    pub normalized_name: String,
    pub roles: Vec<CompanyRole>,
    pub country_code: Option<String>,
    pub founding_date: Option<chrono::NaiveDate>,
    pub founders: Option<String>,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Company {
    pub fn new(name: &str, role: CompanyRole) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            name: name.trim().to_string(),
            normalized_name: normalize_name(name),
            roles: vec![role],
            country_code: None,
            founding_date: None,
            founders: None,
            description: None,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn has_role(&self, role: CompanyRole) -> bool {
        self.roles.contains(&role)
    }
}

/// Normalize a company name for equality matching: case-fold, strip
/// punctuation, collapse internal whitespace. The display name keeps its
/// original form; only matching goes through this.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
