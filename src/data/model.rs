use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Record – one normalized observation
// ---------------------------------------------------------------------------

/// Placeholder entity substituted when the CSV cell is blank. Records
/// carrying it never survive the loader.
pub const UNKNOWN_ENTITY: &str = "Unknown";

/// One normalized observation: an entity (country or region), a year, and
/// the numeric fields named by the dataset's column mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity: String,
    pub year: i32,
    /// Semantic field name → value.
    pub values: BTreeMap<String, f64>,
}

impl Record {
    /// Value of a semantic field, 0.0 when the field is absent.
    pub fn value(&self, field: &str) -> f64 {
        self.values.get(field).copied().unwrap_or(0.0)
    }
}

/// Sorted set of distinct entities in a record slice.
pub fn distinct_entities(records: &[Record]) -> BTreeSet<String> {
    records.iter().map(|r| r.entity.clone()).collect()
}

/// Smallest and largest year present, or `None` for an empty slice.
pub fn year_span(records: &[Record]) -> Option<(i32, i32)> {
    let min = records.iter().map(|r| r.year).min()?;
    let max = records.iter().map(|r| r.year).max()?;
    Some((min, max))
}

// ---------------------------------------------------------------------------
// Metadata – citation / description for one dataset
// ---------------------------------------------------------------------------

/// Subtitle and citation fetched from a dataset's metadata resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub description: String,
    pub citation: String,
    /// Failure reason when the metadata fetch fell back to defaults.
    pub note: Option<String>,
}

impl Metadata {
    /// Placeholder used until the metadata resource is fetched, and as the
    /// fallback when that fetch fails.
    pub fn defaults(key: &str, description: &str) -> Self {
        Metadata {
            description: description.to_string(),
            citation: format!("Fonte: {key}"),
            note: None,
        }
    }
}

// ---------------------------------------------------------------------------
// LoadState – loading indicator observed by the UI
// ---------------------------------------------------------------------------

/// Lifecycle of one dataset's load.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Pending,
    Loaded,
    Failed(String),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded)
    }
}
