use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use crate::config::DatasetConfig;

use super::model::{distinct_entities, Metadata, Record, UNKNOWN_ENTITY};
use super::normalize;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal outcomes of a dataset load. Metadata trouble is deliberately
/// absent: it degrades to default text instead of failing the load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The CSV resource could not be fetched or read.
    #[error("CSV indisponível: {0:#}")]
    CsvUnavailable(anyhow::Error),
    /// The CSV text could not be parsed.
    #[error("CSV inválido: {0}")]
    CsvMalformed(#[from] csv::Error),
}

/// Everything a successful load produces.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub metadata: Metadata,
    pub records: Vec<Record>,
}

// ---------------------------------------------------------------------------
// Resource fetching
// ---------------------------------------------------------------------------

/// Fetch a resource as text: `http(s)://` URLs via reqwest, anything else as
/// a file under `data_dir`.
fn fetch_text(resource: &str, data_dir: &Path) -> Result<String> {
    if resource.starts_with("http://") || resource.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;
        let response = client
            .get(resource)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("fetching {resource}"))?;
        response.text().context("reading response body")
    } else {
        let path = data_dir.join(resource);
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Pull a string field out of a metadata JSON object. The field may sit at
/// the top level or nested one object deep (e.g. under `chart`).
fn extract_field(root: &JsonValue, key: &str) -> Option<String> {
    if let Some(s) = root.get(key).and_then(JsonValue::as_str) {
        return Some(s.to_string());
    }
    root.as_object()?
        .values()
        .find_map(|v| v.get(key).and_then(JsonValue::as_str).map(str::to_string))
}

/// Fetch the metadata resource. Never fails: any trouble falls back to the
/// config's default description and a `Fonte: <key>` citation, keeping the
/// reason for display.
pub fn fetch_metadata(config: &DatasetConfig, data_dir: &Path) -> Metadata {
    let fallback = |reason: String| {
        log::warn!("{}: metadata fallback: {reason}", config.key);
        Metadata {
            note: Some(reason),
            ..Metadata::defaults(&config.key, &config.description)
        }
    };

    let text = match fetch_text(&config.metadata_resource, data_dir) {
        Ok(text) => text,
        Err(e) => return fallback(format!("{e:#}")),
    };
    let root: JsonValue = match serde_json::from_str(&text) {
        Ok(root) => root,
        Err(e) => return fallback(format!("parsing metadata JSON: {e}")),
    };

    Metadata {
        description: extract_field(&root, "subtitle")
            .unwrap_or_else(|| config.description.clone()),
        citation: extract_field(&root, "citation")
            .unwrap_or_else(|| format!("Fonte: {}", config.key)),
        note: None,
    }
}

// ---------------------------------------------------------------------------
// CSV loading
// ---------------------------------------------------------------------------

/// Parse CSV text into raw header → value records. The first line is the
/// header; blank lines are skipped by the reader.
fn parse_rows(text: &str) -> Result<Vec<BTreeMap<String, String>>, csv::Error> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    reader.deserialize().collect()
}

/// Load one dataset: metadata first (non-fatal), then the CSV (fatal for
/// this dataset on failure). Every row is normalized, and records carrying
/// the sentinel entity or a year outside the configured bounds are dropped.
pub fn load_dataset(config: &DatasetConfig, data_dir: &Path) -> Result<LoadedDataset, LoadError> {
    let metadata = fetch_metadata(config, data_dir);

    let text = fetch_text(&config.csv_resource, data_dir).map_err(LoadError::CsvUnavailable)?;
    let raw_rows = parse_rows(&text)?;

    let total = raw_rows.len();
    let records: Vec<Record> = raw_rows
        .iter()
        .map(|raw| normalize::normalize_row(raw, config))
        .filter(|r| {
            r.entity != UNKNOWN_ENTITY && (config.min_year..=config.max_year).contains(&r.year)
        })
        .collect();

    log::info!(
        "{}: kept {} of {} rows, {} entities",
        config.key,
        records.len(),
        total,
        distinct_entities(&records).len()
    );

    Ok(LoadedDataset { metadata, records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> DatasetConfig {
        DatasetConfig::new(
            "protected-areas",
            "Protected areas",
            "protected-areas.csv",
            [("Coverage", "coverage")],
            (2000, 2024),
            "coverage",
            "%",
            "default description",
        )
    }

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn keeps_valid_rows_and_drops_sentinel_and_out_of_range() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "protected-areas.csv",
            "Entity,Year,Coverage\n\
             Brazil,2010,42.5\n\
             ,2011,10.0\n\
             Chile,1990,5.0\n\
             Peru,bad-year,7.0\n\
             Norway,2020,33.3\n",
        );

        let loaded = load_dataset(&config(), dir.path()).unwrap();
        let entities: Vec<&str> = loaded.records.iter().map(|r| r.entity.as_str()).collect();
        // Blank entity → sentinel, dropped. 1990 and the unparsable year
        // (→ 0) are outside [2000, 2024], dropped.
        assert_eq!(entities, vec!["Brazil", "Norway"]);
        assert_eq!(loaded.records[0].value("coverage"), 42.5);
    }

    #[test]
    fn reload_replaces_wholesale() {
        let dir = TempDir::new().unwrap();
        write(&dir, "protected-areas.csv", "Entity,Year,Coverage\nBrazil,2010,1.0\n");
        let first = load_dataset(&config(), dir.path()).unwrap();

        write(&dir, "protected-areas.csv", "Entity,Year,Coverage\nChile,2012,2.0\n");
        let second = load_dataset(&config(), dir.path()).unwrap();

        assert_eq!(first.records.len(), 1);
        assert_eq!(second.records.len(), 1);
        assert_eq!(second.records[0].entity, "Chile");
    }

    #[test]
    fn missing_csv_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = load_dataset(&config(), dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::CsvUnavailable(_)));
    }

    #[test]
    fn ragged_csv_is_malformed() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "protected-areas.csv",
            "Entity,Year,Coverage\nBrazil,2010,1.0\nChile,2011\n",
        );
        let err = load_dataset(&config(), dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::CsvMalformed(_)));
    }

    #[test]
    fn missing_metadata_falls_back_and_load_still_succeeds() {
        let dir = TempDir::new().unwrap();
        write(&dir, "protected-areas.csv", "Entity,Year,Coverage\nBrazil,2010,1.0\n");

        let loaded = load_dataset(&config(), dir.path()).unwrap();
        assert_eq!(loaded.metadata.citation, "Fonte: protected-areas");
        assert_eq!(loaded.metadata.description, "default description");
        assert!(loaded.metadata.note.is_some());
        assert_eq!(loaded.records.len(), 1);
    }

    #[test]
    fn metadata_fields_read_flat_or_nested() {
        let dir = TempDir::new().unwrap();
        write(&dir, "protected-areas.csv", "Entity,Year,Coverage\nBrazil,2010,1.0\n");

        write(
            &dir,
            "protected-areas.metadata.json",
            r#"{"subtitle": "flat subtitle", "citation": "flat citation"}"#,
        );
        let meta = fetch_metadata(&config(), dir.path());
        assert_eq!(meta.description, "flat subtitle");
        assert_eq!(meta.citation, "flat citation");
        assert!(meta.note.is_none());

        write(
            &dir,
            "protected-areas.metadata.json",
            r#"{"chart": {"subtitle": "nested subtitle", "citation": "nested citation"}}"#,
        );
        let meta = fetch_metadata(&config(), dir.path());
        assert_eq!(meta.description, "nested subtitle");
        assert_eq!(meta.citation, "nested citation");
    }

    #[test]
    fn absent_metadata_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        write(&dir, "protected-areas.metadata.json", r#"{"chart": {}}"#);

        let meta = fetch_metadata(&config(), dir.path());
        assert_eq!(meta.description, "default description");
        assert_eq!(meta.citation, "Fonte: protected-areas");
    }

    #[test]
    fn malformed_metadata_json_keeps_reason() {
        let dir = TempDir::new().unwrap();
        write(&dir, "protected-areas.metadata.json", "not json");

        let meta = fetch_metadata(&config(), dir.path());
        assert_eq!(meta.citation, "Fonte: protected-areas");
        assert!(meta.note.unwrap().contains("parsing metadata JSON"));
    }
}
