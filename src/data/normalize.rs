use std::collections::BTreeMap;

use crate::config::DatasetConfig;

use super::model::{Record, UNKNOWN_ENTITY};

/// CSV header naming the observation's subject.
pub const ENTITY_COLUMN: &str = "Entity";
/// CSV header naming the observation's year.
pub const YEAR_COLUMN: &str = "Year";

/// Turn one raw CSV record into a typed [`Record`].
///
/// Malformed fields never reject the row here: a blank entity becomes the
/// `"Unknown"` sentinel, an unparsable year becomes 0 and an unparsable or
/// absent numeric cell becomes 0.0. The loader drops sentinel and
/// out-of-range records afterwards.
pub fn normalize_row(raw: &BTreeMap<String, String>, config: &DatasetConfig) -> Record {
    let entity = raw
        .get(ENTITY_COLUMN)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_ENTITY)
        .to_string();

    let year = raw
        .get(YEAR_COLUMN)
        .and_then(|s| s.trim().parse::<i32>().ok())
        .unwrap_or(0);

    let mut values = BTreeMap::new();
    for (header, field) in &config.columns {
        let value = raw
            .get(header)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        values.insert(field.clone(), value);
    }

    Record { entity, year, values }
}
