use std::collections::BTreeMap;

use super::model::{distinct_entities, year_span, Record};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Headline numbers for a filtered slice of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub entities: usize,
    pub year_min: i32,
    pub year_max: i32,
    pub mean: f64,
    pub std_dev: f64,
}

/// Mean and population standard deviation of `indicator` over `rows`.
pub fn summary(rows: &[Record], indicator: &str) -> Option<SummaryStats> {
    let (year_min, year_max) = year_span(rows)?;
    let n = rows.len() as f64;
    let mean = rows.iter().map(|r| r.value(indicator)).sum::<f64>() / n;
    let variance = rows
        .iter()
        .map(|r| {
            let d = r.value(indicator) - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    Some(SummaryStats {
        entities: distinct_entities(rows).len(),
        year_min,
        year_max,
        mean,
        std_dev: variance.sqrt(),
    })
}

// ---------------------------------------------------------------------------
// Per-entity progress: first → last observation
// ---------------------------------------------------------------------------

/// Movement of one entity's indicator between its earliest and latest
/// observation inside the filtered slice.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityChange {
    pub entity: String,
    pub first_year: i32,
    pub last_year: i32,
    pub first_value: f64,
    pub last_value: f64,
    pub change: f64,
    /// Percent change relative to the first value, 0 when that value is 0.
    pub percent: f64,
}

/// Change table for every entity with at least two observations, sorted by
/// entity name.
pub fn entity_changes(rows: &[Record], indicator: &str) -> Vec<EntityChange> {
    let mut grouped: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for r in rows {
        grouped.entry(r.entity.as_str()).or_default().push(r);
    }

    grouped
        .into_iter()
        .filter_map(|(entity, mut observations)| {
            if observations.len() < 2 {
                return None;
            }
            observations.sort_by_key(|r| r.year);
            let first = observations.first()?;
            let last = observations.last()?;

            let first_value = first.value(indicator);
            let last_value = last.value(indicator);
            let change = last_value - first_value;
            let percent = if first_value != 0.0 {
                change / first_value * 100.0
            } else {
                0.0
            };

            Some(EntityChange {
                entity: entity.to_string(),
                first_year: first.year,
                last_year: last.year,
                first_value,
                last_value,
                change,
                percent,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cross-dataset correlation
// ---------------------------------------------------------------------------

/// One matched observation of two indicators for the same entity and year.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPair {
    pub entity: String,
    pub year: i32,
    pub a: f64,
    pub b: f64,
}

/// Inner join of two record sets on (entity, year), pairing `ind_a` from the
/// first with `ind_b` from the second. Pairs come out in `a`'s order.
pub fn join_on_entity_year(
    a: &[Record],
    b: &[Record],
    ind_a: &str,
    ind_b: &str,
) -> Vec<JoinedPair> {
    let lookup: BTreeMap<(&str, i32), f64> = b
        .iter()
        .map(|r| ((r.entity.as_str(), r.year), r.value(ind_b)))
        .collect();

    a.iter()
        .filter_map(|r| {
            let other = lookup.get(&(r.entity.as_str(), r.year))?;
            Some(JoinedPair {
                entity: r.entity.clone(),
                year: r.year,
                a: r.value(ind_a),
                b: *other,
            })
        })
        .collect()
}

/// Pearson correlation coefficient of the joined pairs. `None` with fewer
/// than two pairs or when either side has zero variance.
pub fn pearson(pairs: &[JoinedPair]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.a).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for p in pairs {
        let da = p.a - mean_a;
        let db = p.b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(entity: &str, year: i32, value: f64) -> Record {
        Record {
            entity: entity.to_string(),
            year,
            values: BTreeMap::from([("v".to_string(), value)]),
        }
    }

    #[test]
    fn summary_of_known_slice() {
        let rows = vec![
            record("A", 2001, 2.0),
            record("A", 2003, 4.0),
            record("B", 2002, 6.0),
        ];
        let stats = summary(&rows, "v").unwrap();
        assert_eq!(stats.entities, 2);
        assert_eq!((stats.year_min, stats.year_max), (2001, 2003));
        assert_eq!(stats.mean, 4.0);
        // population std dev of [2, 4, 6]
        assert!((stats.std_dev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn summary_of_empty_slice_is_none() {
        assert_eq!(summary(&[], "v"), None);
    }

    #[test]
    fn entity_changes_track_first_and_last_observation() {
        let rows = vec![
            record("A", 2005, 20.0),
            record("A", 2001, 10.0),
            record("B", 2001, 5.0),
        ];
        let changes = entity_changes(&rows, "v");
        // B has a single observation and is skipped.
        assert_eq!(changes.len(), 1);
        let a = &changes[0];
        assert_eq!(a.entity, "A");
        assert_eq!((a.first_year, a.last_year), (2001, 2005));
        assert_eq!(a.change, 10.0);
        assert_eq!(a.percent, 100.0);
    }

    #[test]
    fn percent_change_guards_zero_baseline() {
        let rows = vec![record("A", 2001, 0.0), record("A", 2002, 3.0)];
        let changes = entity_changes(&rows, "v");
        assert_eq!(changes[0].change, 3.0);
        assert_eq!(changes[0].percent, 0.0);
    }

    #[test]
    fn join_pairs_only_matching_entity_and_year() {
        let a = vec![
            record("A", 2001, 1.0),
            record("A", 2002, 2.0),
            record("B", 2001, 3.0),
        ];
        let b = vec![record("A", 2001, 10.0), record("C", 2001, 99.0)];
        let pairs = join_on_entity_year(&a, &b, "v", "v");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].entity, "A");
        assert_eq!(pairs[0].year, 2001);
        assert_eq!((pairs[0].a, pairs[0].b), (1.0, 10.0));
    }

    #[test]
    fn pearson_of_linear_relation_is_one() {
        let a = vec![
            record("A", 2001, 1.0),
            record("A", 2002, 2.0),
            record("A", 2003, 3.0),
        ];
        let b = vec![
            record("A", 2001, 10.0),
            record("A", 2002, 20.0),
            record("A", 2003, 30.0),
        ];
        let pairs = join_on_entity_year(&a, &b, "v", "v");
        let r = pearson(&pairs).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_rejects_degenerate_input() {
        assert_eq!(pearson(&[]), None);
        let flat = vec![
            JoinedPair { entity: "A".into(), year: 2001, a: 1.0, b: 1.0 },
            JoinedPair { entity: "A".into(), year: 2002, a: 1.0, b: 2.0 },
        ];
        assert_eq!(pearson(&flat), None);
    }
}
