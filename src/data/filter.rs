use std::collections::BTreeMap;

use super::model::Record;

// ---------------------------------------------------------------------------
// FilterOutput – year-bounded subset plus aggregate tables
// ---------------------------------------------------------------------------

/// Result of applying a year range to a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutput {
    /// Records inside the range, in dataset order.
    pub rows: Vec<Record>,
    /// Entity → mean of the main indicator across that entity's rows.
    pub entity_averages: BTreeMap<String, f64>,
    /// Year → mean of the main indicator across all rows of that year.
    pub year_progress: BTreeMap<i32, f64>,
}

/// Reduce `data` to the inclusive `[min_year, max_year]` range and compute
/// the aggregate tables over the `indicator` field.
///
/// Reversed bounds are swapped rather than treated as an empty range. An
/// empty result yields empty tables. Pure: `data` is never mutated and
/// repeated calls with the same arguments give identical output.
pub fn apply(data: &[Record], indicator: &str, min_year: i32, max_year: i32) -> FilterOutput {
    let (lo, hi) = if min_year <= max_year {
        (min_year, max_year)
    } else {
        (max_year, min_year)
    };

    let rows: Vec<Record> = data
        .iter()
        .filter(|r| r.year >= lo && r.year <= hi)
        .cloned()
        .collect();

    let mut by_entity: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for r in &rows {
        let v = r.value(indicator);
        let entry = by_entity.entry(r.entity.clone()).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
        let entry = by_year.entry(r.year).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    let entity_averages = by_entity
        .into_iter()
        .map(|(entity, (sum, n))| (entity, sum / n as f64))
        .collect();
    let year_progress = by_year
        .into_iter()
        .map(|(year, (sum, n))| (year, sum / n as f64))
        .collect();

    FilterOutput {
        rows,
        entity_averages,
        year_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(entity: &str, year: i32, coverage: f64) -> Record {
        Record {
            entity: entity.to_string(),
            year,
            values: BTreeMap::from([("coverage".to_string(), coverage)]),
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("A", 2001, 10.0),
            record("A", 2002, 20.0),
            record("B", 2001, 30.0),
        ]
    }

    #[test]
    fn computes_average_and_progress_tables() {
        let out = apply(&sample(), "coverage", 2001, 2002);

        assert_eq!(out.rows.len(), 3);
        assert_eq!(out.entity_averages.get("A"), Some(&15.0));
        assert_eq!(out.entity_averages.get("B"), Some(&30.0));
        assert_eq!(out.year_progress.get(&2001), Some(&20.0));
        assert_eq!(out.year_progress.get(&2002), Some(&20.0));
    }

    #[test]
    fn preserves_dataset_order() {
        let data = vec![
            record("B", 2003, 1.0),
            record("A", 2001, 2.0),
            record("C", 2002, 3.0),
        ];
        let out = apply(&data, "coverage", 2001, 2003);
        let entities: Vec<&str> = out.rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, vec!["B", "A", "C"]);
    }

    #[test]
    fn excludes_years_outside_range() {
        let data = vec![
            record("A", 1999, 5.0),
            record("A", 2001, 10.0),
            record("A", 2005, 50.0),
        ];
        let out = apply(&data, "coverage", 2000, 2004);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].year, 2001);
    }

    #[test]
    fn swaps_reversed_bounds() {
        let out = apply(&sample(), "coverage", 2002, 2001);
        assert_eq!(out.rows.len(), 3);
        assert_eq!(out.entity_averages.get("A"), Some(&15.0));
    }

    #[test]
    fn empty_result_yields_empty_tables() {
        let out = apply(&sample(), "coverage", 1990, 1995);
        assert!(out.rows.is_empty());
        assert!(out.entity_averages.is_empty());
        assert!(out.year_progress.is_empty());
    }

    #[test]
    fn repeated_invocation_is_idempotent() {
        let data = sample();
        let first = apply(&data, "coverage", 2001, 2002);
        let second = apply(&data, "coverage", 2001, 2002);
        assert_eq!(first, second);
    }

    #[test]
    fn progress_years_ascend() {
        let data = vec![
            record("A", 2010, 1.0),
            record("A", 2001, 2.0),
            record("A", 2005, 3.0),
        ];
        let out = apply(&data, "coverage", 2000, 2020);
        let years: Vec<i32> = out.year_progress.keys().copied().collect();
        assert_eq!(years, vec![2001, 2005, 2010]);
    }
}
