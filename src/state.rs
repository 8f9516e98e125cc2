use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::config::{self, DatasetConfig};
use crate::data::filter::{self, FilterOutput};
use crate::data::loader::{self, LoadError, LoadedDataset};
use crate::data::model::{distinct_entities, year_span, LoadState, Metadata, Record};
use crate::data::normalize::{ENTITY_COLUMN, YEAR_COLUMN};

/// How many entities are pre-selected for the charts after a load.
const DEFAULT_SELECTED_ENTITIES: usize = 5;

// ---------------------------------------------------------------------------
// Per-dataset state
// ---------------------------------------------------------------------------

/// One dataset: its immutable config, the loaded records, the current
/// filter output, and the UI selections that belong to it.
pub struct Dataset {
    pub config: DatasetConfig,
    pub metadata: Metadata,
    /// All valid records. Replaced wholesale by a successful load.
    pub data: Vec<Record>,
    /// Output of the last applied year-range filter.
    pub filtered: FilterOutput,
    pub load_state: LoadState,

    /// Year bounds currently shown on the sliders (not yet applied).
    pub slider_min: i32,
    pub slider_max: i32,
    /// Entities drawn in the charts.
    pub selected_entities: BTreeSet<String>,
    /// Year picked for the ranking bars.
    pub ranking_year: i32,
    pub colors: ColorMap,
}

impl Dataset {
    fn new(config: DatasetConfig) -> Self {
        Self {
            metadata: Metadata::defaults(&config.key, &config.description),
            data: Vec::new(),
            filtered: FilterOutput::default(),
            load_state: LoadState::Idle,
            slider_min: config.min_year,
            slider_max: config.max_year,
            selected_entities: BTreeSet::new(),
            ranking_year: config.max_year,
            colors: ColorMap::default(),
            config,
        }
    }

    /// Inclusive slider range: the loaded data's span when available, the
    /// configured bounds otherwise.
    pub fn year_range(&self) -> std::ops::RangeInclusive<i32> {
        match year_span(&self.data) {
            Some((lo, hi)) => lo..=hi,
            None => self.config.min_year..=self.config.max_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Triggers and loader events
// ---------------------------------------------------------------------------

/// UI events routed to the dataset that owns them.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Slider moved: remember the pending bounds, nothing recomputed yet.
    SliderChanged { key: String, min_year: i32, max_year: i32 },
    /// Apply pressed: run the range filter over the owning dataset.
    FilterApplied { key: String, min_year: i32, max_year: i32 },
}

/// Message sent back from a loader thread.
pub struct LoadEvent {
    pub key: String,
    pub outcome: Result<LoadedDataset, LoadError>,
}

/// Which analysis the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Indicator,
    Correlation,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub datasets: BTreeMap<String, Dataset>,
    /// Key of the dataset shown in the indicator view.
    pub selected: String,
    pub view: View,
    /// Dataset picks for the correlation view.
    pub corr_a: String,
    pub corr_b: String,
    /// Folder the CSV/metadata resources resolve against.
    pub data_dir: PathBuf,
    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
}

impl Default for AppState {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        let datasets: BTreeMap<String, Dataset> = config::builtin_datasets()
            .into_iter()
            .map(|c| (c.key.clone(), Dataset::new(c)))
            .collect();
        let selected = datasets.keys().next().cloned().unwrap_or_default();
        let corr_b = datasets.keys().nth(1).cloned().unwrap_or_else(|| selected.clone());

        Self {
            corr_a: selected.clone(),
            corr_b,
            selected,
            datasets,
            view: View::Indicator,
            data_dir: PathBuf::from("data"),
            status_message: None,
            tx,
            rx,
        }
    }
}

impl AppState {
    pub fn selected_dataset(&self) -> Option<&Dataset> {
        self.datasets.get(&self.selected)
    }

    pub fn any_pending(&self) -> bool {
        self.datasets.values().any(|ds| ds.load_state.is_pending())
    }

    // -- Loading -----------------------------------------------------------

    /// Start a background load for one dataset. Returns false when a load
    /// for that dataset is already in flight (at most one per dataset).
    pub fn request_load(&mut self, key: &str) -> bool {
        let Some(ds) = self.datasets.get_mut(key) else {
            log::warn!("load requested for unknown dataset {key}");
            return false;
        };
        if ds.load_state.is_pending() {
            log::debug!("{key}: load already in flight, ignoring");
            return false;
        }
        ds.load_state = LoadState::Pending;

        let config = ds.config.clone();
        let data_dir = self.data_dir.clone();
        let tx = self.tx.clone();
        let key = key.to_string();
        thread::spawn(move || {
            let outcome = loader::load_dataset(&config, &data_dir);
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(LoadEvent { key, outcome });
        });
        true
    }

    pub fn request_load_all(&mut self) {
        let keys: Vec<String> = self.datasets.keys().cloned().collect();
        for key in keys {
            self.request_load(&key);
        }
    }

    /// Drain loader completions. Called once per frame.
    pub fn poll_loads(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.finish_load(event);
        }
    }

    fn finish_load(&mut self, event: LoadEvent) {
        let Some(ds) = self.datasets.get_mut(&event.key) else {
            log::warn!("load event for unknown dataset {}", event.key);
            return;
        };
        match event.outcome {
            Ok(loaded) => {
                ds.metadata = loaded.metadata;
                ds.data = loaded.records;
                ds.load_state = LoadState::Loaded;

                if let Some((lo, hi)) = year_span(&ds.data) {
                    ds.slider_min = lo;
                    ds.slider_max = hi;
                    ds.ranking_year = hi;
                }
                let entities = distinct_entities(&ds.data);
                ds.selected_entities = entities
                    .iter()
                    .take(DEFAULT_SELECTED_ENTITIES)
                    .cloned()
                    .collect();
                ds.colors = ColorMap::new(&entities);
                ds.filtered = filter::apply(
                    &ds.data,
                    &ds.config.indicator,
                    ds.slider_min,
                    ds.slider_max,
                );
            }
            Err(e) => {
                log::error!("{}: load failed: {e}", event.key);
                ds.data.clear();
                ds.filtered = FilterOutput::default();
                ds.load_state = LoadState::Failed(e.to_string());
            }
        }
    }

    // -- Trigger dispatch --------------------------------------------------

    /// Route a UI trigger to the dataset named by its key.
    pub fn dispatch(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::SliderChanged { key, min_year, max_year } => {
                let Some(ds) = self.datasets.get_mut(&key) else {
                    log::warn!("trigger for unknown dataset {key}");
                    return;
                };
                ds.slider_min = min_year;
                ds.slider_max = max_year;
            }
            Trigger::FilterApplied { key, min_year, max_year } => {
                let Some(ds) = self.datasets.get_mut(&key) else {
                    log::warn!("trigger for unknown dataset {key}");
                    return;
                };
                // The apply control is only enabled after a successful load.
                if !ds.load_state.is_loaded() {
                    return;
                }
                ds.filtered =
                    filter::apply(&ds.data, &ds.config.indicator, min_year, max_year);
            }
        }
    }

    // -- Entity selection --------------------------------------------------

    pub fn toggle_entity(&mut self, key: &str, entity: &str) {
        if let Some(ds) = self.datasets.get_mut(key) {
            if !ds.selected_entities.remove(entity) {
                ds.selected_entities.insert(entity.to_string());
            }
        }
    }

    pub fn select_all_entities(&mut self, key: &str) {
        if let Some(ds) = self.datasets.get_mut(key) {
            ds.selected_entities = distinct_entities(&ds.data);
        }
    }

    pub fn select_no_entities(&mut self, key: &str) {
        if let Some(ds) = self.datasets.get_mut(key) {
            ds.selected_entities.clear();
        }
    }

    // -- Data folder and export --------------------------------------------

    /// Point the app at another data folder and reload everything.
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("data folder set to {}", dir.display());
        self.data_dir = dir;
        self.request_load_all();
    }

    /// Write the selected dataset's filtered rows (restricted to the chosen
    /// entities) as CSV. Returns the number of rows written.
    pub fn export_filtered(&self, path: &Path) -> Result<usize> {
        let ds = self
            .selected_dataset()
            .context("no dataset selected")?;

        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let fields: Vec<&String> = ds.config.columns.values().collect();
        let mut header = vec![ENTITY_COLUMN, YEAR_COLUMN];
        header.extend(fields.iter().map(|f| f.as_str()));
        writer.write_record(&header).context("writing CSV header")?;

        let mut written = 0;
        for record in &ds.filtered.rows {
            if !ds.selected_entities.contains(&record.entity) {
                continue;
            }
            let mut row = vec![record.entity.clone(), record.year.to_string()];
            row.extend(fields.iter().map(|f| record.value(f).to_string()));
            writer.write_record(&row).context("writing CSV row")?;
            written += 1;
        }
        writer.flush().context("flushing CSV")?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::UNKNOWN_ENTITY;
    use std::collections::BTreeMap as Map;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn record(entity: &str, year: i32, coverage: f64) -> Record {
        Record {
            entity: entity.to_string(),
            year,
            values: Map::from([("coverage".to_string(), coverage)]),
        }
    }

    fn loaded_state_with(key: &str, records: Vec<Record>) -> AppState {
        let mut state = AppState::default();
        state.finish_load(LoadEvent {
            key: key.to_string(),
            outcome: Ok(LoadedDataset {
                metadata: Metadata::defaults(key, "d"),
                records,
            }),
        });
        state
    }

    #[test]
    fn startup_builds_one_entry_per_builtin_dataset() {
        let state = AppState::default();
        assert_eq!(state.datasets.len(), config::builtin_datasets().len());
        assert!(state.datasets.contains_key(&state.selected));
        for ds in state.datasets.values() {
            assert_eq!(ds.load_state, LoadState::Idle);
            assert!(ds.data.is_empty());
        }
    }

    #[test]
    fn successful_load_populates_data_and_selections() {
        let key = "marine-protected-areas";
        let state = loaded_state_with(
            key,
            vec![record("Brazil", 2010, 1.0), record("Chile", 2015, 2.0)],
        );

        let ds = &state.datasets[key];
        assert!(ds.load_state.is_loaded());
        assert_eq!(ds.data.len(), 2);
        assert_eq!((ds.slider_min, ds.slider_max), (2010, 2015));
        assert_eq!(ds.ranking_year, 2015);
        assert_eq!(ds.selected_entities.len(), 2);
        assert_eq!(ds.filtered.rows.len(), 2);
    }

    #[test]
    fn failed_load_clears_data_and_keeps_message() {
        let key = "marine-protected-areas";
        let mut state = loaded_state_with(key, vec![record("Brazil", 2010, 1.0)]);

        state.finish_load(LoadEvent {
            key: key.to_string(),
            outcome: Err(LoadError::CsvUnavailable(anyhow::anyhow!("boom"))),
        });

        let ds = &state.datasets[key];
        assert!(matches!(&ds.load_state, LoadState::Failed(msg) if msg.contains("boom")));
        assert!(ds.data.is_empty());
        assert!(ds.filtered.rows.is_empty());
    }

    #[test]
    fn failed_load_leaves_other_datasets_alone() {
        let mut state = loaded_state_with(
            "marine-protected-areas",
            vec![record("Brazil", 2010, 1.0)],
        );
        state.finish_load(LoadEvent {
            key: "ocean-health-index".to_string(),
            outcome: Err(LoadError::CsvUnavailable(anyhow::anyhow!("gone"))),
        });

        assert!(state.datasets["marine-protected-areas"].load_state.is_loaded());
        assert!(matches!(
            state.datasets["ocean-health-index"].load_state,
            LoadState::Failed(_)
        ));
    }

    #[test]
    fn slider_trigger_updates_pending_bounds_only() {
        let key = "marine-protected-areas";
        let mut state = loaded_state_with(
            key,
            vec![record("Brazil", 2005, 1.0), record("Brazil", 2015, 2.0)],
        );

        state.dispatch(Trigger::SliderChanged {
            key: key.to_string(),
            min_year: 2010,
            max_year: 2012,
        });

        let ds = &state.datasets[key];
        assert_eq!((ds.slider_min, ds.slider_max), (2010, 2012));
        // Not applied yet: the filter output still covers both rows.
        assert_eq!(ds.filtered.rows.len(), 2);
    }

    #[test]
    fn filter_applied_trigger_recomputes_output() {
        let key = "marine-protected-areas";
        let mut state = loaded_state_with(
            key,
            vec![record("Brazil", 2005, 1.0), record("Brazil", 2015, 2.0)],
        );

        state.dispatch(Trigger::FilterApplied {
            key: key.to_string(),
            min_year: 2010,
            max_year: 2020,
        });

        let ds = &state.datasets[key];
        assert_eq!(ds.filtered.rows.len(), 1);
        assert_eq!(ds.filtered.rows[0].year, 2015);
    }

    #[test]
    fn triggers_for_unknown_keys_are_ignored() {
        let mut state = AppState::default();
        state.dispatch(Trigger::FilterApplied {
            key: "no-such-dataset".to_string(),
            min_year: 2000,
            max_year: 2001,
        });
        // Nothing panics, nothing changes.
        assert!(state.datasets.values().all(|ds| ds.filtered.rows.is_empty()));
    }

    #[test]
    fn filter_is_not_applied_before_a_successful_load() {
        let mut state = AppState::default();
        let key = state.selected.clone();
        state.datasets.get_mut(&key).unwrap().data = vec![record("Brazil", 2010, 1.0)];

        state.dispatch(Trigger::FilterApplied {
            key: key.clone(),
            min_year: 2000,
            max_year: 2020,
        });
        assert!(state.datasets[&key].filtered.rows.is_empty());
    }

    #[test]
    fn second_load_request_while_pending_is_ignored() {
        let mut state = AppState::default();
        let key = state.selected.clone();
        state.datasets.get_mut(&key).unwrap().load_state = LoadState::Pending;
        assert!(!state.request_load(&key));
    }

    #[test]
    fn load_round_trip_through_the_channel() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("marine-protected-areas.csv"),
            "Entity,Year,Marine protected areas (% of territorial waters)\nBrazil,2010,42.5\n",
        )
        .unwrap();

        let mut state = AppState::default();
        state.data_dir = dir.path().to_path_buf();
        assert!(state.request_load("marine-protected-areas"));
        assert!(state.any_pending());

        let event = state.rx.recv_timeout(Duration::from_secs(5)).unwrap();
        state.finish_load(event);

        let ds = &state.datasets["marine-protected-areas"];
        assert!(ds.load_state.is_loaded());
        assert_eq!(ds.data.len(), 1);
        assert_eq!(ds.data[0].entity, "Brazil");
        assert!(!state.any_pending());
    }

    #[test]
    fn entity_selection_helpers() {
        let key = "marine-protected-areas";
        let mut state = loaded_state_with(
            key,
            vec![record("Brazil", 2010, 1.0), record("Chile", 2011, 2.0)],
        );

        state.select_no_entities(key);
        assert!(state.datasets[key].selected_entities.is_empty());

        state.toggle_entity(key, "Brazil");
        assert!(state.datasets[key].selected_entities.contains("Brazil"));
        state.toggle_entity(key, "Brazil");
        assert!(!state.datasets[key].selected_entities.contains("Brazil"));

        state.select_all_entities(key);
        assert_eq!(state.datasets[key].selected_entities.len(), 2);
    }

    #[test]
    fn export_writes_filtered_selected_rows() {
        let key = "marine-protected-areas";
        let mut state = loaded_state_with(
            key,
            vec![
                record("Brazil", 2010, 42.5),
                record("Chile", 2011, 7.0),
                record(UNKNOWN_ENTITY, 2012, 0.0),
            ],
        );
        state.selected = key.to_string();
        state.select_no_entities(key);
        state.toggle_entity(key, "Brazil");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let written = state.export_filtered(&path).unwrap();
        assert_eq!(written, 1);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Entity,Year,coverage"));
        assert!(text.contains("Brazil,2010,42.5"));
        assert!(!text.contains("Chile"));
    }
}
