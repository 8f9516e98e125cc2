use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::data::analysis;
use crate::state::{AppState, Dataset};

/// How many entities the ranking chart shows.
const RANKING_TOP_N: usize = 15;

// ---------------------------------------------------------------------------
// Trend chart (indicator view)
// ---------------------------------------------------------------------------

/// Trend lines of the main indicator for the selected entities, over the
/// filtered year range.
pub fn trend_plot(ui: &mut Ui, ds: &Dataset) {
    let indicator = &ds.config.indicator;

    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for r in &ds.filtered.rows {
        if !ds.selected_entities.contains(&r.entity) {
            continue;
        }
        series
            .entry(r.entity.as_str())
            .or_default()
            .push([r.year as f64, r.value(indicator)]);
    }
    for points in series.values_mut() {
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    }

    if series.is_empty() {
        ui.label("Nenhum país selecionado no período.");
        return;
    }

    Plot::new("trend_plot")
        .legend(Legend::default())
        .x_axis_label("Ano")
        .y_axis_label(&ds.config.y_label)
        .height(320.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (entity, points) in &series {
                let line = Line::new(PlotPoints::from(points.clone()))
                    .name(*entity)
                    .color(ds.colors.color_for(entity))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Ranking chart (indicator view)
// ---------------------------------------------------------------------------

/// Entity ranking of the main indicator for one year of the filtered range.
pub fn ranking_chart(ui: &mut Ui, ds: &mut Dataset) {
    let years: Vec<i32> = ds.filtered.year_progress.keys().copied().collect();
    let Some(&last_year) = years.last() else {
        return;
    };
    if !years.contains(&ds.ranking_year) {
        ds.ranking_year = last_year;
    }

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Ranking do ano");
        egui::ComboBox::from_id_salt("ranking_year")
            .selected_text(ds.ranking_year.to_string())
            .show_ui(ui, |ui: &mut Ui| {
                for year in &years {
                    ui.selectable_value(&mut ds.ranking_year, *year, year.to_string());
                }
            });
    });

    let indicator = &ds.config.indicator;
    let mut entries: Vec<(&str, f64)> = ds
        .filtered
        .rows
        .iter()
        .filter(|r| r.year == ds.ranking_year)
        .map(|r| (r.entity.as_str(), r.value(indicator)))
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.truncate(RANKING_TOP_N);

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, (entity, value))| {
            Bar::new(i as f64, *value)
                .name(*entity)
                .fill(ds.colors.color_for(entity))
        })
        .collect();

    Plot::new("ranking_plot")
        .y_axis_label(&ds.config.y_label)
        .height(220.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Correlation view
// ---------------------------------------------------------------------------

/// Scatter of two indicators joined on (entity, year), with the Pearson
/// coefficient and a strength caption.
pub fn correlation_view(ui: &mut Ui, state: &mut AppState) {
    let entries: Vec<(String, String)> = state
        .datasets
        .iter()
        .map(|(key, ds)| (key.clone(), ds.config.label.clone()))
        .collect();

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Indicador 1:");
        dataset_combo(ui, "corr_a", &mut state.corr_a, &entries);
        ui.label("Indicador 2:");
        dataset_combo(ui, "corr_b", &mut state.corr_b, &entries);
    });
    ui.separator();

    if state.corr_a == state.corr_b {
        ui.colored_label(
            Color32::YELLOW,
            "Selecione indicadores diferentes para análise de correlação.",
        );
        return;
    }
    let (Some(a), Some(b)) = (
        state.datasets.get(&state.corr_a),
        state.datasets.get(&state.corr_b),
    ) else {
        return;
    };
    if !a.load_state.is_loaded() || !b.load_state.is_loaded() {
        ui.label("Aguardando o carregamento dos dois indicadores…");
        return;
    }

    let pairs =
        analysis::join_on_entity_year(&a.data, &b.data, &a.config.indicator, &b.config.indicator);
    if pairs.is_empty() {
        ui.label("Nenhum par (país, ano) em comum entre os indicadores.");
        return;
    }

    match analysis::pearson(&pairs) {
        Some(r) => {
            ui.horizontal(|ui: &mut Ui| {
                ui.strong(format!("Coeficiente de correlação: {r:.3}"));
                let (caption, color) = if r.abs() > 0.7 {
                    ("correlação forte", Color32::LIGHT_GREEN)
                } else if r.abs() > 0.3 {
                    ("correlação moderada", Color32::LIGHT_BLUE)
                } else {
                    ("correlação fraca", Color32::YELLOW)
                };
                ui.label(RichText::new(caption).color(color));
            });
        }
        None => {
            ui.label("Amostra insuficiente para calcular a correlação.");
        }
    }

    let points: Vec<[f64; 2]> = pairs.iter().map(|p| [p.a, p.b]).collect();
    Plot::new("correlation_plot")
        .x_axis_label(&a.config.y_label)
        .y_axis_label(&b.config.y_label)
        .height(360.0)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(2.5)
                    .name(format!("{} × {}", a.config.label, b.config.label)),
            );
        });
}

fn dataset_combo(ui: &mut Ui, id: &str, selected: &mut String, entries: &[(String, String)]) {
    let current = entries
        .iter()
        .find(|(key, _)| key == selected)
        .map(|(_, label)| label.clone())
        .unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for (key, label) in entries {
                ui.selectable_value(selected, key.clone(), label);
            }
        });
}
