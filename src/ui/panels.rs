use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::analysis;
use crate::data::model::{distinct_entities, LoadState};
use crate::state::{AppState, Trigger, View};
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Abrir pasta de dados…").clicked() {
                if let Some(dir) = rfd::FileDialog::new()
                    .set_title("Pasta com os arquivos CSV")
                    .pick_folder()
                {
                    state.set_data_dir(dir);
                }
                ui.close_menu();
            }
            if ui.button("Exportar CSV filtrado…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Recarregar tudo").clicked() {
                state.request_load_all();
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .selectable_label(state.view == View::Indicator, "Indicadores")
            .clicked()
        {
            state.view = View::Indicator;
        }
        if ui
            .selectable_label(state.view == View::Correlation, "Correlação")
            .clicked()
        {
            state.view = View::Correlation;
        }

        ui.separator();

        if let Some(ds) = state.selected_dataset() {
            ui.label(format!(
                "{}: {} registros, {} no período",
                ds.config.label,
                ds.data.len(),
                ds.filtered.rows.len()
            ));
        }
        if state.any_pending() {
            ui.spinner();
        }
        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

fn export_dialog(state: &mut AppState) {
    let Some(ds) = state.selected_dataset() else {
        return;
    };
    let suggested = format!("ods14_{}.csv", ds.config.key);
    let Some(path) = rfd::FileDialog::new()
        .set_title("Exportar dados filtrados")
        .set_file_name(&suggested)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    match state.export_filtered(&path) {
        Ok(n) => {
            log::info!("exported {n} rows to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("export failed: {e:#}");
            state.status_message = Some(format!("Erro ao exportar: {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Left side panel – dataset picker and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    // ---- Dataset picker ----
    let entries: Vec<(String, String)> = state
        .datasets
        .iter()
        .map(|(key, ds)| (key.clone(), ds.config.label.clone()))
        .collect();
    let current_label = state
        .selected_dataset()
        .map(|ds| ds.config.label.clone())
        .unwrap_or_default();
    egui::ComboBox::from_id_salt("dataset_picker")
        .selected_text(current_label)
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            for (key, label) in &entries {
                ui.selectable_value(&mut state.selected, key.clone(), label);
            }
        });
    ui.add_space(4.0);

    let key = state.selected.clone();
    let Some(ds) = state.datasets.get(&key) else {
        ui.label("Nenhum indicador selecionado.");
        return;
    };

    // Snapshot what the widgets below need so `state` can be mutated while
    // rendering.
    let description = ds.metadata.description.clone();
    let citation = ds.metadata.citation.clone();
    let note = ds.metadata.note.clone();
    let load_state = ds.load_state.clone();
    let n_rows = ds.data.len();
    let year_range = ds.year_range();
    let mut lo = ds.slider_min;
    let mut hi = ds.slider_max;
    let entity_rows: Vec<(String, Color32, bool)> = distinct_entities(&ds.data)
        .into_iter()
        .map(|entity| {
            let color = ds.colors.color_for(&entity);
            let selected = ds.selected_entities.contains(&entity);
            (entity, color, selected)
        })
        .collect();
    let n_selected = entity_rows.iter().filter(|(_, _, sel)| *sel).count();

    // ---- Metadata ----
    ui.label(RichText::new(description).small());
    ui.label(RichText::new(citation).small().italics());
    if let Some(note) = note {
        ui.label(RichText::new(note).small().weak());
    }
    ui.separator();

    // ---- Loading indicator ----
    match &load_state {
        LoadState::Idle => {
            ui.label("Aguardando carregamento.");
        }
        LoadState::Pending => {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.label("Carregando…");
            });
        }
        LoadState::Loaded => {
            ui.label(format!("{n_rows} registros válidos"));
        }
        LoadState::Failed(msg) => {
            ui.colored_label(Color32::RED, msg);
        }
    }
    ui.separator();

    // ---- Year range ----
    ui.strong("Período");
    let slid = ui
        .add(egui::Slider::new(&mut lo, year_range.clone()).text("De"))
        .changed()
        | ui
            .add(egui::Slider::new(&mut hi, year_range).text("Até"))
            .changed();
    if slid {
        state.dispatch(Trigger::SliderChanged {
            key: key.clone(),
            min_year: lo,
            max_year: hi,
        });
    }

    let apply = ui
        .add_enabled(load_state.is_loaded(), egui::Button::new("Aplicar filtro"))
        .clicked();
    if apply {
        state.dispatch(Trigger::FilterApplied {
            key: key.clone(),
            min_year: lo,
            max_year: hi,
        });
    }
    ui.separator();

    // ---- Entity selection ----
    let header_text = format!("Países/Regiões  ({n_selected}/{})", entity_rows.len());
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("entity_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("Todos").clicked() {
                    state.select_all_entities(&key);
                }
                if ui.small_button("Nenhum").clicked() {
                    state.select_no_entities(&key);
                }
            });

            ScrollArea::vertical()
                .auto_shrink([false, true])
                .max_height(300.0)
                .show(ui, |ui: &mut Ui| {
                    for (entity, color, selected) in &entity_rows {
                        let text = RichText::new(entity).color(*color);
                        let mut checked = *selected;
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_entity(&key, entity);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Central panel – charts and tables
// ---------------------------------------------------------------------------

/// Render the central panel for the active view.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    match state.view {
        View::Correlation => plot::correlation_view(ui, state),
        View::Indicator => indicator_view(ui, state),
    }
}

fn indicator_view(ui: &mut Ui, state: &mut AppState) {
    let key = state.selected.clone();
    let Some(ds) = state.datasets.get_mut(&key) else {
        return;
    };

    match ds.load_state.clone() {
        LoadState::Failed(msg) => {
            ui.colored_label(Color32::RED, format!("Falha ao carregar: {msg}"));
        }
        LoadState::Idle | LoadState::Pending => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Carregando dados…");
            });
        }
        LoadState::Loaded => {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    let indicator = ds.config.indicator.clone();
                    if let Some(stats) = analysis::summary(&ds.filtered.rows, &indicator) {
                        tables::summary_strip(ui, &stats);
                        ui.add_space(4.0);
                    }

                    plot::trend_plot(ui, ds);
                    ui.add_space(8.0);
                    plot::ranking_chart(ui, ds);
                    ui.add_space(8.0);

                    ui.collapsing("Médias por país/região", |ui: &mut Ui| {
                        tables::averages_table(ui, ds);
                    });
                    ui.collapsing("Progresso anual", |ui: &mut Ui| {
                        tables::progress_table(ui, ds);
                    });
                    let changes = analysis::entity_changes(&ds.filtered.rows, &indicator);
                    ui.collapsing("Variação no período", |ui: &mut Ui| {
                        tables::changes_table(ui, &changes);
                    });
                });
        }
    }
}
