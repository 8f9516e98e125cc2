use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::analysis::{EntityChange, SummaryStats};
use crate::state::Dataset;

// ---------------------------------------------------------------------------
// Summary metrics strip
// ---------------------------------------------------------------------------

/// Quick metrics row shown above the charts.
pub fn summary_strip(ui: &mut Ui, stats: &SummaryStats) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        metric(ui, "Países", stats.entities.to_string());
        metric(ui, "Período", format!("{} – {}", stats.year_min, stats.year_max));
        metric(ui, "Média", format!("{:.2}", stats.mean));
        metric(ui, "Desvio padrão", format!("{:.2}", stats.std_dev));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small().weak());
            ui.strong(value);
        });
    });
}

// ---------------------------------------------------------------------------
// Aggregate tables
// ---------------------------------------------------------------------------

/// Mean of the main indicator per entity, largest first.
pub fn averages_table(ui: &mut Ui, ds: &Dataset) {
    let mut rows: Vec<(&String, &f64)> = ds.filtered.entity_averages.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(a.1));

    ui.push_id("averages_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder().at_least(140.0))
            .column(Column::auto().at_least(80.0))
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("País/Região");
                });
                header.col(|ui| {
                    ui.strong("Média");
                });
            })
            .body(|mut body| {
                for (entity, avg) in rows {
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(entity.as_str());
                        });
                        row.col(|ui| {
                            ui.label(format!("{avg:.2}"));
                        });
                    });
                }
            });
    });
}

/// Mean of the main indicator per year, ascending.
pub fn progress_table(ui: &mut Ui, ds: &Dataset) {
    ui.push_id("progress_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Ano");
                });
                header.col(|ui| {
                    ui.strong("Média");
                });
            })
            .body(|mut body| {
                for (year, mean) in &ds.filtered.year_progress {
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(year.to_string());
                        });
                        row.col(|ui| {
                            ui.label(format!("{mean:.2}"));
                        });
                    });
                }
            });
    });
}

/// First → last movement of each entity inside the filtered range.
pub fn changes_table(ui: &mut Ui, changes: &[EntityChange]) {
    if changes.is_empty() {
        ui.label("Nenhum país com duas ou mais observações no período.");
        return;
    }

    ui.push_id("changes_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder().at_least(140.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(70.0))
            .header(18.0, |mut header| {
                for title in ["País/Região", "Período", "Inicial", "Final", "Variação", "%"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for change in changes {
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&change.entity);
                        });
                        row.col(|ui| {
                            ui.label(format!("{} – {}", change.first_year, change.last_year));
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", change.first_value));
                        });
                        row.col(|ui| {
                            ui.label(format!("{:.2}", change.last_value));
                        });
                        row.col(|ui| {
                            ui.label(format!("{:+.2}", change.change));
                        });
                        row.col(|ui| {
                            ui.label(format!("{:+.1}%", change.percent));
                        });
                    });
                }
            });
    });
}
