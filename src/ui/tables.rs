use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::result::{ColumnSummary, FrequencyTable, GroupedAggregate};
use crate::analysis::stats::{CrossTab, ScalarSummary, frequencies};
use crate::data::model::{Dataset, Row};
use crate::data::profile::profile;
use crate::state::{AppState, OverviewSection};

fn fmt_stat(v: Option<f64>) -> String {
    v.map_or_else(|| "NaN".to_string(), |v| format!("{v:.4}"))
}

// ---------------------------------------------------------------------------
// Analysis tables
// ---------------------------------------------------------------------------

/// Descriptive statistics of one or more numeric columns, one column each.
pub fn summaries(ui: &mut Ui, summaries: &[ColumnSummary]) {
    egui::Grid::new("summary_grid")
        .striped(true)
        .num_columns(summaries.len() + 1)
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for s in summaries {
                ui.strong(&s.column);
            }
            ui.end_row();

            let rows: [(&str, fn(&ScalarSummary) -> String); 6] = [
                ("count", |s| s.count.to_string()),
                ("mean", |s| fmt_stat(s.mean)),
                ("median", |s| fmt_stat(s.median)),
                ("std", |s| fmt_stat(s.std_dev)),
                ("min", |s| fmt_stat(s.min)),
                ("max", |s| fmt_stat(s.max)),
            ];
            for (label, cell) in rows {
                ui.label(label);
                for s in summaries {
                    ui.monospace(cell(&s.summary));
                }
                ui.end_row();
            }
        });
}

pub fn frequency(ui: &mut Ui, table: &FrequencyTable) {
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        egui::Grid::new(("frequency_grid", &table.column))
            .striped(true)
            .num_columns(2)
            .show(ui, |ui: &mut Ui| {
                ui.strong(&table.column);
                ui.strong("count");
                ui.end_row();
                for (value, count) in &table.entries {
                    ui.label(value.to_string());
                    ui.monospace(count.to_string());
                    ui.end_row();
                }
                ui.strong("total (non-missing)");
                ui.strong(table.non_missing_total().to_string());
                ui.end_row();
            });
    });
}

pub fn crosstab(ui: &mut Ui, table: &CrossTab) {
    ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("crosstab_grid")
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                ui.strong(format!("{} \\ {}", table.row_column, table.col_column));
                for label in &table.col_labels {
                    ui.strong(label.to_string());
                }
                ui.strong("row min");
                ui.strong("row max");
                ui.end_row();

                for (r, label) in table.row_labels.iter().enumerate() {
                    ui.strong(label.to_string());
                    for count in &table.counts[r] {
                        ui.monospace(count.to_string());
                    }
                    let e = table.row_extrema[r];
                    ui.monospace(e.min.to_string());
                    ui.monospace(e.max.to_string());
                    ui.end_row();
                }

                ui.strong("col min");
                for e in &table.col_extrema {
                    ui.monospace(e.min.to_string());
                }
                ui.end_row();
                ui.strong("col max");
                for e in &table.col_extrema {
                    ui.monospace(e.max.to_string());
                }
                ui.end_row();
            });
        ui.label(format!("{} paired observations", table.total()));
    });
}

pub fn grouped(ui: &mut Ui, agg: &GroupedAggregate) {
    ScrollArea::both().show(ui, |ui: &mut Ui| {
        egui::Grid::new("grouped_grid")
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for key in &agg.keys {
                    ui.strong(key);
                }
                for measure in &agg.measures {
                    for stat in ["count", "mean", "median", "std", "min", "max"] {
                        ui.strong(format!("{measure} {stat}"));
                    }
                }
                ui.end_row();

                for group in &agg.groups {
                    for value in &group.key {
                        ui.label(value.to_string());
                    }
                    for s in &group.summaries {
                        ui.monospace(s.count.to_string());
                        ui.monospace(fmt_stat(s.mean));
                        ui.monospace(fmt_stat(s.median));
                        ui.monospace(fmt_stat(s.std_dev));
                        ui.monospace(fmt_stat(s.min));
                        ui.monospace(fmt_stat(s.max));
                    }
                    ui.end_row();
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Overview page
// ---------------------------------------------------------------------------

/// Render the dataset overview section selected in the side panel.
///
/// Describes the dataset as loaded; filters only shape the analysis page.
pub fn overview(ui: &mut Ui, state: &mut AppState) {
    let Some(base) = state.overview_dataset() else {
        return;
    };
    let view: &Dataset = &base;
    let section = state.overview;
    ui.heading(section.label());
    ui.separator();

    match section {
        OverviewSection::Preview => {
            rows_table(ui, view, view.head(state.settings.preview_rows));
        }
        OverviewSection::Shape => {
            ui.label(format!("Rows: {}", view.len()));
            ui.label(format!("Columns: {}", view.fields().len()));
            if let Some(filtered) = &state.view {
                ui.label(format!("Rows under current filters: {}", filtered.len()));
            }
        }
        OverviewSection::ColumnDetails => {
            let p = profile(view);
            egui::Grid::new("column_details").striped(true).show(ui, |ui: &mut Ui| {
                for h in ["Column", "Data Type", "Role", "Missing Values", "Unique Values"] {
                    ui.strong(h);
                }
                ui.end_row();
                for c in &p.columns {
                    ui.label(&c.name);
                    ui.monospace(c.dtype.to_string());
                    ui.label(c.role.to_string());
                    ui.monospace(c.missing.to_string());
                    ui.monospace(c.unique.to_string());
                    ui.end_row();
                }
            });
        }
        OverviewSection::MissingValues => {
            let p = profile(view);
            egui::Grid::new("missing_values").striped(true).show(ui, |ui: &mut Ui| {
                for c in &p.columns {
                    ui.label(&c.name);
                    ui.monospace(c.missing.to_string());
                    ui.end_row();
                }
            });
            ui.label(RichText::new(format!("Total: {}", p.total_missing())).strong());
        }
        OverviewSection::UniqueValues => {
            let p = profile(view);
            egui::Grid::new("unique_values").striped(true).show(ui, |ui: &mut Ui| {
                for c in &p.columns {
                    ui.label(&c.name);
                    ui.monospace(c.unique.to_string());
                    ui.end_row();
                }
            });
        }
        OverviewSection::ValueCounts => {
            let current = state.value_counts_column.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("value_counts_column")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for name in view.column_names() {
                        if ui.selectable_label(current == name, name).clicked() {
                            state.value_counts_column = Some(name.to_string());
                        }
                    }
                });
            if let Some(idx) = view.column_index(&current) {
                frequency(
                    ui,
                    &FrequencyTable {
                        column: current.clone(),
                        entries: frequencies(view.values(idx)),
                    },
                );
            }
        }
        OverviewSection::FullDataset => {
            rows_table(ui, view, view.rows());
        }
    }
}

/// Virtualised table of raw rows.
fn rows_table(ui: &mut Ui, dataset: &Dataset, rows: &[Row]) {
    let names = dataset.column_names();
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), names.len())
            .header(20.0, |mut header| {
                for name in &names {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for value in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.to_string());
                        });
                    }
                });
            });
    });
}
