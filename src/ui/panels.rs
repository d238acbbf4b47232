use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::analysis::request::ViewMode;
use crate::data::classify::ColumnRole;
use crate::data::filter::FilterSpec;
use crate::state::{AnalysisKind, AppState, OverviewSection, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation, analysis controls and filters
// ---------------------------------------------------------------------------

/// Render the left side panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if state.store.is_none() {
        ui.heading("Filters");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match state.page {
                Page::Overview => overview_selector(ui, state),
                Page::Analysis => analysis_controls(ui, state),
            }
            ui.add_space(8.0);
            ui.heading("Filters");
            ui.separator();
            filter_widgets(ui, state);
        });
}

fn overview_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select Information to View");
    for section in OverviewSection::ALL {
        ui.radio_value(&mut state.overview, section, section.label());
    }
}

fn analysis_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(store) = &state.store else {
        return;
    };
    let columns: Vec<String> = store.columns().iter().map(|s| s.to_string()).collect();
    let categorical: Vec<String> = store
        .base()
        .columns_with_role(ColumnRole::Categorical)
        .iter()
        .map(|s| s.to_string())
        .collect();

    let before = state.controls.clone();
    let controls = &mut state.controls;

    ui.strong("Select Analysis");
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut controls.kind, AnalysisKind::Univariate, "Univariate");
        ui.radio_value(&mut controls.kind, AnalysisKind::Bivariate, "Bivariate");
    });
    ui.separator();

    let first_label = match controls.kind {
        AnalysisKind::Univariate => "Column",
        AnalysisKind::Bivariate => "First column",
    };
    column_combo(ui, "column_a", first_label, &columns, &mut controls.column_a);
    if controls.kind == AnalysisKind::Bivariate {
        column_combo(ui, "column_b", "Second column", &columns, &mut controls.column_b);
    }

    ui.add_space(4.0);
    ui.strong("View");
    ui.horizontal(|ui: &mut Ui| {
        ui.radio_value(&mut controls.view, ViewMode::Table, ViewMode::Table.to_string());
        ui.radio_value(
            &mut controls.view,
            ViewMode::Visualization,
            ViewMode::Visualization.to_string(),
        );
    });

    if controls.kind == AnalysisKind::Bivariate && controls.view == ViewMode::Table {
        egui::CollapsingHeader::new(RichText::new("Group by").strong())
            .id_salt("group_by")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                for col in &categorical {
                    let mut checked = controls.group_by.contains(col);
                    if ui.checkbox(&mut checked, col).changed() {
                        if checked {
                            controls.group_by.push(col.clone());
                        } else {
                            controls.group_by.retain(|c| c != col);
                        }
                    }
                }
            });
    }

    if controls.view == ViewMode::Visualization {
        ui.horizontal(|ui: &mut Ui| {
            if controls.kind == AnalysisKind::Bivariate {
                ui.checkbox(&mut controls.log_x, "Log X");
            }
            ui.checkbox(&mut controls.log_y, "Log Y");
        });
    }

    // Log toggles only change rendering, not the analysis.
    let analysis_changed = AnalysisControlsKey::of(&before) != AnalysisControlsKey::of(controls);
    if analysis_changed {
        state.mark_dirty();
    }
}

/// The part of the controls that feeds the analysis request.
#[derive(PartialEq)]
struct AnalysisControlsKey<'a> {
    kind: AnalysisKind,
    a: Option<&'a str>,
    b: Option<&'a str>,
    view: ViewMode,
    group_by: &'a [String],
}

impl<'a> AnalysisControlsKey<'a> {
    fn of(c: &'a crate::state::AnalysisControls) -> Self {
        AnalysisControlsKey {
            kind: c.kind,
            a: c.column_a.as_deref(),
            b: c.column_b.as_deref(),
            view: c.view,
            group_by: &c.group_by,
        }
    }
}

fn column_combo(ui: &mut Ui, id: &str, label: &str, columns: &[String], selected: &mut Option<String>) {
    ui.label(label);
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                if ui
                    .selectable_label(selected.as_deref() == Some(col.as_str()), col)
                    .clicked()
                {
                    *selected = Some(col.clone());
                }
            }
        });
}

fn filter_widgets(ui: &mut Ui, state: &mut AppState) {
    // Snapshot the filter list so the loop can call back into `state`.
    let filters = state.filters.clone();

    for filter in &filters {
        match filter {
            FilterSpec::Values { column, allowed } => {
                let options = state.filter_options(column);
                let header_text = format!("{column}  ({}/{})", allowed.len(), options.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(column);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(column);
                            }
                        });
                        for val in &options {
                            let mut checked = allowed.contains(val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                state.toggle_filter_value(column, val);
                            }
                        }
                    });
            }
            FilterSpec::Range { column, min, max } => {
                let Some((lo, hi)) = state.range_bounds(column) else {
                    continue;
                };
                let (mut new_min, mut new_max) = (*min, *max);
                ui.label(RichText::new(column.as_str()).strong());
                let changed_min = ui
                    .add(egui::Slider::new(&mut new_min, lo..=hi).text("min"))
                    .changed();
                let changed_max = ui
                    .add(egui::Slider::new(&mut new_max, lo..=hi).text("max"))
                    .changed();
                if changed_min || changed_max {
                    state.set_range(column, new_min, new_max);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.selectable_value(&mut state.page, Page::Overview, "Home");
        ui.selectable_value(&mut state.page, Page::Analysis, "Analysis");
        ui.separator();

        if let (Some(store), Some(view)) = (&state.store, &state.view) {
            let name = store
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} rows loaded, {} visible",
                store.base().len(),
                view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
