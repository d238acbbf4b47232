pub mod panels;
pub mod plot;
pub mod tables;

use eframe::egui::{Color32, RichText, Ui};

use crate::analysis::result::AnalysisResult;
use crate::state::AppState;

/// Render the last analysis result, with any warning about a rejected request
/// shown above it.
pub fn analysis_page(ui: &mut Ui, state: &AppState) {
    if let Some(warning) = &state.warning {
        ui.label(RichText::new(format!("⚠ {warning}")).color(Color32::YELLOW));
        ui.separator();
    }

    let Some(result) = &state.result else {
        ui.label("Select columns in the side panel to run an analysis.");
        return;
    };

    ui.heading(result.kind());
    ui.separator();

    let controls = &state.controls;
    match result {
        AnalysisResult::Summary(s) => tables::summaries(ui, std::slice::from_ref(s)),
        AnalysisResult::SummaryPair(pair) => tables::summaries(ui, pair),
        AnalysisResult::Frequency(table) => tables::frequency(ui, table),
        AnalysisResult::Histogram(hist) => plot::histogram(ui, hist, controls.log_y),
        AnalysisResult::BarChart(table) => plot::bar_chart(ui, table, controls.log_y),
        AnalysisResult::Scatter(series) => {
            plot::scatter(ui, series, controls.log_x, controls.log_y)
        }
        AnalysisResult::CrossTab(table) => tables::crosstab(ui, table),
        AnalysisResult::HeatMap(table) => plot::heat_map(ui, table),
        AnalysisResult::Grouped(agg) => tables::grouped(ui, agg),
        AnalysisResult::BoxPlot(series) => plot::box_plot(ui, series, controls.log_y),
    }
}
