use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::{self, panels, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ClimateEdaApp {
    pub state: AppState,
}

impl ClimateEdaApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for ClimateEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Controls changed last frame: recompute before drawing.
        self.state.refresh_if_dirty();

        // ---- Top panel: menu bar and page switch ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors and filters ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: overview or analysis ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.store.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label("No dataset loaded. Use File → Open… to choose one.");
                });
                return;
            }
            match self.state.page {
                Page::Overview => tables::overview(ui, &mut self.state),
                Page::Analysis => ui::analysis_page(ui, &self.state),
            }
        });
    }
}
