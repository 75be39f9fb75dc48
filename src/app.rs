use eframe::egui;

use crossfilter_explorer::config::ViewerConfig;
use crossfilter_explorer::state::AppState;

use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub state: AppState,
}

impl ExplorerApp {
    pub fn new(config: ViewerConfig) -> Self {
        let initial = config.initial_dataset.clone();
        let mut state = AppState::new(config);
        if let Some(name) = initial {
            state.request_dataset(&name);
        }
        Self { state }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Background fetches and debounced filter updates need a wake-up
        // even when the user is idle.
        if let Some(wait) = self.state.tick() {
            ctx.request_repaint_after(wait);
        }

        // ---- Top panel: menu bar, dataset selector, metrics ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::data_table(ui, &mut self.state);
        });
    }
}
