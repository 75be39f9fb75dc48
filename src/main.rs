mod app;
mod ui;

use anyhow::Context;
use app::ExplorerApp;
use crossfilter_explorer::config::ViewerConfig;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::discover().context("loading viewer config")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cross-Filter Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(ExplorerApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
