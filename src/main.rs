mod app;
mod color;
mod config;
mod data;
mod heatmap;
mod state;
mod ui;

use std::path::Path;

use app::FilmHeatmapApp;
use config::{ViewerConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ViewerConfig::load_or_default(Path::new(CONFIG_FILE))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Film Locations Heatmap",
        options,
        Box::new(|cc| Ok(Box::new(FilmHeatmapApp::new(&cc.egui_ctx, config)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
