use eframe::egui;

use crate::config::ViewerConfig;
use crate::data::loader::FeedSource;
use crate::heatmap::HeatmapLayer;
use crate::state::AppState;
use crate::ui::{map, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FilmHeatmapApp {
    pub state: AppState<HeatmapLayer>,
    pub config: ViewerConfig,
    /// Move the map back to the configured centre on the next frame.
    pub reset_view: bool,
}

impl FilmHeatmapApp {
    /// Create the app and start loading the configured feed.
    pub fn new(ctx: &egui::Context, config: ViewerConfig) -> Self {
        let source = config.feed_source();
        let mut app = Self {
            state: new_session(&config),
            config,
            reset_view: true,
        };
        app.start_session(ctx, source);
        app
    }

    /// Replace the current session with a fresh one loading `source`.
    pub fn start_session(&mut self, ctx: &egui::Context, source: FeedSource) {
        self.state = new_session(&self.config);
        let ctx = ctx.clone();
        if let Err(err) = self.state.begin_load(source, move || ctx.request_repaint()) {
            log::error!("{err}");
            self.state.status_message = Some(format!("Error: {err}"));
        }
        self.reset_view = true;
    }
}

fn new_session(config: &ViewerConfig) -> AppState<HeatmapLayer> {
    AppState::new(
        config.normalize_options(),
        HeatmapLayer::new(config.heatmap_settings()),
    )
}

impl eframe::App for FilmHeatmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: records of the current view ----
        egui::TopBottomPanel::bottom("records_panel")
            .default_height(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                table::records_table(ui, &self.state);
            });

        // ---- Central panel: heatmap ----
        egui::CentralPanel::default().show(ctx, |ui| {
            map::heatmap_plot(ui, &self.state, &self.config.map, &mut self.reset_view);
        });
    }
}
