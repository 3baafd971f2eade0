use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotBounds, Polygon};

use crate::color::heat_color;
use crate::config::MapConfig;
use crate::heatmap::{HeatCell, HeatmapLayer};
use crate::state::{AppState, Phase};

// ---------------------------------------------------------------------------
// Heatmap plot (central panel)
// ---------------------------------------------------------------------------

/// Render the heat overlay on a longitude/latitude plot.
pub fn heatmap_plot(
    ui: &mut Ui,
    state: &AppState<HeatmapLayer>,
    map: &MapConfig,
    reset_view: &mut bool,
) {
    if state.phase() != Phase::Ready {
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => {
                ui.heading(RichText::new(msg).color(Color32::RED));
            }
            None => {
                ui.heading("Loading film locations…");
            }
        });
        return;
    }

    let layer = state.renderer();
    // One degree of longitude is shorter than one of latitude away from the equator.
    let aspect = 1.0 / map.center_lat.to_radians().cos().max(0.01);

    Plot::new("heatmap")
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(aspect as f32)
        .show_grid(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if std::mem::take(reset_view) {
                let (min, max) = map.initial_bounds();
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
            }

            for cell in layer.cells() {
                plot_ui.polygon(
                    Polygon::new(cell_corners(cell))
                        .fill_color(heat_color(cell.intensity))
                        .stroke(Stroke::NONE),
                );
            }
        });
}

fn cell_corners(cell: &HeatCell) -> Vec<[f64; 2]> {
    let [x0, y0] = cell.min;
    let [x1, y1] = cell.max;
    vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]
}
