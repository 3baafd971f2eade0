use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::app::FilmHeatmapApp;
use crate::color::heat_ramp;
use crate::data::aggregate::{value_label, BucketValue, ALL_LABEL};
use crate::data::export::export_csv;
use crate::data::filter::FilterCriterion;
use crate::data::loader::FeedSource;
use crate::heatmap::HeatmapLayer;
use crate::state::{AppState, Phase};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState<HeatmapLayer>) {
    ui.heading("Filters");
    ui.separator();

    if state.phase() != Phase::Ready {
        ui.label("No film locations loaded.");
        return;
    }

    // Applied after the loop so the distributions can stay borrowed.
    let mut change: Option<FilterCriterion> = None;
    let mut clear = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dist in state.distributions() {
                let field = dist.field;
                let selected = state.selected(field);

                ui.horizontal(|ui: &mut Ui| {
                    ui.strong(field.label());
                    ui.weak(format!("{} values", dist.values().len()));
                });
                egui::ComboBox::from_id_salt(field.label())
                    .selected_text(selected.map_or_else(|| ALL_LABEL.to_string(), value_label))
                    .width(ui.available_width())
                    .show_ui(ui, |ui: &mut Ui| {
                        for bucket in &dist.buckets {
                            let text = format!("{}  ({})", bucket.label, bucket.count);
                            match &bucket.value {
                                BucketValue::All => {
                                    if ui.selectable_label(selected.is_none(), text).clicked() {
                                        change = Some(FilterCriterion::unset(field));
                                    }
                                }
                                BucketValue::Value(value) => {
                                    let is_selected = selected == bucket.value.criterion_value();
                                    if ui.selectable_label(is_selected, text).clicked() {
                                        change = Some(FilterCriterion::equals(field, value.as_str()));
                                    }
                                }
                                BucketValue::Missing => {
                                    ui.add_enabled(false, egui::SelectableLabel::new(false, text));
                                }
                            }
                        }
                    });
                ui.add_space(6.0);
            }

            ui.separator();
            if ui.button("Clear filters").clicked() {
                clear = true;
            }

            ui.add_space(8.0);
            heat_legend(ui);
        });

    let result = if clear {
        state.clear_filters()
    } else if let Some(criterion) = change {
        state.set_filter(criterion.field, criterion.value)
    } else {
        Ok(())
    };
    if let Err(err) = result {
        log::warn!("{err}");
    }
}

/// Gradient strip explaining the heat colours.
fn heat_legend(ui: &mut Ui) {
    ui.strong("Density");
    let stops = heat_ramp(16);
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), 12.0),
        egui::Sense::hover(),
    );
    let step = rect.width() / stops.len() as f32;
    for (i, color) in stops.iter().enumerate() {
        let cell = egui::Rect::from_min_size(
            rect.min + egui::vec2(i as f32 * step, 0.0),
            egui::vec2(step, rect.height()),
        );
        ui.painter().rect_filled(cell, 0.0, *color);
    }
    ui.horizontal(|ui: &mut Ui| {
        ui.small("low");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            ui.small("high");
        });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut FilmHeatmapApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(app, ui.ctx());
                ui.close_menu();
            }
            let ready = app.state.phase() == Phase::Ready;
            if ui
                .add_enabled(ready, egui::Button::new("Export view as CSV…"))
                .clicked()
            {
                export_dialog(&mut app.state);
                ui.close_menu();
            }
        });

        ui.menu_button("View", |ui: &mut Ui| {
            if ui.button("Reset map").clicked() {
                app.reset_view = true;
                ui.close_menu();
            }
        });

        ui.separator();

        let state = &app.state;
        match state.phase() {
            Phase::Uninitialized => {}
            Phase::Loading => {
                if state.status_message.is_none() {
                    ui.spinner();
                }
                if let Some(source) = state.source() {
                    ui.label(format!("Loading {source}"));
                }
            }
            Phase::Ready => {
                ui.label(format!(
                    "{} locations loaded, {} shown, {} on map",
                    state.records().len(),
                    state.view().len(),
                    state.renderer().points().len()
                ));
                let active = state.criteria().iter().filter(|c| c.is_active()).count();
                if active > 0 {
                    ui.separator();
                    ui.label(format!("{active} filter(s) active"));
                }
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(app: &mut FilmHeatmapApp, ctx: &egui::Context) {
    let file = rfd::FileDialog::new()
        .set_title("Open film locations feed")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        app.start_session(ctx, FeedSource::Path(path));
    }
}

pub fn export_dialog(state: &mut AppState<HeatmapLayer>) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered locations")
        .add_filter("CSV", &["csv"])
        .set_file_name("film-locations.csv")
        .save_file();

    if let Some(path) = file {
        match export_csv(&path, state.records(), state.view()) {
            Ok(rows) => {
                log::info!("Exported {rows} locations to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
