use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::FieldId;
use crate::heatmap::HeatmapLayer;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Table of the records in the current view, in feed order.
pub fn records_table(ui: &mut Ui, state: &AppState<HeatmapLayer>) {
    let records = state.records();
    let view = state.view();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::initial(240.0).at_least(80.0))
        .column(Column::initial(120.0).at_least(60.0))
        .column(Column::initial(50.0))
        .column(Column::initial(160.0).at_least(60.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for name in ["Title", "Type", "Year", "Site", "Location"] {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, view.len(), |mut row| {
                let Some(record) = view
                    .indices()
                    .get(row.index())
                    .and_then(|&i| records.get(i))
                else {
                    return;
                };
                for field in [FieldId::Title, FieldId::Type, FieldId::Year, FieldId::Site] {
                    row.col(|ui| {
                        ui.label(record.field(field).unwrap_or_default());
                    });
                }
                row.col(|ui| match record.coordinate {
                    Some(c) => {
                        ui.label(format!("{:.5}, {:.5}", c.lat, c.lng));
                    }
                    None => {
                        ui.weak("no coordinate");
                    }
                });
            });
        });
}
