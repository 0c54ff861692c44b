use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::scene::splom::SplomView;

// ---------------------------------------------------------------------------
// Selection table (bottom panel)
// ---------------------------------------------------------------------------

const ROW_HEIGHT: f32 = 18.0;

/// Rows currently selected by the brush, in dataset order.
pub fn selection_table(ui: &mut Ui, view: &SplomView) {
    let dataset = view.dataset();
    let selection = view.selection();

    if selection.is_empty() {
        ui.label("Drag a rectangle on any scatter plot to select records.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(110.0))
        .columns(Column::auto().at_least(80.0), dataset.features.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("class");
            });
            for name in &dataset.features {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, selection.len(), |mut row| {
                let Some(record) = selection.get(row.index()).and_then(|&i| dataset.records.get(i)) else {
                    return;
                };
                let index = selection[row.index()];
                row.col(|ui| {
                    ui.label(index.to_string());
                });
                row.col(|ui| {
                    ui.label(RichText::new(&record.category).color(super::swatch(view.colors().color_for(&record.category))));
                });
                for k in 0..dataset.features.len() {
                    row.col(|ui| {
                        ui.label(record.get(k).to_string());
                    });
                }
            });
        });
}
