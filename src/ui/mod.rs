pub mod canvas;
pub mod panels;
pub mod table;

use eframe::egui::Color32;

use crate::color::Rgb8;

/// Opaque egui colour for legend swatches and labels.
pub fn swatch(c: Rgb8) -> Color32 {
    Color32::from_rgb(c.red, c.green, c.blue)
}
