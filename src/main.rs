mod app;
mod brush;
mod color;
mod config;
mod data;
mod export;
mod observable;
mod scene;
mod state;
mod stats;
mod ui;

use app::VizApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "vizmat – Correlation & Scatter-Plot Matrices",
        options,
        Box::new(|cc| Ok(Box::new(VizApp::new(cc)))),
    )
}
