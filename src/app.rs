use eframe::egui;

use crate::data::loader::DatasetKind;
use crate::state::{AppState, Tab};
use crate::ui::{canvas, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VizApp {
    pub state: AppState,
}

impl VizApp {
    /// Build the app and start fetching both datasets.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut state = AppState::default();
        let ctx = cc.egui_ctx.clone();
        state.start_fetches(move || ctx.request_repaint());
        Self { state }
    }

    /// Files dropped on the window load by extension, like File → Open.
    fn open_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for path in dropped.into_iter().filter_map(|file| file.path) {
            if let Err(e) = self.state.open_file(&path) {
                self.state.fail(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for VizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_fetches();
        self.open_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: view controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: brushed records ----
        if self.state.tab == Tab::Splom {
            if let Some(view) = &self.state.splom {
                egui::TopBottomPanel::bottom("selection_table")
                    .resizable(true)
                    .default_height(180.0)
                    .show(ctx, |ui| {
                        table::selection_table(ui, view);
                    });
            }
        }

        // ---- Central panel: canvas ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::Correlogram => match &self.state.correlogram {
                Some(view) => canvas::scene_canvas(ui, &view.composite()),
                None => placeholder(ui, self.state.error_for(DatasetKind::Abalone)),
            },
            Tab::Splom => match &mut self.state.splom {
                Some(view) => canvas::splom_canvas(ui, view),
                None => placeholder(ui, self.state.error_for(DatasetKind::Iris)),
            },
        });
    }
}

fn placeholder(ui: &mut egui::Ui, error: Option<&str>) {
    ui.centered_and_justified(|ui| match error {
        Some(error) => {
            ui.heading(egui::RichText::new(error).color(egui::Color32::RED));
        }
        None => {
            ui.heading("Waiting for data  (File → Open… or drop a file to load a local copy)");
        }
    });
}
