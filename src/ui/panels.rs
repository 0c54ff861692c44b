use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::brush::BrushRules;
use crate::data::loader::DatasetKind;
use crate::export;
use crate::state::{AppState, Tab};
use crate::ui::swatch;

// ---------------------------------------------------------------------------
// Left side panel – view controls
// ---------------------------------------------------------------------------

/// Render the left control panel for the active tab.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.tab {
            Tab::Correlogram => correlogram_controls(ui, state),
            Tab::Splom => splom_controls(ui, state),
        });
}

fn correlogram_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Abalone");
    ui.separator();

    let Some(view) = &state.correlogram else {
        ui.label(waiting_text(state, DatasetKind::Abalone));
        return;
    };

    ui.strong("Sex");
    let active = view.active_index();
    let groups: Vec<(String, String, usize)> = view
        .groups()
        .iter()
        .map(|g| (g.spec.key.clone(), g.spec.label.clone(), g.records))
        .collect();

    for (i, (key, label, records)) in groups.iter().enumerate() {
        if ui
            .radio(i == active, format!("{label}  ({records})"))
            .clicked()
        {
            state.select_group(key);
        }
    }

    ui.separator();
    ui.label("Lower triangle: Pearson r. Upper triangle: circle area ∝ |r|.");
    ui.label(RichText::new("n/a: fewer than two complete pairs or a constant feature.").weak());
}

fn splom_controls(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Iris");
    ui.separator();

    if state.splom.is_none() {
        ui.label(waiting_text(state, DatasetKind::Iris));
        return;
    }
    let rules = state.brush_rules;
    let Some(view) = state.splom.as_mut() else {
        return;
    };

    ui.strong("Class");
    for (class, color) in view.colors().legend_entries() {
        let count = view
            .dataset()
            .records
            .iter()
            .filter(|r| r.category == class)
            .count();
        if count > 0 {
            ui.horizontal(|ui: &mut Ui| {
                ui.label(RichText::new("●").color(swatch(color)));
                ui.label(format!("{class}  ({count})"));
            });
        }
    }

    ui.separator();
    ui.strong("Brush");
    ui.label(format!(
        "{} of {} records selected",
        view.selection().len(),
        view.dataset().len()
    ));
    if ui.button("Clear brush").clicked() {
        view.clear();
    }

    ui.add_space(4.0);
    let mut picked = rules;
    ui.radio_value(&mut picked, BrushRules::CONSISTENT, "Edges count as inside");
    ui.radio_value(&mut picked, BrushRules::LEGACY, "Edges visible, not selected");
    if picked != rules {
        state.set_brush_rules(picked);
    }
}

fn waiting_text(state: &AppState, kind: DatasetKind) -> String {
    if state.pending_kinds().contains(&kind) {
        format!("Fetching {} dataset…", kind.label())
    } else if let Some(error) = state.error_for(kind) {
        format!("No {} dataset loaded. {error}", kind.label())
    } else {
        format!("No {} dataset loaded (File → Open {} file…).", kind.label(), kind.label())
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open abalone file…").clicked() {
                open_file_dialog(state, DatasetKind::Abalone);
                ui.close_menu();
            }
            if ui.button("Open iris file…").clicked() {
                open_file_dialog(state, DatasetKind::Iris);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export SVG…").clicked() {
                export_svg_dialog(state);
                ui.close_menu();
            }
            let can_export = state.splom.as_ref().is_some_and(|v| !v.selection().is_empty());
            if ui
                .add_enabled(can_export, egui::Button::new("Export selection…"))
                .clicked()
            {
                export_selection_dialog(state);
                ui.close_menu();
            }
        });

        if ui.add_enabled(!state.loading(), egui::Button::new("Reload")).clicked() {
            let ctx = ui.ctx().clone();
            state.clear_errors();
            state.start_fetches(move || ctx.request_repaint());
        }

        ui.separator();

        ui.selectable_value(&mut state.tab, Tab::Correlogram, "Correlation matrix");
        ui.selectable_value(&mut state.tab, Tab::Splom, "Scatter-plot matrix");

        ui.separator();

        if state.loading() {
            ui.spinner();
        }

        for msg in state.errors() {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, kind: DatasetKind) {
    let dialog = rfd::FileDialog::new().set_title(format!("Open {} data", kind.label()));
    let dialog = match kind {
        DatasetKind::Abalone => dialog
            .add_filter("Abalone data", &["data", "txt", "csv"])
            .add_filter("All files", &["*"]),
        DatasetKind::Iris => dialog
            .add_filter("CSV", &["csv"])
            .add_filter("All files", &["*"]),
    };

    if let Some(path) = dialog.pick_file() {
        if let Err(e) = state.open_file_as(&path, kind) {
            state.fail_for(kind, format!("Error: {e:#}"));
        }
    }
}

fn save_path(title: &str, name: &str, extension: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(name)
        .add_filter(extension, &[extension])
        .save_file()
}

pub fn export_svg_dialog(state: &mut AppState) {
    let Some(scene) = state.current_scene() else {
        state.fail("Nothing to export yet".to_string());
        return;
    };
    let name = match state.tab {
        Tab::Correlogram => "correlogram.svg",
        Tab::Splom => "splom.svg",
    };
    if let Some(path) = save_path("Export SVG", name, "svg") {
        match export::write_svg(&path, &scene) {
            Ok(()) => log::info!("Wrote {}", path.display()),
            Err(e) => state.fail(format!("Error: {e:#}")),
        }
    }
}

pub fn export_selection_dialog(state: &mut AppState) {
    let Some(view) = &state.splom else {
        return;
    };
    let Some(path) = save_path("Export selection", "selection.json", "json") else {
        return;
    };
    match export::write_selection(&path, view.dataset(), view.selection()) {
        Ok(()) => log::info!("Wrote {} selected records to {}", view.selection().len(), path.display()),
        Err(e) => state.fail(format!("Error: {e:#}")),
    }
}
