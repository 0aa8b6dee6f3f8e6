use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::color::ColorMap;
use crate::state::{AppState, Dimension};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds.clone(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multiselect(
                ui,
                state,
                Dimension::Disease,
                "Select Diseases",
                dataset.diseases(),
            );
            ui.separator();
            multiselect(
                ui,
                state,
                Dimension::Region,
                "Select Regions",
                dataset.regions(),
            );
            ui.separator();

            ui.strong("Select Year Range");
            match dataset.year_bounds() {
                Some((min, max)) => {
                    let (mut lo, mut hi) = state.selection.years;
                    let from = ui.add(Slider::new(&mut lo, min..=max).text("From"));
                    let to = ui.add(Slider::new(&mut hi, min..=max).text("To"));
                    if from.changed() || to.changed() {
                        state.set_years(lo, hi);
                    }
                    if lo > hi {
                        ui.label(
                            RichText::new("Start year is after end year")
                                .small()
                                .color(Color32::YELLOW),
                        );
                    }
                }
                None => {
                    ui.label("No years in dataset.");
                }
            }
        });
}

/// A collapsible checkbox list with All / None buttons.
fn multiselect(
    ui: &mut Ui,
    state: &mut AppState,
    dim: Dimension,
    title: &str,
    all_values: &BTreeSet<String>,
) {
    let selected = match dim {
        Dimension::Disease => &state.selection.diseases,
        Dimension::Region => &state.selection.regions,
    };
    let header_text = format!("{title}  ({}/{})", selected.len(), all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            // Time-series lines are coloured by region, bars by disease.
            let colors: &ColorMap = match dim {
                Dimension::Disease => &state.disease_colors,
                Dimension::Region => &state.region_colors,
            };

            let mut toggled = None;
            for val in all_values {
                let selected = match dim {
                    Dimension::Disease => &state.selection.diseases,
                    Dimension::Region => &state.selection.regions,
                };
                let mut checked = selected.contains(val);
                let text = RichText::new(val.as_str()).color(colors.color_for(val));
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(val.clone());
                }
            }
            if let Some(val) = toggled {
                state.toggle_value(dim, &val);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                view.filtered.len()
            ));
            ui.separator();
            ui.label(RichText::new(state.source.to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open case data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
