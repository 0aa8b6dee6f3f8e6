use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, ScrollArea, Sense, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    uniform_grid_spacer, Bar as PlotBar, BarChart, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::charts::{FacetedBarChart, HeatmapChart, TimeSeriesChart};
use crate::color::{heat_color, ColorMap};
use crate::data::model::Dataset;
use crate::state::AppState;
use crate::view::{Narrative, ViewModel};

const CHART_HEIGHT: f32 = 320.0;
const FACET_HEIGHT: f32 = 180.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the page: introduction, three charts, conclusion, record table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No dataset loaded  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading(crate::view::PAGE_TITLE);
            narrative(ui, &view.introduction);

            ui.add_space(8.0);
            ui.heading("Disease Cases Over Time");
            time_series_plot(ui, &view.time_series, &state.region_colors);

            ui.add_space(8.0);
            ui.heading("Regional Disease Cases Heatmap");
            heatmap_plot(ui, &view.heatmap);

            ui.add_space(8.0);
            ui.heading("Yearly Disease Cases by Region");
            bar_facets(ui, &view.bars, &state.disease_colors);

            ui.add_space(8.0);
            narrative(ui, &view.conclusion);

            ui.add_space(8.0);
            records_table(ui, view);
        });
}

/// Page-level failure: the only thing shown when the startup load failed.
pub fn load_failure(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!("The dashboard could not start.\n\n{message}"))
                .heading()
                .color(Color32::RED),
        );
    });
}

fn narrative(ui: &mut Ui, block: &Narrative) {
    ui.label(RichText::new(block.heading).strong().size(18.0));
    ui.label(block.body);
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

fn time_series_plot(ui: &mut Ui, chart: &TimeSeriesChart, colors: &ColorMap) {
    ui.label(RichText::new(chart.title).weak());
    Plot::new("time_series")
        .legend(Legend::default())
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .height(CHART_HEIGHT)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let name = format!("{} · {}", series.region, series.disease);
                let color = colors.color_for(&series.region);
                let coords: Vec<[f64; 2]> = series
                    .points
                    .iter()
                    .map(|&(year, cases)| [year as f64, cases as f64])
                    .collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(&name)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(&name)
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Label for a categorical axis whose categories sit at integer positions.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn heatmap_plot(ui: &mut Ui, chart: &HeatmapChart) {
    ui.label(RichText::new(chart.title).weak());
    let matrix = &chart.matrix;
    if matrix.is_empty() {
        ui.label("No cases match the current filters.");
    }
    let max = matrix.max();

    // Rows are drawn top-down, so the y axis lists regions in reverse.
    let x_labels = matrix.diseases.clone();
    let y_labels: Vec<String> = matrix.regions.iter().rev().cloned().collect();
    let n_rows = matrix.regions.len();

    Plot::new("heatmap")
        .x_axis_label(chart.x_label)
        .y_axis_label(chart.y_label)
        .height(CHART_HEIGHT)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&x_labels, mark.value)
        })
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&y_labels, mark.value)
        })
        .show(ui, |plot_ui| {
            for (r, row) in matrix.cells.iter().enumerate() {
                let y = (n_rows - 1 - r) as f64;
                for (c, &cases) in row.iter().enumerate() {
                    let x = c as f64;
                    let t = if max == 0 { 0.0 } else { cases as f64 / max as f64 };
                    let cell = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(cell))
                            .fill_color(heat_color(t))
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let text_color = if t > 0.5 { Color32::WHITE } else { Color32::BLACK };
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(cases.to_string()).color(text_color),
                    ));
                }
            }
        });

    color_scale(ui, chart.color_label, max);
}

/// Horizontal colour bar from 0 to `max`.
fn color_scale(ui: &mut Ui, label: &str, max: u64) {
    const STEPS: usize = 32;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{label}: 0"));
        let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 12.0), Sense::hover());
        let step = rect.width() / STEPS as f32;
        for i in 0..STEPS {
            let x0 = rect.left() + i as f32 * step;
            let swatch = egui::Rect::from_min_max(
                egui::pos2(x0, rect.top()),
                egui::pos2(x0 + step, rect.bottom()),
            );
            let t = i as f64 / (STEPS - 1) as f64;
            ui.painter().rect_filled(swatch, 0.0, heat_color(t));
        }
        ui.label(max.to_string());
    });
}

// ---------------------------------------------------------------------------
// Faceted bars
// ---------------------------------------------------------------------------

/// Offset from the year and width of the bar in slot `slot` of `n_slots`.
fn bar_slot(slot: usize, n_slots: usize) -> (f64, f64) {
    let n = n_slots.max(1) as f64;
    let width = 0.8 / n;
    let offset = (slot as f64 - (n - 1.0) / 2.0) * width;
    (offset, width)
}

fn bar_facets(ui: &mut Ui, chart: &FacetedBarChart, colors: &ColorMap) {
    ui.label(RichText::new(chart.title).weak());
    if chart.facets.is_empty() {
        // Still draw an empty panel so the layout does not jump.
        Plot::new("bars_empty")
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label)
            .height(FACET_HEIGHT)
            .show(ui, |_| {});
        return;
    }

    for facet in &chart.facets {
        ui.label(RichText::new(format!("Region = {}", facet.region)).strong());
        Plot::new(("bars", facet.region.as_str()))
            .legend(Legend::default())
            .x_axis_label(chart.x_label)
            .y_axis_label(chart.y_label)
            .height(FACET_HEIGHT)
            .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (slot, disease) in chart.diseases.iter().enumerate() {
                    let (offset, width) = bar_slot(slot, chart.diseases.len());
                    let bars: Vec<PlotBar> = facet
                        .groups
                        .iter()
                        .flat_map(|group| {
                            group
                                .bars
                                .iter()
                                .filter(|bar| &bar.disease == disease)
                                .map(move |bar| {
                                    PlotBar::new(group.year as f64 + offset, bar.cases as f64)
                                        .width(width)
                                })
                        })
                        .collect();
                    if bars.is_empty() {
                        continue;
                    }
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .name(disease)
                            .color(colors.color_for(disease)),
                    );
                }
            });
    }
}

// ---------------------------------------------------------------------------
// Record table
// ---------------------------------------------------------------------------

fn records_table(ui: &mut Ui, view: &ViewModel) {
    let records = view.filtered.records();
    egui::CollapsingHeader::new(format!("Filtered records ({})", records.len()))
        .id_salt("records")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table(ui, &view.filtered);
        });
}

fn table(ui: &mut Ui, dataset: &Dataset) {
    let records = dataset.records();
    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .max_scroll_height(240.0)
        .header(20.0, |mut header| {
            for title in ["Disease", "Region", "Year", "Cases"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let rec = &records[row.index()];
                row.col(|ui| {
                    ui.label(rec.disease.as_str());
                });
                row.col(|ui| {
                    ui.label(rec.region.as_str());
                });
                row.col(|ui| {
                    ui.label(rec.year.to_string());
                });
                row.col(|ui| {
                    ui.label(rec.cases.to_string());
                });
            });
        });
}
