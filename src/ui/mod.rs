/// egui widgets: the filter sidebar, top bar, and the chart panels.
pub mod panels;
pub mod plot;
