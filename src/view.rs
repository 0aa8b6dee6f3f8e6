use crate::charts::{self, FacetedBarChart, HeatmapChart, TimeSeriesChart};
use crate::data::filter::{apply_filter, FilterSelection};
use crate::data::model::Dataset;

pub const PAGE_TITLE: &str = "Public Health Campaign - Regional Disparities Visualization";

/// A static block of narration shown around the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Narrative {
    pub heading: &'static str,
    pub body: &'static str,
}

pub const INTRODUCTION: Narrative = Narrative {
    heading: "Introduction",
    body: "Public health campaigns require a deep understanding of regional disparities \
           to allocate resources effectively. This app provides visual insights into such \
           disparities, focusing on selected diseases across different regions.",
};

pub const CONCLUSION: Narrative = Narrative {
    heading: "Conclusion",
    body: "The visualizations above provide a clear understanding of regional disparities \
           in disease cases. By leveraging these insights, public health officials can \
           prioritize interventions and allocate resources more effectively.",
};

/// Everything one frame of the dashboard shows for a given selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub introduction: Narrative,
    /// The rows that passed the filter, in source order.
    pub filtered: Dataset,
    pub time_series: TimeSeriesChart,
    pub heatmap: HeatmapChart,
    pub bars: FacetedBarChart,
    pub conclusion: Narrative,
}

/// Filter `dataset` by `selection` and build all three charts from the result.
pub fn render(dataset: &Dataset, selection: &FilterSelection) -> ViewModel {
    let filtered = apply_filter(dataset, selection);
    log::debug!(
        "Rendering {} of {} records (years {:?})",
        filtered.len(),
        dataset.len(),
        selection.years
    );

    ViewModel {
        introduction: INTRODUCTION,
        time_series: charts::time_series(&filtered),
        heatmap: charts::heatmap(&filtered),
        bars: charts::faceted_bars(&filtered),
        filtered,
        conclusion: CONCLUSION,
    }
}
