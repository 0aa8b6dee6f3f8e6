/// Chart builders: pure transforms from a filtered [`Dataset`] to chart specs.
///
/// ```text
///   filtered Dataset
///        │
///        ├──► time_series   one line per (Region, Disease)
///        ├──► heatmap       Region × Disease matrix of summed cases
///        └──► faceted_bars  one facet per Region, bars per Year × Disease
/// ```
///
/// Specs carry no colours or widget state; the UI layer decides how to draw them.
///
/// [`Dataset`]: crate::data::model::Dataset

pub mod bar;
pub mod heatmap;
pub mod timeseries;

pub use bar::{faceted_bars, FacetedBarChart};
pub use heatmap::{aggregate, heatmap, CaseMatrix, HeatmapChart};
pub use timeseries::{time_series, TimeSeriesChart};
