use std::collections::BTreeSet;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Filter predicate: which diseases, regions and years are selected
// ---------------------------------------------------------------------------

/// The user's current sidebar selection.
///
/// Unlike a "no filter" convention, an empty set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub diseases: BTreeSet<String>,
    pub regions: BTreeSet<String>,
    /// Inclusive `(lo, hi)`. `lo > hi` matches no year.
    pub years: (i32, i32),
}

impl FilterSelection {
    /// Select everything in `dataset` (the sidebar defaults).
    pub fn full_extent(dataset: &Dataset) -> Self {
        Self {
            diseases: dataset.diseases().clone(),
            regions: dataset.regions().clone(),
            years: dataset.year_bounds().unwrap_or((0, 0)),
        }
    }

    fn contains_year(&self, year: i32) -> bool {
        let (lo, hi) = self.years;
        lo <= year && year <= hi
    }
}

/// Return the records of `dataset` that pass all three predicates, in source order.
///
/// A record passes when:
/// * its disease is in the selected disease set, and
/// * its region is in the selected region set, and
/// * its year lies within the inclusive year range.
pub fn apply_filter(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    let records = dataset
        .records()
        .iter()
        .filter(|rec| {
            selection.diseases.contains(&rec.disease)
                && selection.regions.contains(&rec.region)
                && selection.contains_year(rec.year)
        })
        .cloned()
        .collect();
    Dataset::from_records(records)
}
