use std::collections::{BTreeMap, BTreeSet};

use crate::data::model::Dataset;

pub const TITLE: &str = "Regional Disease Cases Heatmap";

// ---------------------------------------------------------------------------
// CaseMatrix – Region × Disease pivot of summed cases
// ---------------------------------------------------------------------------

/// Dense pivot table: rows are regions, columns are diseases, cells are summed cases.
///
/// Every (region, disease) combination of the observed labels has a cell;
/// combinations without records hold 0.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseMatrix {
    pub regions: Vec<String>,
    pub diseases: Vec<String>,
    /// `cells[row][col]`, row = region index, col = disease index.
    pub cells: Vec<Vec<u64>>,
}

impl CaseMatrix {
    /// Summed cases for a pair, 0 when the pair (or either label) is absent.
    pub fn get(&self, region: &str, disease: &str) -> u64 {
        let row = self.regions.iter().position(|r| r == region);
        let col = self.diseases.iter().position(|d| d == disease);
        match (row, col) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => 0,
        }
    }

    /// Largest cell, 0 for an empty matrix.
    pub fn max(&self) -> u64 {
        self.cells
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() || self.diseases.is_empty()
    }
}

/// Pivot `dataset` into a [`CaseMatrix`] summing `Cases` per (Region, Disease).
pub fn aggregate(dataset: &Dataset) -> CaseMatrix {
    let mut sums: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut diseases: BTreeSet<&str> = BTreeSet::new();
    let mut regions: BTreeSet<&str> = BTreeSet::new();

    for rec in dataset.records() {
        regions.insert(&rec.region);
        diseases.insert(&rec.disease);
        let cell = sums.entry((rec.region.as_str(), rec.disease.as_str())).or_insert(0);
        // clamp instead of wrapping on absurd counts
        *cell = cell.saturating_add(rec.cases);
    }

    let cells = regions
        .iter()
        .map(|region| {
            diseases
                .iter()
                .map(|disease| sums.get(&(*region, *disease)).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    CaseMatrix {
        regions: regions.into_iter().map(str::to_string).collect(),
        diseases: diseases.into_iter().map(str::to_string).collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// Heatmap chart spec
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatmapChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub color_label: &'static str,
    pub matrix: CaseMatrix,
}

/// Build the heatmap: x = Disease, y = Region, colour = summed cases.
pub fn heatmap(dataset: &Dataset) -> HeatmapChart {
    HeatmapChart {
        title: TITLE,
        x_label: "Disease",
        y_label: "Region",
        color_label: "Cases",
        matrix: aggregate(dataset),
    }
}
