use std::collections::{BTreeMap, BTreeSet};

use crate::data::model::Dataset;

pub const TITLE: &str = "Yearly Disease Cases by Region";

/// A single bar. `cases` is the raw record value, never summed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    pub disease: String,
    pub cases: u64,
}

/// All bars of one year inside a facet, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGroup {
    pub year: i32,
    pub bars: Vec<Bar>,
}

/// One sub-panel of the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub region: String,
    /// Ascending by year.
    pub groups: Vec<YearGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetedBarChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Legend order (sorted); also the slot order of bars inside a year group.
    pub diseases: Vec<String>,
    /// One facet per region, sorted by region.
    pub facets: Vec<Facet>,
}

/// Build the grouped bar chart faceted by region.
pub fn faceted_bars(dataset: &Dataset) -> FacetedBarChart {
    let mut facets: BTreeMap<&str, BTreeMap<i32, Vec<Bar>>> = BTreeMap::new();
    let mut diseases: BTreeSet<&str> = BTreeSet::new();

    for rec in dataset.records() {
        diseases.insert(&rec.disease);
        facets
            .entry(&rec.region)
            .or_default()
            .entry(rec.year)
            .or_default()
            .push(Bar {
                disease: rec.disease.clone(),
                cases: rec.cases,
            });
    }

    let facets = facets
        .into_iter()
        .map(|(region, years)| Facet {
            region: region.to_string(),
            groups: years
                .into_iter()
                .map(|(year, bars)| YearGroup { year, bars })
                .collect(),
        })
        .collect();

    FacetedBarChart {
        title: TITLE,
        x_label: "Year",
        y_label: "Cases",
        diseases: diseases.into_iter().map(str::to_string).collect(),
        facets,
    }
}
