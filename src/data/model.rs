use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CaseRecord – one row of the source table
// ---------------------------------------------------------------------------

/// Case count for one disease in one region for one year.
///
/// Field names follow the column headers of the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(rename = "Disease")]
    pub disease: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Cases")]
    pub cases: u64,
}

impl CaseRecord {
    pub fn new(disease: &str, region: &str, year: i32, cases: u64) -> Self {
        Self {
            disease: disease.to_string(),
            region: region.to_string(),
            year,
            cases,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable table of case records with pre-computed column indices.
///
/// Records keep their source order; the indices are sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    records: Vec<CaseRecord>,
    diseases: BTreeSet<String>,
    regions: BTreeSet<String>,
    year_bounds: Option<(i32, i32)>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        let mut diseases = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut year_bounds: Option<(i32, i32)> = None;

        for rec in &records {
            diseases.insert(rec.disease.clone());
            regions.insert(rec.region.clone());
            year_bounds = Some(match year_bounds {
                Some((lo, hi)) => (lo.min(rec.year), hi.max(rec.year)),
                None => (rec.year, rec.year),
            });
        }

        Dataset {
            records,
            diseases,
            regions,
            year_bounds,
        }
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    /// Distinct diseases, sorted.
    pub fn diseases(&self) -> &BTreeSet<String> {
        &self.diseases
    }

    /// Distinct regions, sorted.
    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    /// Smallest and largest year present, `None` when empty.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        self.year_bounds
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
