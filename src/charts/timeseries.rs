use std::collections::BTreeMap;

use crate::data::model::Dataset;

pub const TITLE: &str = "Regional Disease Cases Over Time";

/// One line: all records of a single (Region, Disease) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub region: String,
    pub disease: String,
    /// `(year, cases)`, ascending by year.
    pub points: Vec<(i32, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesChart {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// Ordered by (Region, Disease).
    pub series: Vec<Series>,
}

/// Build the cases-over-time chart. Lines are coloured by region and named by disease.
pub fn time_series(dataset: &Dataset) -> TimeSeriesChart {
    let mut groups: BTreeMap<(&str, &str), Vec<(i32, u64)>> = BTreeMap::new();
    for rec in dataset.records() {
        groups
            .entry((rec.region.as_str(), rec.disease.as_str()))
            .or_default()
            .push((rec.year, rec.cases));
    }

    let series = groups
        .into_iter()
        .map(|((region, disease), mut points)| {
            // stable: duplicate years keep source order
            points.sort_by_key(|&(year, _)| year);
            Series {
                region: region.to_string(),
                disease: disease.to_string(),
                points,
            }
        })
        .collect();

    TimeSeriesChart {
        title: TITLE,
        x_label: "Year",
        y_label: "Cases",
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CaseRecord;

    #[test]
    fn one_series_per_region_disease_pair() {
        let ds = Dataset::from_records(vec![
            CaseRecord::new("Flu", "South", 2021, 9),
            CaseRecord::new("Flu", "North", 2021, 5),
            CaseRecord::new("Flu", "North", 2019, 2),
            CaseRecord::new("Measles", "North", 2020, 1),
            CaseRecord::new("Flu", "North", 2020, 4),
        ]);

        let chart = time_series(&ds);
        let keys: Vec<(&str, &str)> = chart
            .series
            .iter()
            .map(|s| (s.region.as_str(), s.disease.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("North", "Flu"), ("North", "Measles"), ("South", "Flu")]
        );
        assert_eq!(chart.series[0].points, vec![(2019, 2), (2020, 4), (2021, 5)]);
    }

    #[test]
    fn empty_input_has_no_series() {
        let chart = time_series(&Dataset::default());
        assert!(chart.series.is_empty());
        assert_eq!(chart.title, TITLE);
    }
}
