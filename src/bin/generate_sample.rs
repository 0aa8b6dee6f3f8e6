use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Seeded multiplicative noise for case counts (splitmix64 stream).
struct Jitter {
    state: u64,
    spread: f64,
}

impl Jitter {
    /// Factors are drawn uniformly from `1 ± spread`.
    fn new(seed: u64, spread: f64) -> Self {
        Jitter { state: seed, spread }
    }

    fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    fn factor(&mut self) -> f64 {
        1.0 - self.spread + 2.0 * self.spread * self.next_unit()
    }
}

struct Row {
    disease: &'static str,
    region: &'static str,
    year: i64,
    cases: i64,
}

/// Yearly counts: a per-disease baseline scaled by region, a yearly trend and ±20% noise.
fn generate_rows(jitter: &mut Jitter) -> Vec<Row> {
    // (disease, baseline cases, yearly growth)
    let diseases = [
        ("Influenza", 1200.0, 0.03),
        ("Measles", 90.0, -0.08),
        ("Tuberculosis", 400.0, -0.04),
        ("Malaria", 650.0, 0.01),
        ("Dengue", 300.0, 0.09),
    ];
    // (region, burden multiplier)
    let regions = [("North", 0.7), ("South", 1.4), ("East", 1.0), ("West", 0.5)];

    let mut rows = Vec::new();
    for year in 2015..=2023 {
        let t = (year - 2015) as f64;
        for &(disease, baseline, growth) in &diseases {
            for &(region, burden) in &regions {
                let cases = baseline * burden * (1.0f64 + growth).powf(t) * jitter.factor();
                rows.push(Row {
                    disease,
                    region,
                    year,
                    cases: cases.round().max(0.0) as i64,
                });
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["Disease", "Region", "Year", "Cases"])?;
    for row in rows {
        let year = row.year.to_string();
        let cases = row.cases.to_string();
        writer.write_record([row.disease, row.region, year.as_str(), cases.as_str()])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Disease", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("Cases", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.disease).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(
                rows.iter().map(|r| r.region).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.cases).collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut jitter = Jitter::new(42, 0.2);
    let rows = generate_rows(&mut jitter);

    write_csv("sample_data.csv", &rows)?;
    write_parquet("sample_data.parquet", &rows)?;

    println!(
        "Wrote {} records to sample_data.csv and sample_data.parquet",
        rows.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_spread_and_is_seeded() {
        let mut a = Jitter::new(7, 0.2);
        let mut b = Jitter::new(7, 0.2);
        for _ in 0..1000 {
            let f = a.factor();
            assert!((0.8..=1.2).contains(&f));
            assert_eq!(f, b.factor());
        }
    }

    #[test]
    fn every_disease_region_year_gets_a_row() {
        let rows = generate_rows(&mut Jitter::new(42, 0.2));
        // 9 years × 5 diseases × 4 regions
        assert_eq!(rows.len(), 180);
        assert!(rows.iter().all(|r| r.cases >= 0));
        assert!(rows.iter().all(|r| (2015..=2023).contains(&r.year)));
    }
}
