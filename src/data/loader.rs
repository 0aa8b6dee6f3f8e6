use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Int32Type, Int64Type, UInt32Type, UInt64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CaseRecord, Dataset};

/// Columns every source must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Disease", "Region", "Year", "Cases"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded. Always fatal for that source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing expected column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: {message}")]
    Malformed { row: usize, message: String },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("invalid Arrow data: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

// ---------------------------------------------------------------------------
// Source identifier
// ---------------------------------------------------------------------------

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` strings are URLs, everything else is a path.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::File(PathBuf::from(s))
        }
    }

    /// Cache key.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    /// Dispatch by extension; no extension means CSV.
    fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "" | "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// The path part of a URL: no scheme, host, query or fragment.
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.find('/').map_or("", |i| &rest[i..]);
    path.split(['?', '#']).next().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read and parse a dataset. Performs exactly one network or file read.
pub fn load_source(source: &DataSource) -> Result<Dataset, LoadError> {
    let dataset = match source {
        DataSource::File(path) => load_file(path)?,
        DataSource::Url(url) => load_url(url)?,
    };
    log::info!(
        "Loaded {} records from {source}: {} diseases, {} regions, years {:?}",
        dataset.len(),
        dataset.diseases().len(),
        dataset.regions().len(),
        dataset.year_bounds()
    );
    Ok(dataset)
}

/// Load a dataset from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with `Disease`, `Region`, `Year`, `Cases`
/// * `.json`    – `[{ "Disease": ..., "Region": ..., "Year": ..., "Cases": ... }, ...]`
/// * `.parquet` – one column per field
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let format = Format::from_path(path)?;
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match format {
        Format::Csv => parse_csv(file),
        Format::Json => parse_json(BufReader::new(file)),
        Format::Parquet => parse_parquet(file),
    }
}

/// Fetch a dataset over HTTP. No timeout: a slow source blocks the caller.
fn load_url(url: &str) -> Result<Dataset, LoadError> {
    let format = Format::from_path(Path::new(url_path(url)))?;
    let client = reqwest::blocking::Client::builder().timeout(None::<Duration>).build()?;
    let body = client.get(url).send()?.error_for_status()?.bytes()?;

    match format {
        Format::Csv => parse_csv(&body[..]),
        Format::Json => parse_json(&body[..]),
        Format::Parquet => parse_parquet(body),
    }
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

/// Process-lifetime memo of loaded datasets, keyed by [`DataSource::id`].
///
/// Failed loads are not remembered. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `source`, loading it on first use.
    pub fn fetch(&mut self, source: &DataSource) -> Result<Arc<Dataset>, LoadError> {
        self.fetch_with(source, load_source)
    }

    fn fetch_with<F>(&mut self, source: &DataSource, load: F) -> Result<Arc<Dataset>, LoadError>
    where
        F: FnOnce(&DataSource) -> Result<Dataset, LoadError>,
    {
        let key = source.id();
        if let Some(hit) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {key}");
            return Ok(Arc::clone(hit));
        }
        let dataset = Arc::new(load(source)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fail with the first of [`REQUIRED_COLUMNS`] missing from `present`.
fn require_columns<'a>(present: impl Iterator<Item = &'a str>) -> Result<(), LoadError> {
    let present: Vec<&str> = present.collect();
    match REQUIRED_COLUMNS.into_iter().find(|col| !present.contains(col)) {
        Some(col) => Err(LoadError::MissingColumn(col)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; extra columns are ignored.
/// Header and cell whitespace is trimmed.
fn parse_csv<R: Read>(input: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    require_columns(headers.iter())?;

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<CaseRecord>().enumerate() {
        let record = result.map_err(|e| LoadError::Malformed {
            row: row_no + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default of `df.to_json(orient='records')`.
///
/// A record lacking a required key is a missing column; a bad value is a malformed row.
fn parse_json<R: Read>(input: R) -> Result<Dataset, LoadError> {
    let rows: Vec<JsonValue> = serde_json::from_reader(input)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let malformed = |message: String| LoadError::Malformed {
            row: i + 1,
            message,
        };
        let obj = row
            .as_object()
            .ok_or_else(|| malformed("not a JSON object".to_string()))?;
        require_columns(obj.keys().map(String::as_str))?;

        let record: CaseRecord =
            serde_json::from_value(row).map_err(|e| malformed(e.to_string()))?;
        records.push(record);
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `Disease`, `Region`: Utf8 or LargeUtf8
/// - `Year`, `Cases`: Int32, Int64, UInt32 or UInt64
///
/// Works with files written by both **Pandas** and **Polars**.
fn parse_parquet<T: ChunkReader + 'static>(input: T) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input)?;
    // checked on the file schema so files without row groups are rejected too
    require_columns(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;

        let disease = column(&batch, "Disease")?;
        let region = column(&batch, "Region")?;
        let year = column(&batch, "Year")?;
        let cases = column(&batch, "Cases")?;

        for row in 0..batch.num_rows() {
            let line = records.len() + 1;
            let malformed = |col: &str, message: String| LoadError::Malformed {
                row: line,
                message: format!("{col}: {message}"),
            };

            let year_value = int_cell(year, row).map_err(|m| malformed("Year", m))?;
            let cases_value = int_cell(cases, row).map_err(|m| malformed("Cases", m))?;

            records.push(CaseRecord {
                disease: string_cell(disease, row).map_err(|m| malformed("Disease", m))?,
                region: string_cell(region, row).map_err(|m| malformed("Region", m))?,
                year: i32::try_from(year_value)
                    .map_err(|_| malformed("Year", format!("{year_value} out of range")))?,
                cases: u64::try_from(cases_value)
                    .map_err(|_| malformed("Cases", format!("{cases_value} is negative")))?,
            });
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a ArrayRef, LoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name))?;
    Ok(batch.column(idx))
}

fn string_cell(col: &ArrayRef, row: usize) -> Result<String, String> {
    if col.is_null(row) {
        return Err("null value".to_string());
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => Err(format!("expected a string column, got {other:?}")),
    }
}

fn int_cell(col: &ArrayRef, row: usize) -> Result<i64, String> {
    if col.is_null(row) {
        return Err("null value".to_string());
    }
    match col.data_type() {
        DataType::Int32 => Ok(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Ok(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => Ok(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_err(|_| format!("{v} out of range"))
        }
        other => Err(format!("expected an integer column, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const CSV: &str = "\
Disease,Region,Year,Cases,Source
Flu,North,2019,10,survey
Flu,North,2020,12,survey
Measles,South,2020,3,clinic
";

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_csv_and_ignores_extra_columns() {
        let ds = parse_csv(CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records()[2], CaseRecord::new("Measles", "South", 2020, 3));
        assert_eq!(ds.year_bounds(), Some((2019, 2020)));
    }

    #[test]
    fn csv_header_whitespace_is_trimmed() {
        let ds = parse_csv(" Disease , Region , Year , Cases \nFlu, East ,2021, 4\n".as_bytes())
            .unwrap();
        assert_eq!(ds.records()[0], CaseRecord::new("Flu", "East", 2021, 4));
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let err = parse_csv("Disease,Region,Year\nFlu,North,2019\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Cases")));
    }

    #[test]
    fn csv_negative_cases_are_malformed() {
        let err = parse_csv("Disease,Region,Year,Cases\nFlu,North,2019,-1\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 1, .. }));
    }

    #[test]
    fn csv_with_header_only_is_empty() {
        let ds = parse_csv("Disease,Region,Year,Cases\n".as_bytes()).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn parses_records_json() {
        let json = r#"[
            {"Disease": "Flu", "Region": "North", "Year": 2019, "Cases": 10},
            {"Disease": "Malaria", "Region": "West", "Year": 2022, "Cases": 0}
        ]"#;
        let ds = parse_json(json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[1], CaseRecord::new("Malaria", "West", 2022, 0));
    }

    #[test]
    fn json_missing_field_is_missing_column() {
        let json = r#"[{"Disease": "Flu", "Region": "North", "Year": 2019}]"#;
        assert!(matches!(
            parse_json(json.as_bytes()),
            Err(LoadError::MissingColumn("Cases"))
        ));
    }

    #[test]
    fn json_negative_cases_are_malformed() {
        let json = r#"[
            {"Disease": "Flu", "Region": "North", "Year": 2019, "Cases": 4},
            {"Disease": "Flu", "Region": "North", "Year": 2020, "Cases": -1}
        ]"#;
        assert!(matches!(
            parse_json(json.as_bytes()),
            Err(LoadError::Malformed { row: 2, .. })
        ));
    }

    #[test]
    fn json_that_is_not_an_array_fails() {
        assert!(matches!(
            parse_json(r#"{"Disease": "Flu"}"#.as_bytes()),
            Err(LoadError::Json(_))
        ));
    }

    #[test]
    fn loads_json_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "cases.json",
            r#"[{"Disease": "Dengue", "Region": "East", "Year": 2023, "Cases": 31}]"#,
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.records(), &[CaseRecord::new("Dengue", "East", 2023, 31)]);
    }

    fn strings(values: &[&str]) -> ArrayRef {
        Arc::new(StringArray::from(values.to_vec()))
    }

    fn ints(values: &[i64]) -> ArrayRef {
        Arc::new(Int64Array::from(values.to_vec()))
    }

    /// Write `columns` as a parquet file; an empty first column writes no row group.
    fn write_parquet(path: &Path, columns: Vec<(&str, ArrayRef)>) {
        let fields: Vec<Field> = columns
            .iter()
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let rows = columns.first().map_or(0, |(_, array)| array.len());

        let mut writer =
            ArrowWriter::try_new(File::create(path).unwrap(), schema.clone(), None).unwrap();
        if rows > 0 {
            let arrays = columns.into_iter().map(|(_, array)| array).collect();
            writer
                .write(&RecordBatch::try_new(schema, arrays).unwrap())
                .unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn parses_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.parquet");
        write_parquet(
            &path,
            vec![
                ("Disease", strings(&["Flu", "Measles"])),
                ("Region", strings(&["North", "South"])),
                ("Year", ints(&[2019, 2020])),
                ("Cases", ints(&[10, 3])),
            ],
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(
            ds.records(),
            &[
                CaseRecord::new("Flu", "North", 2019, 10),
                CaseRecord::new("Measles", "South", 2020, 3),
            ]
        );
    }

    #[test]
    fn parquet_negative_cases_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.parquet");
        write_parquet(
            &path,
            vec![
                ("Disease", strings(&["Flu"])),
                ("Region", strings(&["North"])),
                ("Year", ints(&[2019])),
                ("Cases", ints(&[-5])),
            ],
        );

        assert!(matches!(
            load_file(&path),
            Err(LoadError::Malformed { row: 1, .. })
        ));
    }

    #[test]
    fn parquet_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();

        // schema only, no row groups
        let empty = dir.path().join("empty.parquet");
        write_parquet(
            &empty,
            vec![
                ("Disease", strings(&[])),
                ("Region", strings(&[])),
                ("Year", ints(&[])),
            ],
        );
        assert!(matches!(
            load_file(&empty),
            Err(LoadError::MissingColumn("Cases"))
        ));

        let filled = dir.path().join("filled.parquet");
        write_parquet(
            &filled,
            vec![
                ("Disease", strings(&["Flu"])),
                ("Year", ints(&[2019])),
                ("Cases", ints(&[3])),
            ],
        );
        assert!(matches!(
            load_file(&filled),
            Err(LoadError::MissingColumn("Region"))
        ));
    }

    #[test]
    fn parquet_without_rows_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.parquet");
        write_parquet(
            &path,
            vec![
                ("Disease", strings(&[])),
                ("Region", strings(&[])),
                ("Year", ints(&[])),
                ("Cases", ints(&[])),
            ],
        );
        assert!(load_file(&path).unwrap().is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "cases.xlsx", CSV);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(load_file(&path), Err(LoadError::Io { .. })));
    }

    #[test]
    fn source_parsing() {
        assert_eq!(
            DataSource::parse("https://example.org/data.csv"),
            DataSource::Url("https://example.org/data.csv".to_string())
        );
        assert_eq!(
            DataSource::parse("./data/cases.csv"),
            DataSource::File(PathBuf::from("./data/cases.csv"))
        );
    }

    #[test]
    fn url_path_drops_host_and_query() {
        assert_eq!(url_path("https://example.org/a/cases.json?raw=1"), "/a/cases.json");
        assert_eq!(url_path("https://example.org"), "");
        assert_eq!(
            Format::from_path(Path::new(url_path("https://example.org"))).unwrap(),
            Format::Csv
        );
    }

    #[test]
    fn cache_returns_same_dataset_without_rereading() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "cases.csv", CSV);
        let source = DataSource::File(path.clone());

        let mut cache = DatasetCache::new();
        let first = cache.fetch(&source).unwrap();

        std::fs::remove_file(&path).unwrap();
        let second = cache.fetch(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_remember_failures() {
        let source = DataSource::parse("cases.csv");
        let mut cache = DatasetCache::new();

        let err = cache.fetch_with(&source, |_| Err(LoadError::MissingColumn("Year")));
        assert!(err.is_err());
        assert!(cache.is_empty());

        let mut calls = 0;
        let ok = cache.fetch_with(&source, |_| {
            calls += 1;
            Ok(Dataset::default())
        });
        assert!(ok.is_ok());
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }
}
