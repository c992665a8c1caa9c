//! Semicolon-delimited CSV parsing for the catalog exports.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use crate::catalog::DatasetSource;
use crate::fetch::CachedFile;

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One export row with its two date columns already parsed.
#[derive(Debug, Clone)]
pub struct Record {
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    fields: StringRecord,
}

#[derive(Debug, Clone)]
pub struct RecordTable {
    headers: StringRecord,
    rows: Vec<Record>,
}

impl RecordTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Value of `column` in `row`, `None` when the column is unknown or the cell empty.
    pub fn value<'a>(&self, row: &'a Record, column: &str) -> Option<&'a str> {
        let idx = self.column_index(column)?;
        row.value_at(idx)
    }
}

impl Record {
    pub fn value_at(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub source: DatasetSource,
    pub path: PathBuf,
    pub table: RecordTable,
}

/// Parses a timestamp cell. Empty cells are `None`.
///
/// Offsets are converted to UTC; naive values are kept as written.
pub fn parse_timestamp(raw: &str) -> Result<Option<NaiveDateTime>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.naive_utc()));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date.and_time(NaiveTime::MIN)));
    }

    Err(anyhow!("unrecognized timestamp '{raw}'"))
}

/// Reads an export into a [`RecordTable`], parsing the source's date columns.
///
/// # Errors
///
/// Returns an error on malformed CSV, on a missing required column, or on a
/// date cell that is neither empty nor a recognized timestamp.
pub fn read_table<R: Read>(reader: R, source: &DatasetSource) -> Result<RecordTable> {
    let mut rdr = ReaderBuilder::new().delimiter(b';').from_reader(reader);
    let headers = rdr.headers()?.clone();

    for column in source.required_columns() {
        if !headers.iter().any(|h| h == column) {
            bail!("{} export has no '{column}' column", source.id);
        }
    }

    let position = |name: &str| headers.iter().position(|h| h == name);
    let created_idx = position(&source.created_column);
    let modified_idx = position(&source.modified_column);

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let fields = result.with_context(|| format!("malformed {} export", source.id))?;

        let parse = |idx: Option<usize>, column: &str| -> Result<Option<NaiveDateTime>> {
            let raw = idx.and_then(|i| fields.get(i)).unwrap_or("");
            parse_timestamp(raw)
                .with_context(|| format!("{} row {}: bad '{column}'", source.id, line + 1))
        };

        let created = parse(created_idx, &source.created_column)?;
        let modified = parse(modified_idx, &source.modified_column)?;

        rows.push(Record {
            created,
            modified,
            fields,
        });
    }

    Ok(RecordTable { headers, rows })
}

/// Opens a cached export and parses it.
#[tracing::instrument(skip(file), fields(dataset = %file.source.id, path = %file.path.display()))]
pub fn load_dataset(file: &CachedFile) -> Result<LoadedDataset> {
    let handle =
        File::open(&file.path).with_context(|| format!("failed to open {}", file.path.display()))?;
    let table = read_table(handle, &file.source)
        .with_context(|| format!("failed to load {}", file.path.display()))?;

    debug!(rows = table.len(), "Export loaded");

    Ok(LoadedDataset {
        source: file.source.clone(),
        path: file.path.clone(),
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DatasetId, RowFilter};
    use chrono::Timelike;

    fn datasets_source() -> DatasetSource {
        DatasetSource::new(DatasetId::Datasets, "http://localhost/d", "created_at", "last_modified")
            .with_geo_filter(RowFilter::new("description", "geo.data.gouv.fr"))
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let ts = parse_timestamp("2023-06-20T10:11:12.345678").unwrap().unwrap();
        assert_eq!(ts.to_string(), "2023-06-20 10:11:12.345678");

        let ts = parse_timestamp("2023-06-20 10:11:12").unwrap().unwrap();
        assert_eq!(ts.hour(), 10);

        let ts = parse_timestamp("2023-06-20").unwrap().unwrap();
        assert_eq!(ts.to_string(), "2023-06-20 00:00:00");

        let ts = parse_timestamp("2023-06-20T23:30:00+02:00").unwrap().unwrap();
        assert_eq!(ts.to_string(), "2023-06-20 21:30:00");
    }

    #[test]
    fn test_parse_timestamp_empty_and_invalid() {
        assert_eq!(parse_timestamp("").unwrap(), None);
        assert_eq!(parse_timestamp("   ").unwrap(), None);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_read_table_semicolon_delimited() {
        let csv = "id;title;description;created_at;last_modified\n\
                   a;Un, deux;voir geo.data.gouv.fr;2023-01-15T08:00:00;2023-02-01T00:00:00\n\
                   b;Trois;;2023-06-20;\n";
        let table = read_table(csv.as_bytes(), &datasets_source()).unwrap();

        assert_eq!(table.len(), 2);
        let rows = table.rows();
        assert_eq!(table.value(&rows[0], "title"), Some("Un, deux"));
        assert_eq!(table.value(&rows[1], "description"), None);
        assert!(rows[0].modified.is_some());
        assert!(rows[1].modified.is_none());
        assert_eq!(rows[1].created.unwrap().to_string(), "2023-06-20 00:00:00");
    }

    #[test]
    fn test_read_table_missing_date_column() {
        let csv = "id;description;created_at\na;;2023-01-15\n";
        let err = read_table(csv.as_bytes(), &datasets_source()).unwrap_err();
        assert!(err.to_string().contains("last_modified"));
    }

    #[test]
    fn test_read_table_missing_filter_column() {
        let csv = "id;created_at;last_modified\na;2023-01-15;\n";
        assert!(read_table(csv.as_bytes(), &datasets_source()).is_err());
    }

    #[test]
    fn test_read_table_bad_date() {
        let csv = "id;description;created_at;last_modified\na;;not a date;\n";
        assert!(read_table(csv.as_bytes(), &datasets_source()).is_err());
    }

    #[test]
    fn test_read_table_ragged_row() {
        let csv = "id;description;created_at;last_modified\na;;2023-01-15\n";
        assert!(read_table(csv.as_bytes(), &datasets_source()).is_err());
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let file = CachedFile {
            source: datasets_source(),
            path: std::env::temp_dir().join("catalog_dashboard_no_such_export.csv"),
            downloaded: false,
        };
        assert!(load_dataset(&file).is_err());
    }
}
