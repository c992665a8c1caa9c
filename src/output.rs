//! Output formatting and persistence for the dashboard tables.
//!
//! Supports summary logging, JSON serialization, and CSV export.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::aggregation::{AggregateTable, Aggregates};
use csv::WriterBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Logs the tables using Rust's debug pretty-print format.
pub fn print_pretty(aggregates: &Aggregates) {
    debug!("{:#?}", aggregates);
}

/// Logs one line per table with its bucket range.
pub fn print_summary(aggregates: &Aggregates) {
    for (name, table) in aggregates.tables() {
        let labels = table.labels();
        info!(
            table = name,
            buckets = labels.len(),
            first = labels.first().map(String::as_str).unwrap_or("-"),
            last = labels.last().map(String::as_str).unwrap_or("-"),
            "Aggregate table"
        );
    }
}

/// Serializes the tables as pretty-printed JSON.
pub fn to_json(aggregates: &Aggregates) -> Result<String> {
    Ok(serde_json::to_string_pretty(aggregates)?)
}

/// Writes a table as CSV: a `bucket` column, then one column per export.
///
/// Overwrites `path` if it exists.
pub fn write_table_csv(path: &Path, table: &AggregateTable) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(file);

    let mut header = vec!["bucket".to_string()];
    header.extend(table.columns.iter().map(|id| id.to_string()));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.bucket.label()];
        record.extend(row.counts.iter().map(usize::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = table.rows.len(), "Table written");
    Ok(())
}

/// Writes the four tables as `<name>.csv` under `dir`, returning the paths.
pub fn export_tables(dir: &Path, aggregates: &Aggregates) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let mut written = Vec::new();
    for (name, table) in aggregates.tables() {
        let path = dir.join(format!("{name}.csv"));
        write_table_csv(&path, table)?;
        written.push(path);
    }
    Ok(written)
}
