//! Data types produced by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregation::bucket::{Bucket, Granularity};
use crate::catalog::DatasetId;

/// Which rows of each export are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    All,
    /// Rows matched by the export's geo filter are left out.
    NoGeo,
}

/// Counts for one bucket, in the table's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub bucket: Bucket,
    pub counts: Vec<usize>,
}

/// Per-bucket record counts with one column per export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateTable {
    pub granularity: Granularity,
    pub view: View,
    pub columns: Vec<DatasetId>,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.rows.iter().map(|r| r.bucket)
    }

    pub fn labels(&self) -> Vec<String> {
        self.buckets().map(|b| b.label()).collect()
    }

    /// The counts of one export, aligned with [`AggregateTable::buckets`].
    pub fn series(&self, id: DatasetId) -> Option<Vec<usize>> {
        let col = self.columns.iter().position(|c| *c == id)?;
        Some(self.rows.iter().map(|r| r.counts[col]).collect())
    }

    pub fn count(&self, bucket: Bucket, id: DatasetId) -> Option<usize> {
        let col = self.columns.iter().position(|c| *c == id)?;
        self.rows
            .iter()
            .find(|r| r.bucket == bucket)
            .map(|r| r.counts[col])
    }
}

/// The four tables shown on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct Aggregates {
    pub generated_at: DateTime<Utc>,
    pub yearly: AggregateTable,
    pub monthly: AggregateTable,
    pub yearly_no_geo: AggregateTable,
    pub monthly_no_geo: AggregateTable,
}

impl Aggregates {
    pub fn tables(&self) -> [(&'static str, &AggregateTable); 4] {
        [
            ("yearly", &self.yearly),
            ("monthly", &self.monthly),
            ("yearly_no_geo", &self.yearly_no_geo),
            ("monthly_no_geo", &self.monthly_no_geo),
        ]
    }
}
