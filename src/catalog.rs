//! The fixed set of data.gouv.fr catalog exports shown on the dashboard.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the five catalog exports.
///
/// The declaration order is the column order of every aggregate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetId {
    Datasets,
    Resources,
    Reuses,
    Discussions,
    Organisations,
}

impl DatasetId {
    pub const ALL: [DatasetId; 5] = [
        DatasetId::Datasets,
        DatasetId::Resources,
        DatasetId::Reuses,
        DatasetId::Discussions,
        DatasetId::Organisations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetId::Datasets => "datasets",
            DatasetId::Resources => "resources",
            DatasetId::Reuses => "reuses",
            DatasetId::Discussions => "discussions",
            DatasetId::Organisations => "organisations",
        }
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        DatasetId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| anyhow!("unknown dataset identifier '{s}'"))
    }
}

/// Drops rows whose `column` value contains `needle`.
///
/// Rows where the column is empty are never dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub needle: String,
}

impl RowFilter {
    pub fn new(column: &str, needle: &str) -> Self {
        Self {
            column: column.to_string(),
            needle: needle.to_string(),
        }
    }

    /// Returns `true` if a row holding `value` in the filter column must be excluded.
    pub fn excludes(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| v.contains(&self.needle))
    }
}

/// Where a catalog export lives and how its rows are read and filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    pub id: DatasetId,
    pub url: String,
    pub id_column: String,
    pub created_column: String,
    pub modified_column: String,
    /// Applied only when building the "hors geo.data.gouv.fr" tables.
    pub geo_filter: Option<RowFilter>,
}

impl DatasetSource {
    pub fn new(id: DatasetId, url: &str, created_column: &str, modified_column: &str) -> Self {
        Self {
            id,
            url: url.to_string(),
            id_column: "id".to_string(),
            created_column: created_column.to_string(),
            modified_column: modified_column.to_string(),
            geo_filter: None,
        }
    }

    pub fn with_geo_filter(mut self, filter: RowFilter) -> Self {
        self.geo_filter = Some(filter);
        self
    }

    /// Columns that must be present in the export header.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.id_column.as_str(),
            self.created_column.as_str(),
            self.modified_column.as_str(),
        ];
        if let Some(filter) = &self.geo_filter {
            columns.push(filter.column.as_str());
        }
        columns
    }
}

/// The five exports in column order.
pub fn default_catalog() -> Vec<DatasetSource> {
    vec![
        DatasetSource::new(
            DatasetId::Datasets,
            "https://www.data.gouv.fr/fr/datasets/r/f868cca6-8da1-4369-a78d-47463f19a9a3",
            "created_at",
            "last_modified",
        )
        .with_geo_filter(RowFilter::new("description", "geo.data.gouv.fr")),
        DatasetSource::new(
            DatasetId::Resources,
            "https://www.data.gouv.fr/fr/datasets/r/4babf5f2-6a9c-45b5-9144-ca5eae6a7a6d",
            "created_at",
            "modified",
        )
        .with_geo_filter(RowFilter::new("url", "files.geo.data.gouv.fr")),
        DatasetSource::new(
            DatasetId::Reuses,
            "https://www.data.gouv.fr/fr/datasets/r/970aafa0-3778-4d8b-b9d1-de937525e379",
            "created_at",
            "last_modified",
        ),
        DatasetSource::new(
            DatasetId::Discussions,
            "https://www.data.gouv.fr/fr/datasets/r/d77705e1-4ecd-461c-8c24-662d47c4c2f9",
            "created",
            "closed",
        ),
        DatasetSource::new(
            DatasetId::Organisations,
            "https://www.data.gouv.fr/fr/datasets/r/b7bbfedc-2448-4135-a6c7-104548d396e7",
            "created_at",
            "last_modified",
        ),
    ]
}
