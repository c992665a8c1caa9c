//! Runtime settings read from the environment.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::catalog::{DatasetId, DatasetSource, default_catalog};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BIND: &str = "127.0.0.1:8050";

/// Replacement download URLs for some catalog exports.
///
/// Stored as a plain JSON object on disk:
/// ```json
/// {
///   "datasets": "https://mirror.example.org/export-dataset.csv",
///   "reuses": "https://mirror.example.org/export-reuse.csv"
/// }
/// ```
#[derive(Debug, Default)]
pub struct SourceOverrides {
    entries: HashMap<DatasetId, String>,
}

impl SourceOverrides {
    /// Loads the overrides from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read source overrides '{path}'"))?;
        Self::parse(&content).with_context(|| format!("invalid source overrides '{path}'"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(content)?;
        let entries = raw
            .into_iter()
            .map(|(id, url)| Ok((id.parse::<DatasetId>()?, url)))
            .collect::<Result<_>>()?;
        Ok(Self { entries })
    }

    pub fn get(&self, id: DatasetId) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Returns `catalog` with the overridden URLs swapped in.
    pub fn apply(&self, catalog: Vec<DatasetSource>) -> Vec<DatasetSource> {
        catalog
            .into_iter()
            .map(|mut source| {
                if let Some(url) = self.get(source.id) {
                    source.url = url.to_string();
                }
                source
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub bind: String,
    /// Recompute on every refresh instead of reusing the cached tables.
    pub debug: bool,
    pub catalog: Vec<DatasetSource>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("DASHBOARD_DATA_DIR")
            .unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let bind = std::env::var("DASHBOARD_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let debug = std::env::var("DASHBOARD_DEBUG")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let overrides = match std::env::var("DASHBOARD_SOURCES") {
            Ok(path) => SourceOverrides::load(&path)?,
            Err(_) => SourceOverrides::default(),
        };

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            bind,
            debug,
            catalog: overrides.apply(default_catalog()),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
