//! Single-entry cache for the computed dashboard tables.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{Mutex, MutexGuard};

use crate::aggregation::Aggregates;
use crate::fetch::CachedFile;

/// Identity of the exports the cached tables were computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheToken(Vec<(PathBuf, u64, Option<SystemTime>)>);

impl CacheToken {
    pub fn from_files(files: &[CachedFile]) -> Result<Self> {
        let entries = files
            .iter()
            .map(|file| {
                let meta = std::fs::metadata(&file.path)
                    .with_context(|| format!("failed to stat {}", file.path.display()))?;
                Ok((file.path.clone(), meta.len(), meta.modified().ok()))
            })
            .collect::<Result<_>>()?;
        Ok(Self(entries))
    }
}

struct CacheEntry {
    token: CacheToken,
    aggregates: Arc<Aggregates>,
}

/// Holds at most one computed [`Aggregates`] for the whole pipeline.
///
/// Callers hold the lock for the duration of a refresh, so concurrent
/// refreshes run one after the other.
#[derive(Default)]
pub struct AggregateCache {
    slot: Mutex<Option<CacheEntry>>,
}

pub struct CacheGuard<'a> {
    slot: MutexGuard<'a, Option<CacheEntry>>,
}

impl AggregateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self) -> CacheGuard<'_> {
        CacheGuard {
            slot: self.slot.lock().await,
        }
    }
}

impl CacheGuard<'_> {
    /// The cached tables if they were computed from the exports `token` describes.
    pub fn lookup(&self, token: &CacheToken) -> Option<Arc<Aggregates>> {
        self.slot
            .as_ref()
            .filter(|entry| entry.token == *token)
            .map(|entry| Arc::clone(&entry.aggregates))
    }

    /// Replaces the cached entry.
    pub fn store(&mut self, token: CacheToken, aggregates: Aggregates) -> Arc<Aggregates> {
        let aggregates = Arc::new(aggregates);
        *self.slot = Some(CacheEntry {
            token,
            aggregates: Arc::clone(&aggregates),
        });
        aggregates
    }
}
