//! Download of the catalog exports into the local data directory.
//!
//! Each catalog link is a redirect to a dated export file. The redirect
//! target names the local file, so a new export upstream shows up as a new
//! file name and triggers a download, while an existing file is reused as is.
//! A source answering HEAD with a plain success is taken as the file itself.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::header::LOCATION;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::DatasetSource;

/// A catalog export present in the data directory.
#[derive(Debug, Clone)]
pub struct CachedFile {
    pub source: DatasetSource,
    pub path: PathBuf,
    /// `true` if the file was written by this fetch.
    pub downloaded: bool,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub files: Vec<CachedFile>,
    /// At least one export was downloaded.
    pub changed: bool,
}

/// GETs `url` and returns the response body.
///
/// # Errors
///
/// Fails on transport errors and non-success statuses.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("GET {url} failed"))?
        .error_for_status()
        .with_context(|| format!("GET {url} returned an error status"))?;
    Ok(resp.bytes().await?.to_vec())
}

/// Sends a HEAD request to `url` and returns the target of its redirect.
///
/// A relative `Location` is resolved against `url`. A success response
/// without `Location` means `url` already points at the export and is
/// returned as is.
pub async fn resolve_location<C: HttpClient>(client: &C, url: &str) -> Result<Url> {
    let base: Url = url.parse().with_context(|| format!("invalid source url '{url}'"))?;
    let req = reqwest::Request::new(reqwest::Method::HEAD, base.clone());

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("HEAD {url} failed"))?;

    let status = resp.status();
    if status.is_success() && !resp.headers().contains_key(LOCATION) {
        return Ok(base);
    }

    let location = resp
        .headers()
        .get(LOCATION)
        .ok_or_else(|| anyhow!("HEAD {url} returned status {status} without a Location header"))?
        .to_str()
        .with_context(|| format!("HEAD {url} returned a non-ASCII Location header"))?;

    base.join(location)
        .with_context(|| format!("HEAD {url} returned an invalid Location '{location}'"))
}

/// Last path segment of a resolved export location.
pub fn file_name_from_location(location: &Url) -> Result<String> {
    location
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no file name in location '{location}'"))
}

/// Makes sure every export of `sources` is present under `data_dir`.
///
/// Files already present are left untouched. Any failure aborts the whole run.
#[tracing::instrument(
    skip(client, sources),
    fields(data_dir = %data_dir.display(), sources = sources.len())
)]
pub async fn sync_sources<C: HttpClient>(
    client: &C,
    sources: &[DatasetSource],
    data_dir: &Path,
) -> Result<FetchOutcome> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let mut files = Vec::with_capacity(sources.len());

    for source in sources {
        let location = resolve_location(client, &source.url).await?;
        let file_name = file_name_from_location(&location)?;
        let path = data_dir.join(&file_name);

        let downloaded = if path.exists() {
            debug!(dataset = %source.id, file = %file_name, "Export already cached");
            false
        } else {
            let bytes = fetch_bytes(client, location.as_str()).await?;
            write_atomically(&path, &bytes)?;
            info!(
                dataset = %source.id,
                file = %file_name,
                bytes = bytes.len(),
                "Downloaded export"
            );
            true
        };

        files.push(CachedFile {
            source: source.clone(),
            path,
            downloaded,
        });
    }

    let changed = files.iter().any(|f| f.downloaded);
    info!(changed, "Exports synchronized");

    Ok(FetchOutcome { files, changed })
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    std::fs::write(&partial, bytes)
        .with_context(|| format!("failed to write {}", partial.display()))?;
    std::fs::rename(&partial, path)
        .with_context(|| format!("failed to move download into {}", path.display()))?;
    Ok(())
}
