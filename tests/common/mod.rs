#![allow(dead_code)]

use async_trait::async_trait;
use catalog_dashboard::catalog::{DatasetSource, default_catalog};
use catalog_dashboard::fetch::HttpClient;
use chrono::{Datelike, TimeDelta, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const HEADER: &str = "id;description;url;created_at;created;last_modified;modified;closed\n";

#[derive(Default)]
struct Inner {
    redirects: Mutex<HashMap<String, String>>,
    bodies: Mutex<HashMap<String, String>>,
    gets: AtomicUsize,
    heads: AtomicUsize,
}

/// Serves catalog redirects and export bodies from memory.
#[derive(Clone, Default)]
pub struct ScriptedClient(Arc<Inner>);

impl ScriptedClient {
    /// Points `url` at a new export `file` with the given CSV body.
    pub fn publish(&self, url: &str, file: &str, body: &str) {
        let location = format!("https://static.example.org/exports/{file}");
        self.0
            .redirects
            .lock()
            .unwrap()
            .insert(url.to_string(), location.clone());
        self.0
            .bodies
            .lock()
            .unwrap()
            .insert(location, body.to_string());
    }

    /// Serves `body` directly at `url`, without a redirect.
    pub fn publish_direct(&self, url: &str, body: &str) {
        self.0
            .bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.to_string());
    }

    pub fn gets(&self) -> usize {
        self.0.gets.load(Ordering::SeqCst)
    }

    pub fn heads(&self) -> usize {
        self.0.heads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        let builder = axum::http::Response::builder();

        let resp = if req.method() == reqwest::Method::HEAD {
            self.0.heads.fetch_add(1, Ordering::SeqCst);
            match self.0.redirects.lock().unwrap().get(&url) {
                Some(location) => builder.status(302).header("location", location.as_str()),
                None if self.0.bodies.lock().unwrap().contains_key(&url) => builder.status(200),
                None => builder.status(404),
            }
            .body(String::new())
        } else {
            self.0.gets.fetch_add(1, Ordering::SeqCst);
            match self.0.bodies.lock().unwrap().get(&url) {
                Some(body) => builder.status(200).body(body.clone()),
                None => builder.status(404).body(String::new()),
            }
        };

        Ok(reqwest::Response::from(resp.unwrap()))
    }
}

/// Fresh, empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn row(id: &str, description: &str, url: &str, created: &str) -> String {
    format!("{id};{description};{url};{created};{created};;;\n")
}

/// An export with rows in 2022, 2023 and ten days ago.
///
/// The `datasets` export also has a 2021 row and a geo row in 2023.
pub fn export_body(source: &DatasetSource) -> String {
    let recent = (Utc::now() - TimeDelta::days(10)).format("%Y-%m-%dT%H:%M:%S");
    let prefix = source.id.as_str();

    let mut body = String::from(HEADER);
    body.push_str(&row(&format!("{prefix}-1"), "", "", "2022-04-01T09:00:00"));
    body.push_str(&row(&format!("{prefix}-2"), "", "", "2023-01-15"));
    body.push_str(&row(&format!("{prefix}-3"), "", "", "2023-06-20"));
    body.push_str(&row(&format!("{prefix}-4"), "", "", &recent.to_string()));

    if source.id.as_str() == "datasets" {
        body.push_str(&row("datasets-5", "", "", "2021-12-31"));
        body.push_str(&row(
            "datasets-6",
            "moissonné depuis geo.data.gouv.fr",
            "",
            "2023-09-09",
        ));
    }
    body
}

pub fn recent_year() -> i32 {
    (Utc::now() - TimeDelta::days(10)).year()
}

/// A client serving every default catalog export, plus that catalog.
pub fn published_catalog() -> (ScriptedClient, Vec<DatasetSource>) {
    let client = ScriptedClient::default();
    let catalog = default_catalog();
    for source in &catalog {
        client.publish(
            &source.url,
            &format!("export-{}-v1.csv", source.id),
            &export_body(source),
        );
    }
    (client, catalog)
}
