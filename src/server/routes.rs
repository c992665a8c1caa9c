use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::error;

use crate::aggregation::Aggregates;
use crate::dashboard::Dashboard;
use crate::fetch::HttpClient;
use crate::server::page::render_page;

/// A failed refresh. Details are logged, the client gets a generic 500.
pub struct RefreshError(anyhow::Error);

impl From<anyhow::Error> for RefreshError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for RefreshError {
    fn into_response(self) -> Response {
        error!(error = %format!("{:#}", self.0), "Dashboard refresh failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to refresh dashboard data",
        )
            .into_response()
    }
}

pub fn router<C: HttpClient + 'static>(dashboard: Arc<Dashboard<C>>) -> Router {
    Router::new()
        .route("/", get(index::<C>))
        .route("/api/aggregates", get(aggregates::<C>))
        .route("/healthz", get(healthz))
        .with_state(dashboard)
}

async fn index<C: HttpClient + 'static>(
    State(dashboard): State<Arc<Dashboard<C>>>,
) -> Result<Html<String>, RefreshError> {
    let aggregates = dashboard.refresh().await?;
    Ok(Html(render_page(&aggregates)))
}

async fn aggregates<C: HttpClient + 'static>(
    State(dashboard): State<Arc<Dashboard<C>>>,
) -> Result<Json<Arc<Aggregates>>, RefreshError> {
    let aggregates = dashboard.refresh().await?;
    Ok(Json(aggregates))
}

async fn healthz() -> &'static str {
    "ok"
}
