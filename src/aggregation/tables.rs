use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::aggregation::bucket::{Granularity, Window};
use crate::aggregation::counts::{count_by_bucket, inner_join};
use crate::aggregation::types::{AggregateTable, Aggregates, View};
use crate::catalog::DatasetId;
use crate::loader::LoadedDataset;

/// Counts every dataset and inner-joins the results, columns in `datasets` order.
pub fn aggregate_table(
    datasets: &[LoadedDataset],
    granularity: Granularity,
    window: Option<Window>,
    view: View,
) -> Result<AggregateTable> {
    let mut columns = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let counts = count_by_bucket(dataset, granularity, window, view)?;
        debug!(
            dataset = %dataset.source.id,
            ?granularity,
            ?view,
            buckets = counts.len(),
            "Counted export"
        );
        columns.push((dataset.source.id, counts));
    }

    Ok(inner_join(granularity, view, columns))
}

/// Builds the yearly and trailing-twelve-months tables, with and without geo rows.
///
/// `datasets` must hold the five exports in [`DatasetId::ALL`] order.
#[tracing::instrument(skip(datasets), fields(datasets = datasets.len()))]
pub fn aggregate_all(datasets: &[LoadedDataset], now: NaiveDateTime) -> Result<Aggregates> {
    let ids: Vec<DatasetId> = datasets.iter().map(|d| d.source.id).collect();
    if ids != DatasetId::ALL {
        bail!("expected exports {:?}, got {:?}", DatasetId::ALL, ids);
    }

    let window = Window::trailing_year(now);

    let aggregates = Aggregates {
        generated_at: now.and_utc(),
        yearly: aggregate_table(datasets, Granularity::Year, None, View::All)?,
        monthly: aggregate_table(datasets, Granularity::Month, Some(window), View::All)?,
        yearly_no_geo: aggregate_table(datasets, Granularity::Year, None, View::NoGeo)?,
        monthly_no_geo: aggregate_table(datasets, Granularity::Month, Some(window), View::NoGeo)?,
    };

    info!(
        years = aggregates.yearly.rows.len(),
        months = aggregates.monthly.rows.len(),
        since = %window.start,
        "Aggregates computed"
    );

    Ok(aggregates)
}
