use anyhow::{Result, anyhow};
use std::collections::BTreeMap;

use crate::aggregation::bucket::{Bucket, Granularity, Window};
use crate::aggregation::types::{AggregateRow, AggregateTable, View};
use crate::catalog::DatasetId;
use crate::loader::LoadedDataset;

pub type BucketCounts = BTreeMap<Bucket, usize>;

/// Counts the rows of one export per creation bucket.
///
/// Rows without a creation date or an id are not counted. With `window`, rows
/// created outside it are skipped. In the [`View::NoGeo`] view, rows matched
/// by the export's geo filter are skipped too.
pub fn count_by_bucket(
    dataset: &LoadedDataset,
    granularity: Granularity,
    window: Option<Window>,
    view: View,
) -> Result<BucketCounts> {
    let table = &dataset.table;
    let source = &dataset.source;

    let id_idx = table
        .column_index(&source.id_column)
        .ok_or_else(|| anyhow!("{} export has no '{}' column", source.id, source.id_column))?;

    let filter = match (view, &source.geo_filter) {
        (View::NoGeo, Some(filter)) => {
            let idx = table.column_index(&filter.column).ok_or_else(|| {
                anyhow!("{} export has no '{}' column", source.id, filter.column)
            })?;
            Some((idx, filter))
        }
        _ => None,
    };

    let mut counts = BucketCounts::new();

    for row in table.rows() {
        let Some(created) = row.created else {
            continue;
        };
        if window.is_some_and(|w| !w.contains(&created)) {
            continue;
        }
        if let Some((idx, filter)) = filter {
            if filter.excludes(row.value_at(idx)) {
                continue;
            }
        }
        if row.value_at(id_idx).is_none() {
            continue;
        }

        *counts.entry(Bucket::of(&created, granularity)).or_default() += 1;
    }

    Ok(counts)
}

/// Joins per-export counts on their buckets, keeping only buckets every
/// export has.
pub fn inner_join(
    granularity: Granularity,
    view: View,
    columns: Vec<(DatasetId, BucketCounts)>,
) -> AggregateTable {
    let ids: Vec<DatasetId> = columns.iter().map(|(id, _)| *id).collect();

    let rows = match columns.split_first() {
        None => Vec::new(),
        Some(((_, first), rest)) => first
            .keys()
            .filter_map(|bucket| {
                let mut counts = Vec::with_capacity(columns.len());
                counts.push(first[bucket]);
                for (_, other) in rest {
                    counts.push(*other.get(bucket)?);
                }
                Some(AggregateRow {
                    bucket: *bucket,
                    counts,
                })
            })
            .collect(),
    };

    AggregateTable {
        granularity,
        view,
        columns: ids,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(i32, usize)]) -> BucketCounts {
        entries
            .iter()
            .map(|(year, n)| (Bucket::year(*year), *n))
            .collect()
    }

    #[test]
    fn test_inner_join_keeps_shared_buckets_in_order() {
        let table = inner_join(
            Granularity::Year,
            View::All,
            vec![
                (DatasetId::Datasets, counts(&[(2021, 3), (2022, 1), (2023, 2)])),
                (DatasetId::Reuses, counts(&[(2023, 5), (2021, 4)])),
            ],
        );

        assert_eq!(table.columns, vec![DatasetId::Datasets, DatasetId::Reuses]);
        assert_eq!(table.labels(), vec!["2021", "2023"]);
        assert_eq!(table.series(DatasetId::Reuses), Some(vec![4, 5]));
    }

    #[test]
    fn test_inner_join_disjoint_is_empty() {
        let table = inner_join(
            Granularity::Year,
            View::All,
            vec![
                (DatasetId::Datasets, counts(&[(2020, 1)])),
                (DatasetId::Resources, counts(&[(2021, 1)])),
            ],
        );
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_inner_join_no_columns() {
        let table = inner_join(Granularity::Month, View::NoGeo, Vec::new());
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
