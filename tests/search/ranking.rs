//! Ordering guarantees: descending scores, result cap, stable ties.

use super::common::{assert_descending, ids, index_of, series, source, FixtureSource};
use namesake::index::DEFAULT_RESULT_LIMIT;
use namesake::metric::series_match_metric;
use namesake::{Reconciler, SeriesRecord};
use std::sync::Arc;

#[test]
fn test_results_capped_at_default_limit() {
    let records: Vec<SeriesRecord> = (0..100).map(|i| series(i, &format!("Law & Order {}", i), &[])).collect();
    let index = index_of(records);

    let results = index.search_scored("law order").unwrap();
    assert_eq!(results.len(), DEFAULT_RESULT_LIMIT);
    assert_descending(&results.iter().map(|c| c.score).collect::<Vec<_>>());
}

#[test]
fn test_closer_names_rank_higher() {
    let index = index_of(vec![
        series(1, "The Office (US)", &[]),
        series(2, "Office", &[]),
        series(3, "The Office", &[]),
    ]);
    let results = index.search_scored("the office").unwrap();
    assert_eq!(results[0].record.id, 3);
    assert_descending(&results.iter().map(|c| c.score).collect::<Vec<_>>());
}

#[test]
fn test_equal_scores_keep_construction_order() {
    let index = index_of(vec![
        series(5, "Lost", &[]),
        series(3, "Lost", &[]),
        series(9, "Lost", &[]),
        series(1, "Lost", &[]),
    ]);
    assert_eq!(ids(&index.search("lost").unwrap()), [5, 3, 9, 1]);
}

#[test]
fn test_equal_scores_are_deterministic_across_runs() {
    let records: Vec<SeriesRecord> = (0..40).map(|i| series(i, "Doctor Who", &[])).collect();
    let index = index_of(records);
    let first = ids(&index.search("doctor who").unwrap());
    for _ in 0..10 {
        assert_eq!(ids(&index.search("doctor who").unwrap()), first);
    }
    assert_eq!(first, (0..20).collect::<Vec<u32>>());
}

#[test]
fn test_out_of_range_metric_scores_are_clamped() {
    let wild = |_: &str, _: &str| -> f32 { 7.5 };
    let index = index_of(vec![series(1, "Firefly", &[]), series(2, "Lost", &[])]).with_metric(Arc::new(wild));
    let results = index.search_scored("anything").unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|c| c.score == 1.0));
}

#[test]
fn test_nan_metric_scores_count_as_zero() {
    let broken = |_: &str, _: &str| -> f32 { f32::NAN };
    let index = index_of(vec![series(1, "Firefly", &[])]).with_metric(Arc::new(broken));
    assert!(index.search("serenity").unwrap().is_empty());
    let substring = index.search_scored("fire").unwrap();
    assert_eq!(substring[0].score, 0.0);
}

#[test]
fn test_reconciled_ties_keep_priority_order() {
    let reconciler = Reconciler::new(series_match_metric())
        .with_source(source(FixtureSource::answering("remote", vec![series(20, "Lost", &[])])))
        .with_source(source(FixtureSource::answering("local", vec![series(10, "Lost", &[])])));
    assert_eq!(ids(&reconciler.resolve("lost").unwrap()), [20, 10]);
}

#[test]
fn test_reconciled_results_are_reranked_against_query() {
    let reconciler = Reconciler::new(series_match_metric()).with_source(source(FixtureSource::answering(
        "remote",
        vec![
            series(2, "Firefly Lane", &[]),
            series(3, "Starfleet", &[]),
            series(1, "Firefly", &[]),
        ],
    )));
    let merged = reconciler.resolve_merged("firefly").unwrap();
    assert_eq!(merged[0].record.primary().id, 1);
    assert_eq!(merged[0].score, 1.0);
    assert_descending(&merged.iter().map(|c| c.score).collect::<Vec<_>>());
}
