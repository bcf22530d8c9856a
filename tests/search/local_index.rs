//! LocalSearchIndex behavior: matching rules, normalization, failures, concurrency.

use super::common::{ids, index_of, sample_index, sample_series, series};
use namesake::{
    normalize, IndexOptions, LocalSearchIndex, SearchError, SeriesRecord, SimilarityMetric, WorkerPool,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_typo_finds_firefly() {
    let index = index_of(vec![series(1, "Firefly", &[])]);
    assert_eq!(ids(&index.search("firefli").unwrap()), [1]);
}

#[test]
fn test_unrelated_query_finds_nothing() {
    let index = index_of(vec![series(1, "Firefly", &[])]);
    assert!(index.search("Star Trek").unwrap().is_empty());
}

#[test]
fn test_alias_is_searchable() {
    let index = sample_index();
    assert_eq!(ids(&index.search("BtVS").unwrap()), [70327]);
    assert_eq!(ids(&index.search("himym").unwrap()), [75760]);
}

#[test]
fn test_fragment_of_long_title_is_found() {
    let index = sample_index();
    let found = ids(&index.search("next generation").unwrap());
    assert!(found.contains(&71470), "got {:?}", found);
}

#[test]
fn test_punctuation_and_case_do_not_matter() {
    let index = sample_index();
    assert!(ids(&index.search("GREYS ANATOMY").unwrap()).contains(&73762));
    assert!(ids(&index.search("star-trek: the next generation").unwrap()).contains(&71470));
}

#[test]
fn test_blank_queries_return_nothing() {
    let index = sample_index();
    for query in ["", "   ", "?!", "'"] {
        assert!(index.search(query).unwrap().is_empty(), "query {:?}", query);
    }
}

#[test]
fn test_empty_index_matches_nothing() {
    let index = index_of(Vec::new());
    assert!(index.is_empty());
    assert!(index.search("firefly").unwrap().is_empty());
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_strict_threshold_drops_loose_matches() {
    let records = vec![series(1, "Firefly", &[])];
    let loose = LocalSearchIndex::from_entities(records.clone(), IndexOptions::default()).unwrap();
    let strict = LocalSearchIndex::from_entities(records, IndexOptions::strict()).unwrap();

    // "firefli" vs "firefly" scores 2/3: above 0.5, below 0.7
    assert_eq!(loose.search("firefli").unwrap().len(), 1);
    assert!(strict.search("firefli").unwrap().is_empty());
}

#[test]
fn test_substring_match_ignores_threshold() {
    let index =
        LocalSearchIndex::from_entities(vec![series(1, "Firefly", &[])], IndexOptions::default().with_min_similarity(1.0))
            .unwrap();
    assert_eq!(index.search("fire").unwrap().len(), 1);
}

#[test]
fn test_result_limit_option() {
    let records: Vec<SeriesRecord> = (0..10).map(|i| series(i, &format!("Doctor Who {}", i), &[])).collect();
    let index = LocalSearchIndex::from_entities(records, IndexOptions::default().with_result_limit(3)).unwrap();
    assert_eq!(index.search("doctor who").unwrap().len(), 3);
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_panicking_metric_only_drops_that_record() {
    let metric = |a: &str, b: &str| -> f32 {
        if b == "lost" {
            panic!("metric cannot score {:?}", b);
        }
        namesake::metric::qgram_similarity(a, b, 3)
    };
    let index = sample_index().with_metric(Arc::new(metric));

    let results = index.search("lost").unwrap();
    assert!(!ids(&results).contains(&73739));

    let firefly = index.search("firefly").unwrap();
    assert_eq!(ids(&firefly), [78874]);
}

#[test]
fn test_deadline_in_the_past_fails_query() {
    let index = sample_index();
    let err = index.search_until("firefly", Instant::now()).unwrap_err();
    assert!(matches!(err, SearchError::DeadlineExceeded { .. }));
}

#[test]
fn test_generous_deadline_succeeds() {
    let index = sample_index();
    let results = index.search_until("firefly", Instant::now() + Duration::from_secs(30)).unwrap();
    assert_eq!(ids(&results), [78874]);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_dedicated_pool_gives_same_results() {
    let shared = sample_index();
    let dedicated = sample_index().with_pool(WorkerPool::new(2).unwrap());
    for query in ["firefly", "buffy", "star trek", "grey"] {
        assert_eq!(shared.search(query).unwrap(), dedicated.search(query).unwrap(), "query {}", query);
    }
}

#[test]
fn test_concurrent_queries_share_one_index() {
    let index = sample_index();
    let expected = index.search("buffy").unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = index.clone();
                scope.spawn(move || index.search("buffy").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_fields_are_frozen_normalized_names() {
    let index = index_of(sample_series());
    for entry in index.entries() {
        for field in entry.fields() {
            assert_eq!(field, &normalize(field));
            assert!(!field.is_empty());
        }
    }
    assert_eq!(index.records().count(), sample_series().len());
}

#[test]
fn test_custom_metric_name_is_reported() {
    struct Exact;
    impl SimilarityMetric for Exact {
        fn similarity(&self, a: &str, b: &str) -> f32 {
            if a == b {
                1.0
            } else {
                0.0
            }
        }
        fn name(&self) -> &'static str {
            "exact"
        }
    }

    let index = sample_index().with_metric(Arc::new(Exact));
    assert_eq!(index.metric().name(), "exact");
    assert!(index.search("firefli").unwrap().is_empty());
    assert_eq!(ids(&index.search("firefly").unwrap()), [78874]);
}
