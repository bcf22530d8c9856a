//! IndexRegistry lifecycle: lazy load, atomic rebuild, use as a reconciler source.

use super::common::{ids, sample_series, series, source, write_dump, FixtureSource};
use namesake::dataset::{JsonDumpProvider, StaticProvider};
use namesake::metric::series_match_metric;
use namesake::{
    ConfigurationError, DatasetUnavailable, IndexOptions, IndexRegistry, Reconciler, SearchSource, SeriesRecord,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_registry_loads_lazily_through_reconciler() {
    let registry = Arc::new(IndexRegistry::new(StaticProvider::new(sample_series()), IndexOptions::default()));
    let reconciler = Reconciler::new(series_match_metric())
        .with_source(registry.clone() as Arc<dyn SearchSource<SeriesRecord>>);

    assert!(!registry.is_loaded());
    assert_eq!(ids(&reconciler.resolve("firefly").unwrap()), [78874]);
    assert!(registry.is_loaded());
}

#[test]
fn test_rebuild_picks_up_new_dump() {
    let dump = write_dump(&[series(1, "Firefly", &[])]);
    let registry = IndexRegistry::new(JsonDumpProvider::<SeriesRecord>::new(dump.path()), IndexOptions::default());
    assert_eq!(ids(&registry.search("firefly").unwrap()), [1]);

    let refreshed = serde_json::to_string(&[series(1, "Firefly", &[]), series(2, "Firefly Lane", &[])]).unwrap();
    std::fs::write(dump.path(), refreshed).unwrap();

    // Still the old snapshot until someone rebuilds.
    assert_eq!(ids(&registry.search("firefly lane").unwrap()), [1]);
    registry.rebuild().unwrap();
    assert_eq!(ids(&registry.search("firefly lane").unwrap()), [2, 1]);
}

#[test]
fn test_failed_rebuild_keeps_previous_snapshot() {
    let healthy = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&healthy);
    let registry = IndexRegistry::new(
        move || -> Result<Vec<SeriesRecord>, DatasetUnavailable> {
            if flag.load(Ordering::SeqCst) {
                Ok(vec![series(1, "Firefly", &[])])
            } else {
                Err(DatasetUnavailable::new("mirror", "HTTP 404"))
            }
        },
        IndexOptions::default(),
    );

    let before = registry.snapshot().unwrap();
    healthy.store(false, Ordering::SeqCst);
    assert!(matches!(registry.rebuild(), Err(ConfigurationError::Dataset(_))));

    let after = registry.snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(ids(&registry.search("firefly").unwrap()), [1]);
}

#[test]
fn test_empty_rebuild_empties_every_query() {
    let registry = IndexRegistry::new(StaticProvider::new(sample_series()), IndexOptions::default());
    assert!(!registry.search("lost").unwrap().is_empty());

    registry.replace(Vec::new()).unwrap();
    for query in ["lost", "firefly", "buffy", "a"] {
        assert!(registry.search(query).unwrap().is_empty(), "query {}", query);
    }
}

#[test]
fn test_concurrent_first_use_loads_once() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let registry = IndexRegistry::new(
        move || -> Result<Vec<SeriesRecord>, DatasetUnavailable> {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(sample_series())
        },
        IndexOptions::default(),
    );

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| registry.snapshot().unwrap());
        }
    });
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_queries_during_rebuild_see_whole_snapshots() {
    let registry = IndexRegistry::new(StaticProvider::new(vec![series(1, "Firefly", &[])]), IndexOptions::default());
    registry.snapshot().unwrap();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..20u32 {
                let records: Vec<SeriesRecord> =
                    (0..50).map(|j| series(i * 100 + j, &format!("Firefly {}", j), &[])).collect();
                registry.replace(records).unwrap();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..20 {
                    let snapshot = registry.snapshot().unwrap();
                    let results = snapshot.search("firefly").unwrap();
                    // Every snapshot holds either the original single record or 50 renamed ones.
                    assert!(snapshot.len() == 1 || snapshot.len() == 50);
                    assert!(!results.is_empty());
                }
            });
        }
    });
}

#[test]
fn test_unavailable_registry_does_not_sink_reconciliation() {
    let registry: IndexRegistry<SeriesRecord> = IndexRegistry::new(
        || -> Result<Vec<SeriesRecord>, DatasetUnavailable> { Err(DatasetUnavailable::new("series.json", "missing")) },
        IndexOptions::default(),
    )
    .named("tvdb-dump");

    let resolved = Reconciler::new(series_match_metric())
        .with_source(source(FixtureSource::answering("remote", vec![series(1, "Firefly", &[])])))
        .with_source(source(registry))
        .resolve("firefly")
        .unwrap();
    assert_eq!(ids(&resolved), [1]);
}
