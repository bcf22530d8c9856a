//! Shared test utilities and fixtures.

#![allow(dead_code)]

use namesake::{Entity, IndexOptions, LocalSearchIndex, SearchSource, SeriesRecord};
use std::io::Write;
use std::sync::Arc;

// Re-export canonical test utilities from namesake::testing
pub use namesake::testing::{movie, sample_series, series, show, Behavior, FixtureSource};

/// Index over `records` with default options.
pub fn index_of(records: Vec<SeriesRecord>) -> LocalSearchIndex<SeriesRecord> {
    LocalSearchIndex::from_entities(records, IndexOptions::default()).expect("valid default options")
}

/// Index over the sample series dump.
pub fn sample_index() -> LocalSearchIndex<SeriesRecord> {
    index_of(sample_series()).named("sample")
}

/// Erase a source into the form the reconciler stores.
pub fn source<T, S>(source: S) -> Arc<dyn SearchSource<T>>
where
    S: SearchSource<T> + 'static,
{
    Arc::new(source)
}

/// Write `records` as a JSON dump into a temporary file.
pub fn write_dump<T: serde::Serialize>(records: &[T]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp dump");
    let json = serde_json::to_string(records).expect("serialize dump");
    file.write_all(json.as_bytes()).expect("write temp dump");
    file
}

/// Identity keys of `records`, in order.
pub fn ids<T: Entity>(records: &[T]) -> Vec<T::Id> {
    records.iter().map(Entity::identity).collect()
}

/// Assert results are sorted by non-increasing score.
pub fn assert_descending(scores: &[f32]) {
    for pair in scores.windows(2) {
        assert!(
            pair[0] >= pair[1],
            "results out of order: {} before {}",
            pair[0],
            pair[1]
        );
    }
}
