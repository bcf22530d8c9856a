//! Subtitle titles: movies and series in one index, scored with the averaged metric.

use super::common::{ids, movie, show, source, write_dump, FixtureSource};
use namesake::dataset::{DatasetProvider, JsonDumpProvider};
use namesake::metric::subtitle_match_metric;
use namesake::{IndexOptions, LocalSearchIndex, MediaKind, Reconciler, SubtitleRecord};

fn subtitle_index(records: Vec<SubtitleRecord>) -> LocalSearchIndex<SubtitleRecord> {
    LocalSearchIndex::from_entities(records, IndexOptions::default())
        .unwrap()
        .with_metric(subtitle_match_metric())
}

fn catalog() -> Vec<SubtitleRecord> {
    vec![
        movie(113277, "Heat", 1995),
        movie(133093, "The Matrix", 1999),
        show(303461, "Firefly", &["Serenity"]),
        show(106179, "The X-Files", &["X Files"]),
    ]
}

#[test]
fn test_query_with_release_year_finds_movie() {
    let index = subtitle_index(catalog());
    assert_eq!(ids(&index.search("Heat 1995").unwrap()), [113277]);
    assert_eq!(ids(&index.search("The Matrix (1999)").unwrap()), [133093]);
}

#[test]
fn test_series_alias_finds_show() {
    let index = subtitle_index(catalog());
    let results = index.search("serenity").unwrap();
    assert_eq!(ids(&results), [303461]);
    assert_eq!(results[0].kind, MediaKind::Series);
}

#[test]
fn test_dump_loads_mixed_kinds() {
    let dump = write_dump(&catalog());
    let records = JsonDumpProvider::<SubtitleRecord>::new(dump.path()).load().unwrap();
    assert_eq!(records, catalog());

    let index = subtitle_index(records);
    assert_eq!(ids(&index.search("x files").unwrap()), [106179]);
}

#[test]
fn test_subtitle_sources_merge_by_imdb_id() {
    let resolved = Reconciler::new(subtitle_match_metric())
        .with_source(source(FixtureSource::answering("opensubtitles", vec![movie(113277, "Heat", 1995)])))
        .with_source(source(subtitle_index(vec![movie(113277, "Heat", 1995).with_alias_names(["Heat (1995)"])])))
        .resolve("heat")
        .unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].year, Some(1995));
    assert_eq!(resolved[0].alias_names, ["Heat (1995)"]);
}
