// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for identity merging.
//!
//! Arbitrary pools of records with colliding ids and messy aliases must merge
//! into one result per identity with normalized-unique aliases that never
//! repeat the primary name.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use namesake::{merge_by_identity, normalize, Entity, SeriesRecord};
use std::collections::HashSet;

#[derive(Debug, Arbitrary)]
struct Input {
    records: Vec<(u8, String, Vec<String>)>,
}

fuzz_target!(|input: Input| {
    let pool: Vec<SeriesRecord> = input
        .records
        .into_iter()
        .take(128)
        .map(|(id, name, aliases)| SeriesRecord::new(u32::from(id % 16), name).with_alias_names(aliases))
        .collect();

    let merged = merge_by_identity(pool);

    let mut seen = HashSet::new();
    for result in &merged {
        assert!(seen.insert(result.primary().identity()), "identity merged twice");

        let primary = normalize(result.primary().name());
        let mut keys = HashSet::new();
        for alias in result.aliases() {
            let key = normalize(alias);
            assert!(!key.is_empty());
            assert_ne!(key, primary);
            assert!(keys.insert(key), "duplicate alias {:?}", alias);
        }
    }
});
