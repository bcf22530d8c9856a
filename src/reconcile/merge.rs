// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Identity-keyed merging of records from several sources.
//!
//! Records with the same identity key describe one entity. The merged result
//! keeps the first record seen as its primary (the pool is ordered by source
//! priority, so the preferred source wins) and unions every record's aliases.
//!
//! Alias comparison uses normalized forms: "Buffy", "buffy" and "BUFFY!" are
//! one alias, and the first spelling seen is the one kept. An alias equal to
//! the primary name after normalization is dropped, even if a source lists the
//! name as an alias of itself.
//!
//! **Invariant**: each identity appears at most once in the output, in the order
//! its first record arrived.

use crate::types::Entity;
use crate::utils::normalize;
use std::collections::{HashMap, HashSet};

/// One logical entity assembled from one or more source records.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedResult<T> {
    primary: T,
    aliases: Vec<String>,
    contributors: usize,
    // Normalized primary name and aliases, kept so each record merges in linear time.
    primary_key: String,
    alias_keys: HashSet<String>,
}

impl<T: Entity> MergedResult<T> {
    fn start(primary: T) -> Self {
        let primary_key = normalize(primary.name());
        let own = primary.aliases().to_vec();
        let mut merged = Self {
            primary,
            aliases: Vec::new(),
            contributors: 0,
            primary_key,
            alias_keys: HashSet::new(),
        };
        merged.absorb(own);
        merged
    }

    /// Fold one contributing record's aliases into this result.
    fn absorb<I>(&mut self, incoming: I)
    where
        I: IntoIterator<Item = String>,
    {
        for alias in incoming {
            let key = normalize(&alias);
            if key.is_empty() || key == self.primary_key || !self.alias_keys.insert(key) {
                continue;
            }
            self.aliases.push(alias);
        }
        self.contributors += 1;
    }

    /// The record chosen as primary.
    pub fn primary(&self) -> &T {
        &self.primary
    }

    /// Deduplicated aliases from every contributing record, excluding the primary name.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Number of source records merged into this result.
    pub fn contributors(&self) -> usize {
        self.contributors
    }

    /// Primary name followed by the merged aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.name()).chain(self.aliases.iter().map(String::as_str))
    }

    /// The primary record carrying the merged alias list.
    pub fn into_record(self) -> T {
        self.primary.with_aliases(self.aliases)
    }
}

/// Group `pool` by identity and merge each group.
///
/// `pool` must be in priority order: the first record of each identity becomes
/// the primary.
pub fn merge_by_identity<T, I>(pool: I) -> Vec<MergedResult<T>>
where
    T: Entity,
    I: IntoIterator<Item = T>,
{
    let mut slots: HashMap<T::Id, usize> = HashMap::new();
    let mut merged: Vec<MergedResult<T>> = Vec::new();

    for record in pool {
        match slots.get(&record.identity()) {
            Some(&slot) => merged[slot].absorb(record.aliases().iter().cloned()),
            None => {
                slots.insert(record.identity(), merged.len());
                merged.push(MergedResult::start(record));
            }
        }
    }

    merged
}
