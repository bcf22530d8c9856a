// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Character q-gram distance.
//!
//! Both strings are padded with `q - 1` sentinels on each side and cut into
//! overlapping q-character shingles. The distance is the L1 difference between
//! the two shingle multisets, scaled by the total shingle count:
//!
//! ```text
//! similarity = (|A| + |B| - Σ |count_A(g) - count_B(g)|) / (|A| + |B|)
//! ```
//!
//! Padding makes the first and last characters count as much as the middle
//! ones, so a typo at the end ("firefli") still scores well against "firefly".

use super::SimilarityMetric;
use crate::error::ConfigurationError;
use std::collections::HashMap;

const PAD: char = '#';

/// Q-gram distance metric. Defaults to trigrams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QGramMetric {
    q: usize,
}

impl QGramMetric {
    pub fn new(q: usize) -> Result<Self, ConfigurationError> {
        if q == 0 {
            return Err(ConfigurationError::ZeroGramSize);
        }
        Ok(Self { q })
    }

    pub fn q(&self) -> usize {
        self.q
    }
}

impl Default for QGramMetric {
    fn default() -> Self {
        Self { q: 3 }
    }
}

impl SimilarityMetric for QGramMetric {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        qgram_similarity(a, b, self.q)
    }

    fn name(&self) -> &'static str {
        "qgram"
    }
}

/// Q-gram similarity of two strings. `q` must be at least 1.
pub fn qgram_similarity(a: &str, b: &str, q: usize) -> f32 {
    let q = q.max(1);
    let a = padded(a, q);
    let b = padded(b, q);

    let mut counts: HashMap<&[char], (u32, u32)> = HashMap::new();
    let mut total = 0u32;
    for gram in a.windows(q) {
        counts.entry(gram).or_default().0 += 1;
        total += 1;
    }
    for gram in b.windows(q) {
        counts.entry(gram).or_default().1 += 1;
        total += 1;
    }

    if total == 0 {
        return 1.0;
    }

    let distance: u32 = counts.values().map(|(x, y)| x.abs_diff(*y)).sum();
    (total - distance) as f32 / total as f32
}

fn padded(s: &str, q: usize) -> Vec<char> {
    let pad = q - 1;
    let mut chars = Vec::with_capacity(s.len() + 2 * pad);
    chars.extend(std::iter::repeat(PAD).take(pad));
    chars.extend(s.chars());
    chars.extend(std::iter::repeat(PAD).take(pad));
    chars
}
