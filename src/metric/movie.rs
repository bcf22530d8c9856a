// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Movie-name similarity.
//!
//! Movie titles are often written with a release year ("Heat (1995)", "Heat 1995")
//! that the query leaves off. The year is stripped from both sides before an
//! edit-distance comparison so it neither helps nor hurts.

use super::SimilarityMetric;
use strsim::normalized_levenshtein;

/// Normalized Levenshtein similarity on year-stripped names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovieNameMetric;

impl SimilarityMetric for MovieNameMetric {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        normalized_levenshtein(strip_release_year(a), strip_release_year(b)) as f32
    }

    fn name(&self) -> &'static str {
        "movie-name"
    }
}

/// Remove a trailing release year token (1900-2099), with or without brackets.
///
/// A name that is only a year ("1917") is returned unchanged.
pub fn strip_release_year(name: &str) -> &str {
    let trimmed = name.trim_end_matches(|c: char| c == ')' || c == ']' || c.is_whitespace());
    let Some((head, tail)) = trimmed.rsplit_once(|c: char| c == ' ' || c == '(' || c == '[')
    else {
        return name;
    };

    let head = head.trim_end_matches(|c: char| c == '(' || c == '[' || c.is_whitespace());
    if is_year(tail) && !head.is_empty() {
        head
    } else {
        name
    }
}

fn is_year(token: &str) -> bool {
    token.len() == 4
        && token.bytes().all(|b| b.is_ascii_digit())
        && (token.starts_with("19") || token.starts_with("20"))
}
