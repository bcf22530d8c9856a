// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scores and the order results come out in.
//!
//! A score is a similarity in `[0, 1]`. Results are always sorted by
//! non-increasing score; equal scores keep the order they were produced in
//! (index construction order for a local search, first-seen order for a
//! reconciliation). That tie rule is part of the contract and is tested.

pub mod ranking;

pub use ranking::{by_score_descending, rank_stable, sanitize_score};

/// A record paired with its similarity to the current query. Lives for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate<R> {
    pub record: R,
    pub score: f32,
}

impl<R> ScoredCandidate<R> {
    pub fn new(record: R, score: f32) -> Self {
        Self {
            record,
            score: sanitize_score(score),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> ScoredCandidate<U> {
        ScoredCandidate {
            record: f(self.record),
            score: self.score,
        }
    }
}
