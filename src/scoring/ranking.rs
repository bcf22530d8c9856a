// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Result ranking.
//!
//! Sort order:
//! 1. **Score** - descending, higher similarity first
//! 2. **Arrival order** - equal scores keep their relative order (stable sort)
//!
//! No name or id tiebreaker: the caller decides arrival order (construction
//! order, source priority) and the ranking preserves it.

use super::ScoredCandidate;
use std::cmp::Ordering;

/// Clamp a raw metric output into `[0, 1]`. NaN counts as no similarity.
#[inline]
pub fn sanitize_score(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Compare two scores so that higher scores sort first.
#[inline]
pub fn by_score_descending(a: f32, b: f32) -> Ordering {
    b.total_cmp(&a)
}

/// Sort candidates by descending score, keeping arrival order among ties.
pub fn rank_stable<R>(candidates: &mut [ScoredCandidate<R>]) {
    candidates.sort_by(|a, b| by_score_descending(a.score, b.score));
}
