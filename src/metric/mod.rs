// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Similarity metrics: how close a query is to a name.
//!
//! Every metric maps a pair of (already normalized) strings to a score in
//! `[0, 1]`, where 1 means identical. Two policies ship with the crate:
//! a character q-gram distance for single-domain matching (series titles),
//! and an average of the series and movie metrics for records that may be
//! either (subtitles).
//!
//! Metrics are shared across worker threads as `Arc<dyn SimilarityMetric>`.
//! Any `Fn(&str, &str) -> f32` closure is a metric too.

mod movie;
mod qgram;

pub use movie::{strip_release_year, MovieNameMetric};
pub use qgram::{qgram_similarity, QGramMetric};

use crate::error::ConfigurationError;
use std::sync::Arc;

/// A bounded similarity score between two strings.
///
/// Callers always pass `(query, field)` in that order, so symmetry is not
/// required, but the built-in metrics are symmetric.
pub trait SimilarityMetric: Send + Sync {
    /// Similarity in `[0, 1]`. Must be deterministic.
    fn similarity(&self, a: &str, b: &str) -> f32;

    /// Short name for logging.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> SimilarityMetric for F
where
    F: Fn(&str, &str) -> f32 + Send + Sync,
{
    fn similarity(&self, a: &str, b: &str) -> f32 {
        self(a, b)
    }
}

/// Arithmetic mean of several independent metrics.
///
/// Used where a record may belong to either naming domain, so neither the
/// series nor the movie convention should dominate.
#[derive(Clone)]
pub struct AverageMetric {
    metrics: Vec<Arc<dyn SimilarityMetric>>,
}

impl AverageMetric {
    pub fn new(metrics: Vec<Arc<dyn SimilarityMetric>>) -> Result<Self, ConfigurationError> {
        if metrics.is_empty() {
            return Err(ConfigurationError::EmptyAverage);
        }
        Ok(Self { metrics })
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl SimilarityMetric for AverageMetric {
    fn similarity(&self, a: &str, b: &str) -> f32 {
        let sum: f32 = self.metrics.iter().map(|m| m.similarity(a, b)).sum();
        sum / self.metrics.len() as f32
    }

    fn name(&self) -> &'static str {
        "average"
    }
}

impl std::fmt::Debug for AverageMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.metrics.iter().map(|m| m.name()))
            .finish()
    }
}

/// Metric for TV series names: trigram distance.
pub fn series_match_metric() -> Arc<dyn SimilarityMetric> {
    Arc::new(QGramMetric::default())
}

/// Metric for movie names: release-year-insensitive edit distance.
pub fn movie_match_metric() -> Arc<dyn SimilarityMetric> {
    Arc::new(MovieNameMetric)
}

/// Metric for subtitle records, which may name either a series or a movie.
pub fn subtitle_match_metric() -> Arc<dyn SimilarityMetric> {
    Arc::new(AverageMetric {
        metrics: vec![series_match_metric(), movie_match_metric()],
    })
}
