// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory fuzzy index over a fixed record collection.
//!
//! Every record's field strings are normalized once at build time and frozen.
//! A query is normalized the same way and scored against every record in
//! parallel. A record survives if one of its fields contains the query as a
//! substring, or if its best field similarity beats the index threshold:
//!
//! ```text
//! keep(r) = ∃ f ∈ fields(r). f ⊇ q   ∨   max_{f ∈ fields(r)} sim(q, f) > min_similarity
//! ```
//!
//! Substring containment keeps exact fragments ("buffy" in "buffy the vampire
//! slayer") that a distance metric would score low; the metric finds typos and
//! alternate spellings that containment misses. Survivors are sorted by score
//! (stable, so ties keep construction order) and cut to the result limit.
//!
//! # Invariants
//!
//! - Entries are immutable after construction. The entry table sits behind an
//!   `Arc`, so clones and concurrent queries share it without locks.
//! - Results are a subset of the indexed records, at most `result_limit` long,
//!   sorted by non-increasing score.
//! - A failure while scoring one record (a panicking metric) makes that record
//!   a non-match; it never fails the query.

use crate::error::{ConfigurationError, SearchError};
use crate::metric::{series_match_metric, SimilarityMetric};
use crate::pool::{CancelToken, WorkerPool};
use crate::scoring::{rank_stable, sanitize_score, ScoredCandidate};
use crate::types::Entity;
use crate::utils::normalize;
use rayon::prelude::*;
use serde::Deserialize;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default similarity a non-substring match must exceed.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.5;

/// Threshold for higher-precision indices (large series dumps).
pub const STRICT_MIN_SIMILARITY: f32 = 0.7;

/// Default maximum number of results a query returns.
pub const DEFAULT_RESULT_LIMIT: usize = 20;

/// Tunables for one index instance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexOptions {
    /// A record whose fields do not contain the query must score strictly above this.
    pub min_similarity: f32,
    /// Maximum number of results per query.
    pub result_limit: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

impl IndexOptions {
    /// Higher-precision options: threshold 0.7.
    pub fn strict() -> Self {
        Self {
            min_similarity: STRICT_MIN_SIMILARITY,
            ..Self::default()
        }
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigurationError::InvalidThreshold(self.min_similarity));
        }
        if self.result_limit == 0 {
            return Err(ConfigurationError::ZeroResultLimit);
        }
        Ok(())
    }
}

/// One indexed record and its frozen, normalized field set.
#[derive(Debug)]
pub struct IndexEntry<T> {
    record: T,
    fields: Box<[String]>,
}

impl<T> IndexEntry<T> {
    fn new(record: T, raw_fields: Vec<String>) -> Self {
        let mut fields: Vec<String> = Vec::with_capacity(raw_fields.len());
        for raw in raw_fields {
            let field = normalize(&raw);
            if !field.is_empty() && !fields.contains(&field) {
                fields.push(field);
            }
        }
        Self {
            record,
            fields: fields.into_boxed_slice(),
        }
    }

    pub fn record(&self) -> &T {
        &self.record
    }

    /// Normalized field strings, deduplicated, in first-seen order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Immutable fuzzy index over a snapshot of records.
///
/// Cheap to clone: clones share the entry table.
pub struct LocalSearchIndex<T> {
    name: String,
    entries: Arc<[IndexEntry<T>]>,
    options: IndexOptions,
    metric: Arc<dyn SimilarityMetric>,
    pool: WorkerPool,
}

impl<T> Clone for LocalSearchIndex<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            entries: Arc::clone(&self.entries),
            options: self.options,
            metric: Arc::clone(&self.metric),
            pool: self.pool.clone(),
        }
    }
}

impl<T> fmt::Debug for LocalSearchIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSearchIndex")
            .field("name", &self.name)
            .field("records", &self.entries.len())
            .field("options", &self.options)
            .field("metric", &self.metric.name())
            .finish()
    }
}

impl<T: Send + Sync> LocalSearchIndex<T> {
    /// Index `records` with default options, taking field strings from `fields_of`.
    ///
    /// An empty collection is legal: the index then matches nothing.
    pub fn build<I, F>(records: I, fields_of: F) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> Vec<String> + Sync,
    {
        Self::build_with(records, fields_of, IndexOptions::default(), WorkerPool::default())
    }

    /// Index `records` with explicit options, normalizing fields on `pool`.
    pub fn build_with<I, F>(
        records: I,
        fields_of: F,
        options: IndexOptions,
        pool: WorkerPool,
    ) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T) -> Vec<String> + Sync,
    {
        options.validate()?;

        let start = Instant::now();
        let records: Vec<T> = records.into_iter().collect();
        let entries: Vec<IndexEntry<T>> = pool.install(|| {
            records
                .into_par_iter()
                .map(|record| {
                    let fields = fields_of(&record);
                    IndexEntry::new(record, fields)
                })
                .collect()
        });

        info!(
            records = entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "built local search index"
        );

        Ok(Self {
            name: "local".to_string(),
            entries: entries.into(),
            options,
            metric: series_match_metric(),
            pool,
        })
    }

    /// Replace the similarity metric used for scoring.
    pub fn with_metric(mut self, metric: Arc<dyn SimilarityMetric>) -> Self {
        self.metric = metric;
        self
    }

    /// Run queries on `pool` instead of the one the index was built on.
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    /// Name used in logs and reconciliation failure reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    pub fn metric(&self) -> &Arc<dyn SimilarityMetric> {
        &self.metric
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry<T>] {
        &self.entries
    }

    /// Indexed records in construction order.
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(IndexEntry::record)
    }

    /// Ranked matches with their scores, at most `result_limit` of them.
    pub fn search_scored(&self, query: &str) -> Result<Vec<ScoredCandidate<&T>>, SearchError> {
        self.run(query, None, None)
    }

    /// Like [`search_scored`](Self::search_scored), but gives up once `deadline` passes.
    pub fn search_scored_until(
        &self,
        query: &str,
        deadline: Instant,
    ) -> Result<Vec<ScoredCandidate<&T>>, SearchError> {
        self.run(query, Some(deadline), None)
    }

    /// Like [`search_scored`](Self::search_scored), but stops when `token` is cancelled.
    pub fn search_scored_cancellable(
        &self,
        query: &str,
        token: &CancelToken,
    ) -> Result<Vec<ScoredCandidate<&T>>, SearchError> {
        self.run(query, None, Some(token))
    }

    fn run(
        &self,
        query: &str,
        deadline: Option<Instant>,
        token: Option<&CancelToken>,
    ) -> Result<Vec<ScoredCandidate<&T>>, SearchError> {
        let q = normalize(query);
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let total = self.entries.len();
        let scored = AtomicUsize::new(0);
        let interrupted = AtomicBool::new(false);
        let min_similarity = self.options.min_similarity;
        let metric: &dyn SimilarityMetric = &*self.metric;

        let mut candidates: Vec<ScoredCandidate<&T>> = self.pool.install(|| {
            self.entries
                .par_iter()
                .filter_map(|entry| {
                    if should_stop(&interrupted, deadline, token) {
                        return None;
                    }

                    let outcome =
                        catch_unwind(AssertUnwindSafe(|| score_fields(metric, &q, &entry.fields)));
                    scored.fetch_add(1, Ordering::Relaxed);

                    match outcome {
                        Ok((matched, score)) if matched || score > min_similarity => {
                            Some(ScoredCandidate::new(&entry.record, score))
                        }
                        Ok(_) => None,
                        Err(_) => {
                            warn!(
                                index = %self.name,
                                fields = ?entry.fields,
                                "scoring panicked, record treated as no match"
                            );
                            None
                        }
                    }
                })
                .collect()
        });

        if interrupted.load(Ordering::Relaxed) {
            let scored = scored.load(Ordering::Relaxed);
            if token.is_some_and(CancelToken::is_cancelled) {
                return Err(SearchError::Cancelled);
            }
            return Err(SearchError::DeadlineExceeded { scored, total });
        }

        let matched = candidates.len();
        rank_stable(&mut candidates);
        candidates.truncate(self.options.result_limit);

        debug!(
            index = %self.name,
            query = %q,
            matched,
            returned = candidates.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "local search"
        );

        Ok(candidates)
    }
}

impl<T: Clone + Send + Sync> LocalSearchIndex<T> {
    /// Ranked matching records, at most `result_limit` of them.
    pub fn search(&self, query: &str) -> Result<Vec<T>, SearchError> {
        Ok(into_records(self.search_scored(query)?))
    }

    /// Like [`search`](Self::search), but gives up once `deadline` passes.
    pub fn search_until(&self, query: &str, deadline: Instant) -> Result<Vec<T>, SearchError> {
        Ok(into_records(self.search_scored_until(query, deadline)?))
    }

    /// Like [`search`](Self::search), but stops when `token` is cancelled.
    pub fn search_cancellable(&self, query: &str, token: &CancelToken) -> Result<Vec<T>, SearchError> {
        Ok(into_records(self.search_scored_cancellable(query, token)?))
    }
}

impl<T: Entity> LocalSearchIndex<T> {
    /// Index entities by their primary name and aliases.
    pub fn from_entities<I>(records: I, options: IndexOptions) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::build_with(records, T::effective_names, options, WorkerPool::default())
    }
}

fn into_records<T: Clone>(candidates: Vec<ScoredCandidate<&T>>) -> Vec<T> {
    candidates.into_iter().map(|c| c.record.clone()).collect()
}

fn should_stop(interrupted: &AtomicBool, deadline: Option<Instant>, token: Option<&CancelToken>) -> bool {
    if interrupted.load(Ordering::Relaxed) {
        return true;
    }
    let expired = deadline.is_some_and(|d| Instant::now() >= d);
    let cancelled = token.is_some_and(CancelToken::is_cancelled);
    if expired || cancelled {
        interrupted.store(true, Ordering::Relaxed);
        return true;
    }
    false
}

/// Whether any field contains `query`, and the best field similarity.
fn score_fields(metric: &dyn SimilarityMetric, query: &str, fields: &[String]) -> (bool, f32) {
    let mut matched = false;
    let mut best = 0.0f32;
    for field in fields {
        matched |= field.contains(query);
        best = best.max(sanitize_score(metric.similarity(query, field)));
    }
    (matched, best)
}
