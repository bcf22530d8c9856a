// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Multi-source reconciliation.
//!
//! One query goes to every source at once (local index, remote API, ...).
//! Whatever comes back is pooled in source priority order, merged by identity,
//! and re-ranked against the original query:
//!
//! ```text
//! resolve(q) = rank_q( merge_by_identity( source₀(q) ++ source₁(q) ++ ... ) )
//! ```
//!
//! A failing or late source contributes nothing. Only when every source fails
//! does the reconciliation fail. No result cap is applied here: each source
//! already bounds what it returns.
//!
//! The caller blocks until every source has answered or the deadline passes.
//! Each source runs on a thread of its own; a source still running at the
//! deadline is left to finish in the background and its answer is dropped.
//! The reconciler's [`WorkerPool`] only scores the merged results.

mod merge;
mod source;

pub use merge::{merge_by_identity, MergedResult};
pub use source::{RemoteSource, SearchSource};

use crate::error::{ReconcileError, SourceError};
use crate::metric::{series_match_metric, SimilarityMetric};
use crate::pool::WorkerPool;
use crate::scoring::{rank_stable, sanitize_score, ScoredCandidate};
use crate::types::Entity;
use crate::utils::normalize;
use rayon::prelude::*;
use serde::Deserialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Tunables for a reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcilerOptions {
    /// Stop waiting for sources after this many milliseconds. `None` waits for all.
    pub timeout_ms: Option<u64>,
}

impl ReconcilerOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

type Outcome<T> = Result<Vec<T>, SourceError>;

/// Fans a query out to prioritized sources and merges the answers.
///
/// Sources are listed in priority order: the first source's record becomes
/// the primary when several sources return the same entity.
pub struct Reconciler<T> {
    sources: Vec<Arc<dyn SearchSource<T>>>,
    metric: Arc<dyn SimilarityMetric>,
    pool: WorkerPool,
    options: ReconcilerOptions,
}

impl<T> Clone for Reconciler<T> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
            metric: Arc::clone(&self.metric),
            pool: self.pool.clone(),
            options: self.options,
        }
    }
}

impl<T> std::fmt::Debug for Reconciler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("metric", &self.metric.name())
            .field("options", &self.options)
            .finish()
    }
}

impl<T: Entity + 'static> Default for Reconciler<T> {
    fn default() -> Self {
        Self::new(series_match_metric())
    }
}

impl<T: Entity + 'static> Reconciler<T> {
    /// Reconciler with no sources yet, re-ranking with `metric`.
    pub fn new(metric: Arc<dyn SimilarityMetric>) -> Self {
        Self {
            sources: Vec::new(),
            metric,
            pool: WorkerPool::default(),
            options: ReconcilerOptions::default(),
        }
    }

    /// Append a source with lower priority than those already added.
    pub fn with_source(mut self, source: Arc<dyn SearchSource<T>>) -> Self {
        self.sources.push(source);
        self
    }

    /// Pool used to score merged results. Sources never run on it.
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_options(mut self, options: ReconcilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sources(&self) -> &[Arc<dyn SearchSource<T>>] {
        &self.sources
    }

    /// Merged, re-ranked records from the configured sources.
    pub fn resolve(&self, query: &str) -> Result<Vec<T>, ReconcileError> {
        let deadline = self.options.timeout().map(|t| Instant::now() + t);
        Ok(into_records(self.run(query, &self.sources, deadline)?))
    }

    /// Like [`resolve`](Self::resolve) with an explicit deadline, overriding the configured timeout.
    pub fn resolve_until(&self, query: &str, deadline: Instant) -> Result<Vec<T>, ReconcileError> {
        Ok(into_records(self.run(query, &self.sources, Some(deadline))?))
    }

    /// Like [`resolve`](Self::resolve) against an explicit source list instead of the configured one.
    pub fn resolve_across(
        &self,
        query: &str,
        sources: &[Arc<dyn SearchSource<T>>],
    ) -> Result<Vec<T>, ReconcileError> {
        let deadline = self.options.timeout().map(|t| Instant::now() + t);
        Ok(into_records(self.run(query, sources, deadline)?))
    }

    /// Merged results with their re-rank scores, highest first.
    pub fn resolve_merged(
        &self,
        query: &str,
    ) -> Result<Vec<ScoredCandidate<MergedResult<T>>>, ReconcileError> {
        let deadline = self.options.timeout().map(|t| Instant::now() + t);
        self.run(query, &self.sources, deadline)
    }

    fn run(
        &self,
        query: &str,
        sources: &[Arc<dyn SearchSource<T>>],
        deadline: Option<Instant>,
    ) -> Result<Vec<ScoredCandidate<MergedResult<T>>>, ReconcileError> {
        if sources.is_empty() {
            return Err(ReconcileError::NoSources);
        }

        let start = Instant::now();
        let outcomes = self.fan_out(query, sources, deadline);

        let mut pool: Vec<T> = Vec::new();
        let mut failures: Vec<(String, SourceError)> = Vec::new();
        for (source, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(records) => pool.extend(records),
                Err(err) => {
                    warn!(source = source.name(), error = %err, "search source failed");
                    failures.push((source.name().to_string(), err));
                }
            }
        }

        if failures.len() == sources.len() {
            return Err(ReconcileError::AllSourcesFailed { failures });
        }

        let pooled = pool.len();
        let merged = merge_by_identity(pool);
        let ranked = self.rank(query, merged);

        debug!(
            query,
            sources = sources.len(),
            failed = failures.len(),
            pooled,
            merged = ranked.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "reconciled search"
        );

        Ok(ranked)
    }

    /// Ask every source concurrently; one outcome per source, in source order.
    ///
    /// Each source gets its own thread. Source searches block on I/O, so they
    /// stay off the scoring pool and never wait behind one another.
    fn fan_out(
        &self,
        query: &str,
        sources: &[Arc<dyn SearchSource<T>>],
        deadline: Option<Instant>,
    ) -> Vec<Outcome<T>> {
        let started = Instant::now();
        let (tx, rx) = mpsc::channel::<(usize, Outcome<T>)>();
        let query: Arc<str> = Arc::from(query);

        let mut outcomes: Vec<Option<Outcome<T>>> = sources.iter().map(|_| None).collect();
        let mut pending = sources.len();

        for (slot, source) in sources.iter().enumerate() {
            let tx = tx.clone();
            let worker = Arc::clone(source);
            let query = Arc::clone(&query);
            let spawned = thread::Builder::new()
                .name(format!("namesake-source-{}", slot))
                .spawn(move || {
                    let outcome = catch_unwind(AssertUnwindSafe(|| worker.search_until(&query, deadline)))
                        .unwrap_or_else(|panic| Err(SourceError::Panicked(panic_message(panic.as_ref()))));
                    // The receiver is gone once the deadline has passed.
                    let _ = tx.send((slot, outcome));
                });
            if let Err(err) = spawned {
                outcomes[slot] = Some(Err(SourceError::Unstarted(err.to_string())));
                pending -= 1;
            }
        }
        drop(tx);

        while pending > 0 {
            let received = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    rx.recv_timeout(deadline - now)
                }
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok((slot, outcome)) => {
                    outcomes[slot] = Some(outcome);
                    pending -= 1;
                }
                Err(_) => break,
            }
        }

        let waited = deadline.map(|_| started.elapsed());
        outcomes
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| match waited {
                    Some(waited) => Err(SourceError::TimedOut(waited)),
                    None => Err(SourceError::Abandoned),
                })
            })
            .collect()
    }

    /// Score every merged result by its best name against the query, highest first.
    fn rank(&self, query: &str, merged: Vec<MergedResult<T>>) -> Vec<ScoredCandidate<MergedResult<T>>> {
        let q = normalize(query);
        let metric = &self.metric;
        let mut ranked: Vec<ScoredCandidate<MergedResult<T>>> = self.pool.install(|| {
            merged
                .into_par_iter()
                .map(|result| {
                    let score = result
                        .names()
                        .map(|name| sanitize_score(metric.similarity(&q, &normalize(name))))
                        .fold(0.0f32, f32::max);
                    ScoredCandidate::new(result, score)
                })
                .collect()
        });
        rank_stable(&mut ranked);
        ranked
    }
}

fn into_records<T: Entity>(ranked: Vec<ScoredCandidate<MergedResult<T>>>) -> Vec<T> {
    ranked.into_iter().map(|c| c.record.into_record()).collect()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
