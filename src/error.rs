// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy.
//!
//! Construction problems surface immediately as [`ConfigurationError`]. A single
//! index query only fails with [`SearchError`] when the fan-out itself cannot
//! finish; one bad record never fails a query. During reconciliation each source
//! fails on its own ([`SourceError`]) and only the loss of every source becomes
//! [`ReconcileError::AllSourcesFailed`]. Nothing here is retried internally.

use std::time::Duration;
use thiserror::Error;

/// Invalid construction input for an index, pool or reconciler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("minimum similarity must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("result limit must be at least 1")]
    ZeroResultLimit,

    #[error("q-gram size must be at least 1")]
    ZeroGramSize,

    #[error("average metric needs at least one component metric")]
    EmptyAverage,

    #[error("worker pool could not be built: {0}")]
    WorkerPool(String),

    #[error("dataset unavailable: {0}")]
    Dataset(#[from] DatasetUnavailable),
}

/// The fan-out/collect protocol of one index query could not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search deadline exceeded after scoring {scored} of {total} records")]
    DeadlineExceeded { scored: usize, total: usize },

    #[error("search was cancelled")]
    Cancelled,
}

/// Failure reported by a remote search client. Opaque to the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{service}: {message}")]
pub struct RemoteError {
    pub service: String,
    pub message: String,
}

impl RemoteError {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// The bulk dataset backing a local index could not be loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{origin}: {reason}")]
pub struct DatasetUnavailable {
    pub origin: String,
    pub reason: String,
}

impl DatasetUnavailable {
    pub fn new(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

/// Why one source contributed nothing to a reconciliation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("remote search failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("local search failed: {0}")]
    Search(#[from] SearchError),

    #[error("local index unavailable: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("no result within {0:?}")]
    TimedOut(Duration),

    #[error("source panicked: {0}")]
    Panicked(String),

    #[error("source thread could not be started: {0}")]
    Unstarted(String),

    #[error("source stopped without reporting a result")]
    Abandoned,
}

impl From<DatasetUnavailable> for SourceError {
    fn from(err: DatasetUnavailable) -> Self {
        SourceError::Configuration(ConfigurationError::Dataset(err))
    }
}

/// Failure of a whole reconciliation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("reconciler has no search sources")]
    NoSources,

    #[error("all {} sources failed: {}", .failures.len(), summarize(.failures))]
    AllSourcesFailed { failures: Vec<(String, SourceError)> },
}

fn summarize(failures: &[(String, SourceError)]) -> String {
    failures
        .iter()
        .map(|(source, err)| format!("{} ({})", source, err))
        .collect::<Vec<_>>()
        .join(", ")
}
