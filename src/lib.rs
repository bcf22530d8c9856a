// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy local search and multi-source result reconciliation for named records.
//!
//! Two halves. A [`LocalSearchIndex`] holds a fixed collection of records
//! (series, movies, anything with names) and answers approximate-name queries by
//! scoring every record in parallel. A [`Reconciler`] sends one query to several
//! sources at once (local indexes, remote APIs), merges the records that denote
//! the same entity, and ranks the merged list against the query.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────────────┐
//! │  utils.rs  │──▶│  metric/    │──▶│  index/          │
//! │ (normalize)│   │ (q-gram,    │   │ (LocalSearchIndex│
//! └────────────┘   │  movie, avg)│   │  IndexOptions)   │
//!                  └─────────────┘   └──────────────────┘
//!                                             │
//!        ┌─────────────┐   ┌──────────────┐   ▼
//!        │ dataset.rs  │──▶│ registry.rs  │──▶┌──────────────────┐
//!        │ (providers) │   │ (snapshot)   │   │  reconcile/      │◀── RemoteSource
//!        └─────────────┘   └──────────────┘   │ (fan-out, merge, │
//!                                             │  re-rank)        │
//!                                             └──────────────────┘
//! ```
//!
//! Both halves run on an injected [`WorkerPool`], so the caller decides how
//! many threads the engine may use.
//!
//! # Usage
//!
//! ```
//! use namesake::{IndexOptions, LocalSearchIndex, SeriesRecord};
//!
//! let index = LocalSearchIndex::from_entities(
//!     vec![SeriesRecord::new(78874, "Firefly")],
//!     IndexOptions::default(),
//! )
//! .unwrap();
//!
//! let results = index.search("firefli").unwrap();
//! assert_eq!(results[0].id, 78874);
//! ```

pub mod dataset;
pub mod error;
pub mod index;
pub mod metric;
pub mod pool;
pub mod reconcile;
pub mod registry;
pub mod scoring;
pub mod testing;
mod types;
mod utils;

pub use error::{
    ConfigurationError, DatasetUnavailable, ReconcileError, RemoteError, SearchError, SourceError,
};
pub use index::{IndexEntry, IndexOptions, LocalSearchIndex};
pub use metric::{AverageMetric, MovieNameMetric, QGramMetric, SimilarityMetric};
pub use pool::{CancelToken, WorkerPool};
pub use reconcile::{merge_by_identity, MergedResult, Reconciler, ReconcilerOptions, RemoteSource, SearchSource};
pub use registry::IndexRegistry;
pub use scoring::ScoredCandidate;
pub use types::{Entity, MediaKind, SeriesRecord, SubtitleRecord};
pub use utils::normalize;
