// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Owner of the current index snapshot.
//!
//! A registry builds its index from a [`DatasetProvider`] the first time
//! somebody asks for it, then hands out the same `Arc` to every caller until a
//! rebuild swaps in a fresh one. The swap is a pointer store under a short
//! write lock; loading and indexing happen outside the lock, so queries never
//! wait on a rebuild and in-flight queries finish on the snapshot they started
//! with.
//!
//! Registries are passed to the reconciler as ordinary search sources; nothing
//! in the crate reaches for a global.

use crate::dataset::DatasetProvider;
use crate::error::{ConfigurationError, SourceError};
use crate::index::{IndexOptions, LocalSearchIndex};
use crate::metric::{series_match_metric, SimilarityMetric};
use crate::pool::WorkerPool;
use crate::reconcile::SearchSource;
use crate::types::Entity;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Init-once, explicitly rebuildable holder of a [`LocalSearchIndex`].
pub struct IndexRegistry<T> {
    name: String,
    provider: Box<dyn DatasetProvider<T>>,
    options: IndexOptions,
    metric: Arc<dyn SimilarityMetric>,
    pool: WorkerPool,
    current: RwLock<Option<Arc<LocalSearchIndex<T>>>>,
    // Serializes builds so concurrent first callers load the dataset once.
    building: Mutex<()>,
}

impl<T: Entity> IndexRegistry<T> {
    pub fn new(provider: impl DatasetProvider<T> + 'static, options: IndexOptions) -> Self {
        Self {
            name: "local".to_string(),
            provider: Box::new(provider),
            options,
            metric: series_match_metric(),
            pool: WorkerPool::default(),
            current: RwLock::new(None),
            building: Mutex::new(()),
        }
    }

    /// Name given to every index this registry builds.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Metric every index this registry builds scores with.
    pub fn with_metric(mut self, metric: Arc<dyn SimilarityMetric>) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Current snapshot, loading it on first use.
    pub fn snapshot(&self) -> Result<Arc<LocalSearchIndex<T>>, ConfigurationError> {
        if let Some(index) = self.current.read().as_ref() {
            return Ok(Arc::clone(index));
        }

        let _building = self.building.lock();
        // Another caller may have finished loading while we waited.
        if let Some(index) = self.current.read().as_ref() {
            return Ok(Arc::clone(index));
        }

        let index = Arc::new(self.build(self.provider.load()?)?);
        *self.current.write() = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Reload the dataset and swap in a fresh index.
    ///
    /// On failure the previous snapshot, if any, stays in place.
    pub fn rebuild(&self) -> Result<Arc<LocalSearchIndex<T>>, ConfigurationError> {
        let _building = self.building.lock();
        let index = Arc::new(self.build(self.provider.load()?)?);
        self.swap(Arc::clone(&index));
        Ok(index)
    }

    /// Swap in an index built from `records` instead of the provider's dataset.
    pub fn replace(&self, records: Vec<T>) -> Result<Arc<LocalSearchIndex<T>>, ConfigurationError> {
        let _building = self.building.lock();
        let index = Arc::new(self.build(records)?);
        self.swap(Arc::clone(&index));
        Ok(index)
    }

    fn build(&self, records: Vec<T>) -> Result<LocalSearchIndex<T>, ConfigurationError> {
        let index = LocalSearchIndex::build_with(records, T::effective_names, self.options, self.pool.clone())?;
        Ok(index.named(self.name.clone()).with_metric(Arc::clone(&self.metric)))
    }

    fn swap(&self, index: Arc<LocalSearchIndex<T>>) {
        let start = Instant::now();
        let records = index.len();
        let previous = self.current.write().replace(index);
        info!(
            registry = %self.name,
            records,
            replaced = previous.is_some(),
            swap_us = start.elapsed().as_micros() as u64,
            "index snapshot swapped"
        );
    }
}

impl<T> fmt::Debug for IndexRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("metric", &self.metric.name())
            .field("loaded", &self.current.read().is_some())
            .finish()
    }
}

impl<T: Entity> SearchSource<T> for IndexRegistry<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, query: &str) -> Result<Vec<T>, SourceError> {
        Ok(self.snapshot()?.search(query)?)
    }

    fn search_until(&self, query: &str, deadline: Option<Instant>) -> Result<Vec<T>, SourceError> {
        let index = self.snapshot()?;
        SearchSource::search_until(&*index, query, deadline)
    }
}
