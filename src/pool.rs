// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded worker pool for CPU-bound scoring.
//!
//! Scoring a query against every record is embarrassingly parallel, and so is
//! re-ranking merged results. Both run on a rayon pool sized to the machine.
//! Blocking work (asking remote sources) does not belong here. The pool is injected rather than created per call, so callers
//! choose how many threads the engine may use and a query never pays for
//! thread start-up.

use crate::error::ConfigurationError;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle to a rayon thread pool. Cloning shares the same threads.
///
/// The default handle runs on rayon's global pool, which is sized to the
/// available parallelism.
#[derive(Clone, Default)]
pub struct WorkerPool {
    inner: Option<Arc<ThreadPool>>,
}

impl WorkerPool {
    /// Build a dedicated pool with `threads` workers. Zero means one per available core.
    pub fn new(threads: usize) -> Result<Self, ConfigurationError> {
        let inner = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("namesake-worker-{}", i))
            .build()
            .map_err(|e| ConfigurationError::WorkerPool(e.to_string()))?;
        Ok(Self {
            inner: Some(Arc::new(inner)),
        })
    }

    /// Handle to rayon's global pool.
    pub fn global() -> Self {
        Self { inner: None }
    }

    pub fn is_global(&self) -> bool {
        self.inner.is_none()
    }

    pub fn threads(&self) -> usize {
        match &self.inner {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` inside the pool; parallel iterators in `op` use its workers.
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.inner {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}

/// Shared flag that stops an in-flight query at the next record boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
