// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Anything the reconciler can ask: local indexes and remote clients.

use crate::error::{RemoteError, SourceError};
use crate::index::LocalSearchIndex;
use std::fmt;
use std::time::Instant;

/// A uniform `search(query)` capability.
///
/// Sources fail independently; the reconciler treats a failed source as one
/// that returned nothing.
pub trait SearchSource<T>: Send + Sync {
    /// Name used in logs and failure reports.
    fn name(&self) -> &str;

    fn search(&self, query: &str) -> Result<Vec<T>, SourceError>;

    /// Search, stopping early once `deadline` passes if the source can.
    ///
    /// Sources that cannot be interrupted ignore the deadline; the reconciler
    /// stops waiting for them anyway.
    fn search_until(&self, query: &str, deadline: Option<Instant>) -> Result<Vec<T>, SourceError> {
        let _ = deadline;
        self.search(query)
    }
}

impl<T: Clone + Send + Sync> SearchSource<T> for LocalSearchIndex<T> {
    fn name(&self) -> &str {
        LocalSearchIndex::name(self)
    }

    fn search(&self, query: &str) -> Result<Vec<T>, SourceError> {
        Ok(LocalSearchIndex::search(self, query)?)
    }

    fn search_until(&self, query: &str, deadline: Option<Instant>) -> Result<Vec<T>, SourceError> {
        let results = match deadline {
            Some(deadline) => LocalSearchIndex::search_until(self, query, deadline)?,
            None => LocalSearchIndex::search(self, query)?,
        };
        Ok(results)
    }
}

/// Adapter turning any remote search client call into a [`SearchSource`].
///
/// Transport, authentication and retries belong to the client; the closure
/// only has to return records or a [`RemoteError`].
pub struct RemoteSource<F> {
    name: String,
    search: F,
}

impl<F> RemoteSource<F> {
    pub fn new(name: impl Into<String>, search: F) -> Self {
        Self {
            name: name.into(),
            search,
        }
    }
}

impl<T, F> SearchSource<T> for RemoteSource<F>
where
    F: Fn(&str) -> Result<Vec<T>, RemoteError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, query: &str) -> Result<Vec<T>, SourceError> {
        Ok((self.search)(query)?)
    }
}

impl<F> fmt::Debug for RemoteSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource").field("name", &self.name).finish()
    }
}
