// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Where local index records come from.
//!
//! A [`DatasetProvider`] hands over the full record collection for one index
//! build. The crate ships a JSON data-dump reader and an in-memory provider;
//! anything else (a downloader, a database export) can be a closure.

use crate::error::DatasetUnavailable;
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Supplies the bulk dataset a local index is built from.
pub trait DatasetProvider<T>: Send + Sync {
    fn load(&self) -> Result<Vec<T>, DatasetUnavailable>;
}

impl<T, F> DatasetProvider<T> for F
where
    F: Fn() -> Result<Vec<T>, DatasetUnavailable> + Send + Sync,
{
    fn load(&self) -> Result<Vec<T>, DatasetUnavailable> {
        self()
    }
}

/// Reads a JSON array of records from a data-dump file.
pub struct JsonDumpProvider<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonDumpProvider<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Clone for JsonDumpProvider<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> fmt::Debug for JsonDumpProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonDumpProvider").field("path", &self.path).finish()
    }
}

impl<T: DeserializeOwned> DatasetProvider<T> for JsonDumpProvider<T> {
    fn load(&self) -> Result<Vec<T>, DatasetUnavailable> {
        let origin = self.path.display().to_string();
        let start = Instant::now();

        let file = File::open(&self.path).map_err(|e| DatasetUnavailable::new(&origin, e.to_string()))?;
        let records: Vec<T> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DatasetUnavailable::new(&origin, format!("malformed dump: {}", e)))?;

        info!(
            path = %origin,
            records = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded data dump"
        );
        Ok(records)
    }
}

/// A fixed in-memory record set.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider<T> {
    records: Vec<T>,
}

impl<T> StaticProvider<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }
}

impl<T: Clone + Send + Sync> DatasetProvider<T> for StaticProvider<T> {
    fn load(&self) -> Result<Vec<T>, DatasetUnavailable> {
        Ok(self.records.clone())
    }
}
