// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.

#![doc(hidden)]

use crate::error::{RemoteError, SourceError};
use crate::reconcile::SearchSource;
use crate::types::{MediaKind, SeriesRecord, SubtitleRecord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Series record with the given aliases.
pub fn series(id: u32, name: &str, aliases: &[&str]) -> SeriesRecord {
    SeriesRecord::new(id, name).with_alias_names(aliases.iter().copied())
}

/// Movie subtitle record with a release year.
pub fn movie(imdb_id: u32, name: &str, year: u16) -> SubtitleRecord {
    SubtitleRecord::new(imdb_id, name, MediaKind::Movie).with_year(year)
}

/// Series subtitle record with the given aliases.
pub fn show(imdb_id: u32, name: &str, aliases: &[&str]) -> SubtitleRecord {
    SubtitleRecord::new(imdb_id, name, MediaKind::Series).with_alias_names(aliases.iter().copied())
}

/// A small series dump used by several suites.
pub fn sample_series() -> Vec<SeriesRecord> {
    vec![
        series(78874, "Firefly", &[]),
        series(70327, "Buffy the Vampire Slayer", &["BtVS"]),
        series(71470, "Star Trek: The Next Generation", &["Star Trek TNG"]),
        series(73739, "Lost", &[]),
        series(75760, "How I Met Your Mother", &["HIMYM"]),
        series(73762, "Grey's Anatomy", &[]),
    ]
}

/// What a [`FixtureSource`] does when asked.
#[derive(Debug, Clone)]
pub enum Behavior<T> {
    /// Return these records for every query.
    Answer(Vec<T>),
    /// Fail with a remote error.
    Fail(String),
    /// Sleep, then return these records.
    Slow(Duration, Vec<T>),
    /// Panic inside the source.
    Panic,
}

/// Scripted search source that counts how often it is asked.
#[derive(Debug)]
pub struct FixtureSource<T> {
    name: String,
    behavior: Behavior<T>,
    calls: AtomicUsize,
}

impl<T> FixtureSource<T> {
    pub fn new(name: &str, behavior: Behavior<T>) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answering(name: &str, records: Vec<T>) -> Self {
        Self::new(name, Behavior::Answer(records))
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self::new(name, Behavior::Fail(message.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync> SearchSource<T> for FixtureSource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, _query: &str) -> Result<Vec<T>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Answer(records) => Ok(records.clone()),
            Behavior::Fail(message) => Err(RemoteError::new(self.name.as_str(), message.as_str()).into()),
            Behavior::Slow(delay, records) => {
                std::thread::sleep(*delay);
                Ok(records.clone())
            }
            Behavior::Panic => panic!("fixture source {} panicked", self.name),
        }
    }
}
