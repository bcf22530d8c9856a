// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Records the engine searches and reconciles.
//!
//! The engine never looks inside a record beyond the [`Entity`] capability set:
//! an identity key that says when two records denote the same real-world thing,
//! a primary name, alias names, and a way to rebuild the record with a merged
//! alias list. Two concrete records ship with the crate, matching the data dumps
//! the engine was built for: TV series and subtitle titles.
//!
//! # Invariants
//!
//! - **identity**: stable for the lifetime of a record; equal keys mean the same
//!   entity no matter which source returned the record.
//! - **effective_names**: the primary name always comes first.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};
use std::hash::Hash;

/// Capability set a record type provides to the index and the reconciler.
pub trait Entity: Clone + Send + Sync {
    type Id: Eq + Hash + Clone + Debug + Send + Sync;

    /// Stable equality key across sources.
    fn identity(&self) -> Self::Id;

    /// Primary display name.
    fn name(&self) -> &str;

    /// Alternate names, excluding the primary name.
    fn aliases(&self) -> &[String];

    /// Copy of this record carrying `aliases` instead of its own.
    fn with_aliases(&self, aliases: Vec<String>) -> Self;

    /// Primary name followed by every alias.
    fn effective_names(&self) -> Vec<String> {
        std::iter::once(self.name().to_string())
            .chain(self.aliases().iter().cloned())
            .collect()
    }
}

/// A TV series entry, as published in the series database dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub alias_names: Vec<String>,
}

impl SeriesRecord {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            alias_names: Vec::new(),
        }
    }

    pub fn with_alias_names<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_names = aliases.into_iter().map(Into::into).collect();
        self
    }
}

impl Entity for SeriesRecord {
    type Id = u32;

    fn identity(&self) -> u32 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.alias_names
    }

    fn with_aliases(&self, aliases: Vec<String>) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            alias_names: aliases,
        }
    }
}

impl Display for SeriesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Whether a subtitle title names a movie or a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

/// A title from the subtitle database dump, keyed by IMDb number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleRecord {
    pub imdb_id: u32,
    pub name: String,
    #[serde(default)]
    pub alias_names: Vec<String>,
    pub kind: MediaKind,
    #[serde(default)]
    pub year: Option<u16>,
}

impl SubtitleRecord {
    pub fn new(imdb_id: u32, name: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            imdb_id,
            name: name.into(),
            alias_names: Vec::new(),
            kind,
            year: None,
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_alias_names<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alias_names = aliases.into_iter().map(Into::into).collect();
        self
    }
}

impl Entity for SubtitleRecord {
    type Id = u32;

    fn identity(&self) -> u32 {
        self.imdb_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.alias_names
    }

    fn with_aliases(&self, aliases: Vec<String>) -> Self {
        Self {
            alias_names: aliases,
            ..self.clone()
        }
    }
}

impl Display for SubtitleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.name, year),
            None => f.write_str(&self.name),
        }
    }
}
