// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the namesake command-line interface.
//!
//! Two subcommands: `search` runs a fuzzy query against a JSON data dump (or
//! reconciles several dumps), and `inspect` summarizes what a dump would index.

pub mod display;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "namesake",
    about = "Fuzzy title search and multi-source reconciliation over data dumps",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Record layout of a data dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    /// TV series dump: `{"id", "name", "aliasNames"}`
    Series,
    /// Subtitle title dump: `{"imdbId", "name", "aliasNames", "kind", "year"}`
    Subtitle,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a JSON data dump and display ranked matches
    Search {
        /// Path to the JSON dump (an array of records)
        dump: PathBuf,

        /// Search query
        query: String,

        /// Record layout of the dump
        #[arg(short, long, value_enum, default_value = "series")]
        kind: Kind,

        /// Similarity a non-substring match must exceed (defaults per kind)
        #[arg(long)]
        min_similarity: Option<f32>,

        /// Maximum number of results per source
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Additional dumps to reconcile with the first, in priority order
        ///
        /// When given, every dump is queried concurrently and records sharing
        /// an identity are merged into one result with the union of aliases.
        #[arg(long = "also")]
        also: Vec<PathBuf>,

        /// Give up on sources that have not answered after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Worker threads (0 = one per core)
        #[arg(long, default_value = "0")]
        threads: usize,
    },

    /// Summarize a JSON data dump
    Inspect {
        /// Path to the JSON dump
        dump: PathBuf,

        /// Record layout of the dump
        #[arg(short, long, value_enum, default_value = "series")]
        kind: Kind,
    },
}
