// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use namesake::dataset::{DatasetProvider, JsonDumpProvider};
use namesake::error::{ConfigurationError, DatasetUnavailable, ReconcileError, SearchError};
use namesake::metric::{series_match_metric, subtitle_match_metric, SimilarityMetric};
use namesake::reconcile::{MergedResult, Reconciler, ReconcilerOptions};
use namesake::registry::IndexRegistry;
use namesake::{Entity, IndexOptions, LocalSearchIndex, SeriesRecord, SubtitleRecord, WorkerPool};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::display::{
    pad_right, row, score_value, section_bot, section_top, source_badge, themed, timing_ms, truncate, GRAY,
};
use cli::{Cli, Commands, Kind};

const NAME_WIDTH: usize = 44;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Dataset(#[from] DatasetUnavailable),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

struct SearchRequest {
    dump: PathBuf,
    query: String,
    min_similarity: Option<f32>,
    limit: usize,
    also: Vec<PathBuf>,
    timeout_ms: Option<u64>,
    threads: usize,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Search {
            dump,
            query,
            kind,
            min_similarity,
            limit,
            also,
            timeout_ms,
            threads,
        } => {
            let request = SearchRequest {
                dump,
                query,
                min_similarity,
                limit,
                also,
                timeout_ms,
                threads,
            };
            match kind {
                Kind::Series => run_search::<SeriesRecord>(&request, series_match_metric(), IndexOptions::strict()),
                Kind::Subtitle => {
                    run_search::<SubtitleRecord>(&request, subtitle_match_metric(), IndexOptions::default())
                }
            }
        }
        Commands::Inspect { dump, kind } => match kind {
            Kind::Series => run_inspect::<SeriesRecord>(&dump),
            Kind::Subtitle => run_inspect::<SubtitleRecord>(&dump),
        },
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run_search<T>(
    request: &SearchRequest,
    metric: Arc<dyn SimilarityMetric>,
    defaults: IndexOptions,
) -> Result<(), CliError>
where
    T: Entity + DeserializeOwned + Display + 'static,
{
    let mut options = defaults.with_result_limit(request.limit);
    if let Some(min_similarity) = request.min_similarity {
        options = options.with_min_similarity(min_similarity);
    }
    options.validate()?;
    let pool = WorkerPool::new(request.threads)?;

    if request.also.is_empty() {
        search_single::<T>(request, metric, options, pool)
    } else {
        search_reconciled::<T>(request, metric, options, pool)
    }
}

fn search_single<T>(
    request: &SearchRequest,
    metric: Arc<dyn SimilarityMetric>,
    options: IndexOptions,
    pool: WorkerPool,
) -> Result<(), CliError>
where
    T: Entity + DeserializeOwned + Display + 'static,
{
    let start = Instant::now();
    let records = JsonDumpProvider::<T>::new(&request.dump).load()?;
    let index = LocalSearchIndex::build_with(records, T::effective_names, options, pool)?
        .with_metric(metric)
        .named(source_name(&request.dump));
    let build_ms = start.elapsed().as_secs_f64() * 1000.0;

    let start = Instant::now();
    let results = index.search_scored(&request.query)?;
    let search_ms = start.elapsed().as_secs_f64() * 1000.0;

    section_top(&format!("{} matches for \"{}\"", results.len(), request.query));
    for (rank, candidate) in results.iter().enumerate() {
        row(&format!(
            " {:>3}. {}  {} {}",
            rank + 1,
            score_value(candidate.score),
            pad_right(&truncate(&candidate.record.to_string(), NAME_WIDTH), NAME_WIDTH),
            themed(GRAY, &[], &format!("{:?}", candidate.record.identity()))
        ));
    }
    row("");
    row(&format!(
        " {} records indexed in {}, searched in {}",
        index.len(),
        timing_ms(build_ms),
        timing_ms(search_ms)
    ));
    section_bot();
    Ok(())
}

fn search_reconciled<T>(
    request: &SearchRequest,
    metric: Arc<dyn SimilarityMetric>,
    options: IndexOptions,
    pool: WorkerPool,
) -> Result<(), CliError>
where
    T: Entity + DeserializeOwned + Display + 'static,
{
    let mut reconciler = Reconciler::<T>::new(Arc::clone(&metric))
        .with_pool(pool.clone())
        .with_options(ReconcilerOptions {
            timeout_ms: request.timeout_ms,
        });
    for path in std::iter::once(&request.dump).chain(&request.also) {
        let registry = IndexRegistry::new(JsonDumpProvider::<T>::new(path), options)
            .named(source_name(path))
            .with_metric(Arc::clone(&metric))
            .with_pool(pool.clone());
        reconciler = reconciler.with_source(Arc::new(registry));
    }

    let start = Instant::now();
    let results = reconciler.resolve_merged(&request.query)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let sources: Vec<String> = reconciler.sources().iter().map(|s| s.name().to_string()).collect();
    section_top(&format!("{} merged results for \"{}\"", results.len(), request.query));
    for (rank, candidate) in results.iter().enumerate() {
        print_merged(rank, candidate.score, &candidate.record);
    }
    row("");
    row(&format!(
        " {} reconciled in {}",
        sources.iter().map(|s| source_badge(s)).collect::<Vec<_>>().join(" "),
        timing_ms(elapsed_ms)
    ));
    section_bot();
    Ok(())
}

fn print_merged<T: Entity + Display>(rank: usize, score: f32, merged: &MergedResult<T>) {
    row(&format!(
        " {:>3}. {}  {} {}",
        rank + 1,
        score_value(score),
        pad_right(&truncate(&merged.primary().to_string(), NAME_WIDTH), NAME_WIDTH),
        themed(GRAY, &[], &format!("{:?} x{}", merged.primary().identity(), merged.contributors()))
    ));
    if !merged.aliases().is_empty() {
        let aliases = truncate(&merged.aliases().join(", "), NAME_WIDTH + 10);
        row(&format!("            aka {}", themed(GRAY, &[], &aliases)));
    }
}

fn run_inspect<T>(dump: &Path) -> Result<(), CliError>
where
    T: Entity + DeserializeOwned + 'static,
{
    let start = Instant::now();
    let records = JsonDumpProvider::<T>::new(dump).load()?;
    let load_ms = start.elapsed().as_secs_f64() * 1000.0;

    let identities: HashSet<T::Id> = records.iter().map(Entity::identity).collect();
    let with_aliases = records.iter().filter(|r| !r.aliases().is_empty()).count();

    let start = Instant::now();
    let index = LocalSearchIndex::from_entities(records, IndexOptions::default())?;
    let build_ms = start.elapsed().as_secs_f64() * 1000.0;

    let fields: usize = index.entries().iter().map(|e| e.fields().len()).sum();
    let empty = index.entries().iter().filter(|e| e.fields().is_empty()).count();

    section_top(&dump.display().to_string());
    row(&format!(" {} {}", pad_right("records", 22), index.len()));
    row(&format!(" {} {}", pad_right("distinct identities", 22), identities.len()));
    row(&format!(" {} {}", pad_right("records with aliases", 22), with_aliases));
    row(&format!(" {} {}", pad_right("searchable names", 22), fields));
    row(&format!(" {} {}", pad_right("unsearchable records", 22), empty));
    row("");
    row(&format!(" loaded in {}, indexed in {}", timing_ms(load_ms), timing_ms(build_ms)));
    section_bot();
    Ok(())
}

fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
