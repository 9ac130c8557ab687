//! revigo: reduce redundancy in lists of GO terms from the command line.
//!
//! Each input table becomes one job; all jobs run concurrently against the
//! same ontology and annotation snapshots, and every finished job is
//! exported into the output directory.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use futures::future::join_all;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revigo_core::defaults::{ALL_SPECIES_TAXON, CUTOFF};
use revigo_core::{AnnotationSet, JobStatus, Ontology, SimilarityMeasure, ValueType};
use revigo_export::{write_files, ExportKind};
use revigo_jobs::{JobCompletion, JobRequest, Orchestrator, OrchestratorConfig};

#[derive(Debug, Parser)]
#[command(name = "revigo")]
#[command(author, version, about = "Reduce redundancy in lists of GO terms")]
struct Cli {
    /// Ontology snapshot (JSON)
    #[arg(long)]
    ontology: PathBuf,

    /// Species annotation snapshot (JSON)
    #[arg(long)]
    annotations: PathBuf,

    /// Species taxon; 0 uses all species together
    #[arg(long, default_value_t = ALL_SPECIES_TAXON)]
    species: u32,

    /// Term tables to reduce, one job each (can specify multiple)
    #[arg(short, long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Similarity cutoff in (0, 1]; smaller reduces more
    #[arg(long, default_value_t = CUTOFF)]
    cutoff: f64,

    /// How to read the value column: p-value, higher, lower, higher-absolute, higher-abs-log2
    #[arg(long, default_value = "p-value")]
    value_type: ValueType,

    /// Similarity measure: sim-rel, lin, resnik, jiang
    #[arg(long, default_value = "sim-rel")]
    measure: SimilarityMeasure,

    /// Keep obsolete terms instead of dropping them
    #[arg(long)]
    keep_obsolete: bool,

    /// Per-job timeout in seconds (default from REVIGO_JOB_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Maximum concurrently running jobs (default from REVIGO_MAX_CONCURRENT_JOBS)
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Formats to write, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "table,scatterplot,treemap,simmat,xgmml,wordcloud"
    )]
    export: Vec<ExportKind>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

const DEFAULT_LOG_FILTER: &str = "revigo=info,revigo_core=info,revigo_jobs=info,revigo_export=info";

fn init_logging() {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "revigo=info,revigo_core=info,revigo_jobs=info,revigo_export=info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        if let Some(ansi) = log_ansi {
            layer = layer.with_ansi(ansi);
        }
        registry.with(layer).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run every job and export the results; `Ok(false)` when any job failed.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let ontology = Ontology::from_path(&cli.ontology)
        .with_context(|| format!("loading ontology {}", cli.ontology.display()))?;
    let annotations = AnnotationSet::from_path(&cli.annotations)
        .with_context(|| format!("loading annotations {}", cli.annotations.display()))?;
    annotations
        .get_by_taxon(cli.species)
        .context("selecting species")?;
    info!(
        terms = ontology.len(),
        version = ontology.version().unwrap_or("unknown"),
        species = annotations.len(),
        "Snapshots loaded"
    );

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let mut config = OrchestratorConfig::from_env();
    if let Some(max) = cli.max_concurrent {
        config = config.with_max_concurrent(max);
    }
    let ontology = Arc::new(ontology);
    let orchestrator = Orchestrator::new(config, ontology.clone(), Arc::new(annotations));

    let mut stems = Vec::with_capacity(cli.input.len());
    let mut handles = Vec::with_capacity(cli.input.len());
    let mut all_ok = true;
    for ((index, path), stem) in cli.input.iter().enumerate().zip(output_stems(&cli.input)) {
        let job_id = index as u32 + 1;
        let table = match std::fs::read_to_string(path) {
            Ok(table) => table,
            Err(e) => {
                error!(job_id, path = %path.display(), error = %e, "Cannot read input table");
                eprintln!("Job {} ({}): cannot read input: {}", job_id, path.display(), e);
                all_ok = false;
                continue;
            }
        };
        stems.push(stem);
        handles.push(orchestrator.submit(build_request(&cli, job_id, table)));
    }

    let completions = join_all(handles.into_iter().map(|h| h.wait())).await;
    for (stem, completion) in stems.iter().zip(completions) {
        all_ok &= report(&cli, &ontology, stem, &completion);
    }
    Ok(all_ok)
}

fn build_request(cli: &Cli, job_id: u32, table: String) -> JobRequest {
    let mut request = JobRequest::new(job_id, table)
        .with_cutoff(cli.cutoff)
        .with_value_type(cli.value_type)
        .with_measure(cli.measure)
        .with_remove_obsolete(!cli.keep_obsolete)
        .with_taxon(cli.species)
        .with_projection(cli.export.contains(&ExportKind::Scatterplot))
        .with_word_clouds(cli.export.contains(&ExportKind::WordCloud));
    if let Some(secs) = cli.timeout_secs {
        request = request.with_timeout(Duration::from_secs(secs.max(1)));
    }
    request
}

/// Print the outcome of one job and export it; `false` when the job or its
/// export failed.
fn report(cli: &Cli, ontology: &Ontology, stem: &str, completion: &JobCompletion) -> bool {
    let seconds = completion.elapsed.as_secs_f64();
    let Some(results) = completion.results.as_ref() else {
        let reason = completion.error.as_deref().unwrap_or("no results");
        eprintln!("Job {} ({}) {} after {:.2}s: {}", completion.job_id, stem, completion.status, seconds, reason);
        return completion.status != JobStatus::Failed;
    };

    for warning in &results.warnings {
        warn!(job_id = completion.job_id, "{}", warning);
    }
    let written = match write_files(&cli.out_dir, stem, ontology, results, &cli.export) {
        Ok(written) => written,
        Err(e) => {
            error!(job_id = completion.job_id, error = %e, "Export failed");
            eprintln!("Job {} ({}) export failed: {}", completion.job_id, stem, e);
            return false;
        }
    };
    println!(
        "Job {} ({}) {} in {:.2}s: {} terms, {} files",
        completion.job_id,
        stem,
        completion.status,
        seconds,
        results.term_count(),
        written.len()
    );
    true
}

/// Output stem per input; inputs sharing a stem get their job id appended.
fn output_stems(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = inputs
        .iter()
        .enumerate()
        .map(|(index, path)| output_stem(path, index as u32 + 1))
        .collect();
    stems
        .iter()
        .enumerate()
        .map(|(index, stem)| {
            if stems.iter().filter(|s| *s == stem).count() > 1 {
                format!("{}_job{}", stem, index + 1)
            } else {
                stem.clone()
            }
        })
        .collect()
}

/// File stem of the input, or `job<id>` when it has none.
fn output_stem(path: &Path, job_id: u32) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("job{}", job_id))
}
