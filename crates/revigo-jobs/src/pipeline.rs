//! The stages of one job: parse, compare, reduce, project, count words.
//!
//! Everything here is synchronous and CPU-bound; the orchestrator runs it on
//! the blocking pool.

use std::time::Instant;

use tracing::{debug, info, warn};

use revigo_core::{
    parse_term_table, AnnotationSet, Aspect, AspectResult, Error, InputRow, JobResults, Ontology,
    Result, SimilarityMatrix, SimilarityProvider, TermProperties, TermStats,
};
use revigo_reduce::{assign_coordinates, word_clouds, Reducer};

use crate::job::JobRequest;

/// Progress callback type for a running job.
pub type ProgressCallback = Box<dyn Fn(i32, Option<&str>) + Send + Sync>;

/// Context provided to a running job.
pub struct JobContext {
    pub job_id: u32,
    /// Past this instant the job stops clustering and finalizes.
    deadline: Instant,
    progress_callback: Option<ProgressCallback>,
}

impl JobContext {
    pub fn new(job_id: u32, deadline: Instant) -> Self {
        Self {
            job_id,
            deadline,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(i32, Option<&str>) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Report progress to the callback.
    pub fn report_progress(&self, percent: i32, message: Option<&str>) {
        if let Some(ref callback) = self.progress_callback {
            callback(percent, message);
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Run every stage of `request`.
///
/// Hitting the deadline is not an error: whatever was reached is returned
/// with `complete == false`, and later aspects are returned unclustered.
pub fn run_job(
    ctx: &JobContext,
    request: &JobRequest,
    ontology: &Ontology,
    annotations: &AnnotationSet,
    provider: &dyn SimilarityProvider,
) -> Result<JobResults> {
    request.validate()?;
    let species = annotations.get_by_taxon(request.taxon)?;
    let parsed = parse_term_table(&request.table, ontology, request.remove_obsolete)?;
    for warning in &parsed.warnings {
        warn!(job_id = ctx.job_id, "{}", warning);
    }
    ctx.report_progress(10, Some("Table parsed"));

    let groups = group_by_aspect(&parsed.rows, ontology);
    let reducer = Reducer::new(request.cutoff, request.value_type).with_deadline(Some(ctx.deadline()));
    let mut aspects = Vec::with_capacity(groups.len());
    let mut complete = true;

    for (step, (aspect, rows)) in groups.into_iter().enumerate() {
        let ids: Vec<_> = rows.iter().map(|r| r.term_id).collect();
        let result = if ctx.is_expired() {
            warn!(
                job_id = ctx.job_id,
                aspect = aspect.code(),
                term_count = rows.len(),
                "Deadline passed before aspect was compared, left unclustered"
            );
            unclustered(aspect, rows)
        } else {
            let similarity = provider.compute(ontology, &species, aspect, &ids, request.measure)?;
            if similarity.stats.len() != ids.len() {
                return Err(Error::Internal(format!(
                    "{} provider returned {} term stats for {} {} terms",
                    provider.name(),
                    similarity.stats.len(),
                    ids.len(),
                    aspect.code()
                )));
            }
            let terms = rows
                .into_iter()
                .zip(similarity.stats)
                .map(|(row, stats)| TermProperties::new(row.term_id, row.value, row.user_values, stats))
                .collect();
            let reduction = reducer.reduce(terms, &similarity.matrix)?;
            debug!(
                job_id = ctx.job_id,
                aspect = aspect.code(),
                term_count = reduction.terms.len(),
                cluster_count = reduction.cluster_count,
                "Aspect reduced"
            );
            AspectResult {
                aspect,
                terms: reduction.terms,
                similarity: similarity.matrix,
                complete: reduction.complete,
            }
        };
        complete &= result.complete;
        aspects.push(result);
        ctx.report_progress(
            10 + (70 * (step as i32 + 1)) / Aspect::ALL.len() as i32,
            Some(aspect.code()),
        );
    }

    if ctx.is_expired() {
        complete = false;
    }

    let mut results = JobResults {
        job_id: request.job_id,
        cutoff: request.cutoff,
        value_type: request.value_type,
        measure: request.measure,
        min_num_cols: parsed.min_num_cols,
        aspects,
        enrichments: Vec::new(),
        correlations: Vec::new(),
        warnings: parsed.warnings,
        complete,
    };

    if complete {
        if request.projection {
            for aspect in &mut results.aspects {
                let similarity = &aspect.similarity;
                assign_coordinates(&mut aspect.terms, similarity);
            }
            ctx.report_progress(90, Some("Projected"));
        }
        if request.word_clouds {
            let clouds = word_clouds(ontology, &results.aspects, request.value_type);
            results.enrichments = clouds.enrichments;
            results.correlations = clouds.correlations;
        }
    } else {
        results
            .warnings
            .push("job timed out, results are not exhaustive".to_string());
    }

    ctx.report_progress(100, Some("Done"));
    info!(
        job_id = ctx.job_id,
        term_count = results.term_count(),
        complete,
        "Job stages finished"
    );
    Ok(results)
}

/// Rows per aspect in BP, CC, MF order; empty aspects are left out.
fn group_by_aspect(rows: &[InputRow], ontology: &Ontology) -> Vec<(Aspect, Vec<InputRow>)> {
    Aspect::ALL
        .iter()
        .map(|&aspect| {
            let members: Vec<InputRow> = rows
                .iter()
                .filter(|r| ontology.term(r.term_id).is_some_and(|t| t.aspect == aspect))
                .cloned()
                .collect();
            (aspect, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

/// Aspect result for terms the deadline kept from being compared.
fn unclustered(aspect: Aspect, rows: Vec<InputRow>) -> AspectResult {
    let ids = rows.iter().map(|r| r.term_id).collect();
    let stats = TermStats {
        log_annotation_size: 0.0,
        annotation_frequency: 0.0,
    };
    AspectResult {
        aspect,
        terms: rows
            .into_iter()
            .map(|row| TermProperties::new(row.term_id, row.value, row.user_values, stats))
            .collect(),
        similarity: SimilarityMatrix::identity(ids),
        complete: false,
    }
}
