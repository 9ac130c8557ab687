//! Job requests, handles, and completion records.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};

use revigo_core::defaults::{ALL_SPECIES_TAXON, CUTOFF};
use revigo_core::{Error, JobResults, JobStatus, Result, SimilarityMeasure, ValueType};

/// Everything needed to run one reduction job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Caller-assigned identifier, echoed in events and the completion.
    pub job_id: u32,
    /// Raw submitted term table.
    pub table: String,
    pub cutoff: f64,
    pub value_type: ValueType,
    pub measure: SimilarityMeasure,
    pub remove_obsolete: bool,
    /// Species taxon; 0 is the all-species union.
    pub taxon: u32,
    /// Overrides the orchestrator's default timeout.
    pub timeout: Option<Duration>,
    /// Compute 2-D coordinates for the scatterplot.
    pub projection: bool,
    /// Compute enrichment and correlation word clouds.
    pub word_clouds: bool,
}

impl JobRequest {
    /// Create a request with default parameters.
    pub fn new(job_id: u32, table: impl Into<String>) -> Self {
        Self {
            job_id,
            table: table.into(),
            cutoff: CUTOFF,
            value_type: ValueType::default(),
            measure: SimilarityMeasure::default(),
            remove_obsolete: true,
            taxon: ALL_SPECIES_TAXON,
            timeout: None,
            projection: true,
            word_clouds: true,
        }
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_measure(mut self, measure: SimilarityMeasure) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_remove_obsolete(mut self, remove: bool) -> Self {
        self.remove_obsolete = remove;
        self
    }

    pub fn with_taxon(mut self, taxon: u32) -> Self {
        self.taxon = taxon;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_projection(mut self, enabled: bool) -> Self {
        self.projection = enabled;
        self
    }

    pub fn with_word_clouds(mut self, enabled: bool) -> Self {
        self.word_clouds = enabled;
        self
    }

    /// Check parameters that do not depend on the ontology.
    pub fn validate(&self) -> Result<()> {
        if !(self.cutoff > 0.0 && self.cutoff <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "cutoff must be in (0, 1], got {}",
                self.cutoff
            )));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidInput("timeout must be positive".to_string()));
        }
        if self.table.trim().is_empty() {
            return Err(Error::InvalidInput("submitted table is empty".to_string()));
        }
        Ok(())
    }
}

/// Terminal record of one job, delivered exactly once.
#[derive(Debug, Clone)]
pub struct JobCompletion {
    pub job_id: u32,
    /// Finished, TimedOut or Failed.
    pub status: JobStatus,
    /// Wall-clock time from start of execution to completion.
    pub elapsed: Duration,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Present for Finished, and for TimedOut when partial results exist.
    pub results: Option<Arc<JobResults>>,
    /// Set for Failed, and for a TimedOut job that never yielded.
    pub error: Option<String>,
}

impl JobCompletion {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Finished
    }

    /// Whether there is anything to export.
    pub fn has_results(&self) -> bool {
        self.results.is_some()
    }
}

/// Caller's side of a submitted job.
///
/// The status can be polled at any time; the completion is handed out once,
/// either by [`JobHandle::try_completion`] or by [`JobHandle::wait`].
#[derive(Debug)]
pub struct JobHandle {
    job_id: u32,
    status_rx: watch::Receiver<JobStatus>,
    completion_rx: Option<oneshot::Receiver<JobCompletion>>,
}

impl JobHandle {
    pub(crate) fn new(
        job_id: u32,
        status_rx: watch::Receiver<JobStatus>,
        completion_rx: oneshot::Receiver<JobCompletion>,
    ) -> Self {
        Self {
            job_id,
            status_rx,
            completion_rx: Some(completion_rx),
        }
    }

    pub fn job_id(&self) -> u32 {
        self.job_id
    }

    /// Current lifecycle state.
    pub fn status(&self) -> JobStatus {
        *self.status_rx.borrow()
    }

    /// True once the completion is available.
    pub fn is_finished(&self) -> bool {
        self.status().is_terminal()
    }

    /// Take the completion if the job has finished; `None` while running or
    /// once it has already been taken.
    pub fn try_completion(&mut self) -> Option<JobCompletion> {
        let rx = self.completion_rx.as_mut()?;
        match rx.try_recv() {
            Ok(completion) => {
                self.completion_rx = None;
                Some(completion)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.completion_rx = None;
                Some(self.dropped())
            }
        }
    }

    /// Wait for the job to reach a terminal state.
    pub async fn wait(mut self) -> JobCompletion {
        let Some(rx) = self.completion_rx.take() else {
            return self.dropped_with("completion already taken");
        };
        match rx.await {
            Ok(completion) => completion,
            Err(_) => self.dropped(),
        }
    }

    fn dropped(&self) -> JobCompletion {
        self.dropped_with("job runner stopped without reporting")
    }

    fn dropped_with(&self, reason: &str) -> JobCompletion {
        let now = Utc::now();
        JobCompletion {
            job_id: self.job_id,
            status: JobStatus::Failed,
            elapsed: Duration::ZERO,
            started_at: now,
            completed_at: now,
            results: None,
            error: Some(reason.to_string()),
        }
    }
}
