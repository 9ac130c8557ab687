//! Orchestrator that runs reduction jobs concurrently.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::{broadcast, oneshot, watch, Semaphore};
use tracing::{debug, error, info, warn};

use revigo_core::defaults::{
    EVENT_BUS_CAPACITY, JOB_MAX_CONCURRENT, JOB_TIMEOUT_GRACE_MS, JOB_TIMEOUT_SECS,
};
use revigo_core::{AnnotationSet, InformationContentSimilarity, JobStatus, Ontology, SimilarityProvider};

use crate::job::{JobCompletion, JobHandle, JobRequest};
use crate::pipeline::{run_job, JobContext};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of jobs executing at once.
    pub max_concurrent_jobs: usize,
    /// Default per-job timeout.
    pub job_timeout: Duration,
    /// Extra time a job gets to yield after its deadline before it is
    /// abandoned.
    pub timeout_grace: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: JOB_MAX_CONCURRENT,
            job_timeout: Duration::from_secs(JOB_TIMEOUT_SECS),
            timeout_grace: Duration::from_millis(JOB_TIMEOUT_GRACE_MS),
        }
    }
}

impl OrchestratorConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `REVIGO_MAX_CONCURRENT_JOBS` | `4` | Max concurrently executing jobs |
    /// | `REVIGO_JOB_TIMEOUT_SECS` | `1200` | Default per-job timeout |
    /// | `REVIGO_TIMEOUT_GRACE_MS` | `2000` | Grace period before a job is abandoned |
    pub fn from_env() -> Self {
        let max_concurrent_jobs = std::env::var("REVIGO_MAX_CONCURRENT_JOBS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(JOB_MAX_CONCURRENT)
            .max(1);

        let job_timeout = std::env::var("REVIGO_JOB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(JOB_TIMEOUT_SECS);

        let timeout_grace = std::env::var("REVIGO_TIMEOUT_GRACE_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(JOB_TIMEOUT_GRACE_MS);

        Self {
            max_concurrent_jobs,
            job_timeout: Duration::from_secs(job_timeout),
            timeout_grace: Duration::from_millis(timeout_grace),
        }
    }

    /// Set maximum concurrent jobs.
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    /// Set the default per-job timeout.
    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Set the grace period after a deadline.
    pub fn with_timeout_grace(mut self, grace: Duration) -> Self {
        self.timeout_grace = grace;
        self
    }
}

/// Event emitted by the orchestrator.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A job acquired a slot and started executing.
    JobStarted { job_id: u32 },
    /// Job progress was updated.
    JobProgress {
        job_id: u32,
        percent: i32,
        message: Option<String>,
    },
    /// A job finished, possibly with partial results after a timeout.
    JobCompleted {
        job_id: u32,
        status: JobStatus,
        elapsed_ms: u64,
    },
    /// A job failed.
    JobFailed { job_id: u32, error: String },
}

/// Runs submitted jobs against a shared ontology and annotation set.
pub struct Orchestrator {
    config: OrchestratorConfig,
    ontology: Arc<Ontology>,
    annotations: Arc<AnnotationSet>,
    provider: Arc<dyn SimilarityProvider>,
    slots: Arc<Semaphore>,
    event_tx: broadcast::Sender<JobEvent>,
}

impl Orchestrator {
    /// Create an orchestrator using information-content similarity.
    pub fn new(
        config: OrchestratorConfig,
        ontology: Arc<Ontology>,
        annotations: Arc<AnnotationSet>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        let slots = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            config,
            ontology,
            annotations,
            provider: Arc::new(InformationContentSimilarity::new()),
            slots,
            event_tx,
        }
    }

    /// Replace the similarity provider.
    pub fn with_similarity_provider<P: SimilarityProvider + 'static>(mut self, provider: P) -> Self {
        debug!(provider = provider.name(), "Similarity provider registered");
        self.provider = Arc::new(provider);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Get a receiver for job events.
    pub fn events(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// Submit a job. It starts as soon as a slot is free.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: JobRequest) -> JobHandle {
        let job_id = request.job_id;
        let (status_tx, status_rx) = watch::channel(JobStatus::Created);
        let (done_tx, done_rx) = oneshot::channel();

        let runner = JobRunner {
            ontology: self.ontology.clone(),
            annotations: self.annotations.clone(),
            provider: self.provider.clone(),
            slots: self.slots.clone(),
            event_tx: self.event_tx.clone(),
            timeout: request.timeout.unwrap_or(self.config.job_timeout),
            grace: self.config.timeout_grace,
        };
        debug!(job_id, "Job submitted");
        tokio::spawn(runner.run(request, status_tx, done_tx));

        JobHandle::new(job_id, status_rx, done_rx)
    }
}

/// Reference bundle for executing a single job in a spawned task.
struct JobRunner {
    ontology: Arc<Ontology>,
    annotations: Arc<AnnotationSet>,
    provider: Arc<dyn SimilarityProvider>,
    slots: Arc<Semaphore>,
    event_tx: broadcast::Sender<JobEvent>,
    timeout: Duration,
    grace: Duration,
}

impl JobRunner {
    async fn run(
        self,
        request: JobRequest,
        status_tx: watch::Sender<JobStatus>,
        done_tx: oneshot::Sender<JobCompletion>,
    ) {
        let job_id = request.job_id;
        let _permit = match self.slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                error!(job_id, "Job slots closed before the job could start");
                return;
            }
        };

        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + self.timeout;
        status_tx.send_replace(JobStatus::Running);
        let _ = self.event_tx.send(JobEvent::JobStarted { job_id });
        info!(job_id, timeout_secs = self.timeout.as_secs_f64(), "Processing job");

        let progress_tx = self.event_tx.clone();
        let ctx = JobContext::new(job_id, deadline).with_progress_callback(move |percent, message| {
            let _ = progress_tx.send(JobEvent::JobProgress {
                job_id,
                percent,
                message: message.map(String::from),
            });
        });

        let ontology = self.ontology.clone();
        let annotations = self.annotations.clone();
        let provider = self.provider.clone();
        let task = tokio::task::spawn_blocking(move || {
            run_job(&ctx, &request, &ontology, &annotations, provider.as_ref())
        });

        let (status, results, error) = match tokio::time::timeout(self.timeout + self.grace, task).await {
            Ok(Ok(Ok(results))) => {
                let status = if results.complete {
                    JobStatus::Finished
                } else {
                    JobStatus::TimedOut
                };
                (status, Some(Arc::new(results)), None)
            }
            Ok(Ok(Err(e))) => (JobStatus::Failed, None, Some(e.to_string())),
            Ok(Err(join_error)) => (
                JobStatus::Failed,
                None,
                Some(format!("Job task panicked: {}", join_error)),
            ),
            Err(_) => (
                JobStatus::TimedOut,
                None,
                Some(format!(
                    "Job did not yield within {:.1}s of its deadline",
                    self.grace.as_secs_f64()
                )),
            ),
        };

        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;
        match (&status, &error) {
            (JobStatus::Failed, Some(message)) => {
                warn!(job_id, error = %message, duration_ms = elapsed_ms, "Job failed");
                let _ = self.event_tx.send(JobEvent::JobFailed {
                    job_id,
                    error: message.clone(),
                });
            }
            _ => {
                if status == JobStatus::TimedOut {
                    warn!(job_id, duration_ms = elapsed_ms, "Job timed out");
                } else {
                    info!(job_id, duration_ms = elapsed_ms, "Job completed successfully");
                }
                let _ = self.event_tx.send(JobEvent::JobCompleted {
                    job_id,
                    status,
                    elapsed_ms,
                });
            }
        }

        let completion = JobCompletion {
            job_id,
            status,
            elapsed,
            started_at,
            completed_at: Utc::now(),
            results,
            error,
        };
        if done_tx.send(completion).is_err() {
            debug!(job_id, "Job handle dropped before completion");
        }
        status_tx.send_replace(status);
    }
}
