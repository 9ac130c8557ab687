//! # revigo-jobs
//!
//! Concurrent reduction jobs for revigo.
//!
//! This crate provides:
//! - Job requests with validated parameters
//! - A bounded pool of concurrently executing jobs over shared, read-only
//!   ontology and annotation data
//! - Per-job deadlines with partial results on timeout
//! - Exactly-once completion delivery per job, plus progress events via a
//!   broadcast channel
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use revigo_jobs::{JobRequest, Orchestrator, OrchestratorConfig};
//!
//! let orchestrator = Orchestrator::new(
//!     OrchestratorConfig::from_env(),
//!     Arc::new(ontology),
//!     Arc::new(annotations),
//! );
//!
//! let handle = orchestrator.submit(JobRequest::new(1, table).with_cutoff(0.5));
//! let completion = handle.wait().await;
//! if let Some(results) = completion.results {
//!     println!("{} terms", results.term_count());
//! }
//! ```

pub mod job;
pub mod pipeline;
pub mod worker;

// Re-export core types
pub use revigo_core::*;

// Re-export job types
pub use job::{JobCompletion, JobHandle, JobRequest};
pub use pipeline::{run_job, JobContext, ProgressCallback};
pub use worker::{JobEvent, Orchestrator, OrchestratorConfig};
