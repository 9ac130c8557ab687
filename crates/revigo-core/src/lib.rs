//! # revigo-core
//!
//! Core types, traits, and abstractions for revigo, the GO-term redundancy
//! reducer.
//!
//! This crate provides the data model shared by every other revigo crate:
//! GO terms and per-term statistics, the similarity matrix, ontology and
//! species-annotation snapshots, the [`SimilarityProvider`] seam with its
//! default information-content implementation, and parsing of submitted
//! term tables.
//!
//! ## Log level contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Job failed, no results produced |
//! | WARN  | Recoverable issue (skipped term, timeout), fallback applied |
//! | INFO  | Lifecycle events (snapshot loaded, job started/finished, export written) |
//! | DEBUG | Decision points, per-aspect sizes, cluster counts |
//! | TRACE | Per-term iteration (absorptions, word scores) |
//!
//! Structured fields keep the same names everywhere: `job_id`, `aspect`,
//! `term_id`, `term_count`, `duration_ms`, `status`, `error`.

pub mod defaults;
pub mod error;
pub mod information_content;
pub mod input;
pub mod models;
pub mod ontology;
pub mod similarity;
pub mod traits;
pub mod words;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use information_content::InformationContentSimilarity;
pub use input::{parse_term_table, InputRow, ParsedInput};
pub use models::*;
pub use ontology::{AnnotationSet, AnnotationSnapshot, Ontology, OntologySnapshot, SpeciesAnnotations};
pub use similarity::SimilarityMatrix;
pub use traits::{SimilarityProvider, SimilarityResult};
pub use words::{tokenize, WordBackground, WordCounts};
