//! Error types for revigo.

use thiserror::Error;

use crate::models::{Aspect, GoTermId, SimilarityMeasure};

/// Result type alias using revigo's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for revigo operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed submitted data or job parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Term identifier does not resolve in the ontology
    #[error("Term not found in ontology: {0}")]
    TermNotFound(GoTermId),

    /// Similarity measure cannot be evaluated for the aspect
    #[error("Similarity measure {measure} unsupported for {aspect}")]
    UnsupportedMeasure {
        measure: SimilarityMeasure,
        aspect: Aspect,
    },

    /// No annotation set for the requested species taxon
    #[error("No annotations for species taxon {0}")]
    UnknownTaxon(u32),

    /// Ontology or annotation snapshot is inconsistent
    #[error("Ontology error: {0}")]
    Ontology(String),

    /// Exporter failed to render output
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Input error tied to a 1-based line of the submitted table.
    pub fn at_line(line: usize, message: impl std::fmt::Display) -> Self {
        Error::InvalidInput(format!("line {}: {}", line, message))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
