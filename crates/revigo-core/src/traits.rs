//! Collaborator traits for revigo.

use crate::error::Result;
use crate::models::{Aspect, GoTermId, SimilarityMeasure, TermStats};
use crate::ontology::{Ontology, SpeciesAnnotations};
use crate::similarity::SimilarityMatrix;

/// Output of a [`SimilarityProvider`] for one aspect.
#[derive(Debug, Clone)]
pub struct SimilarityResult {
    /// Rows in the order the terms were passed in.
    pub matrix: SimilarityMatrix,
    /// One entry per term, same order.
    pub stats: Vec<TermStats>,
}

/// Computes pairwise semantic similarity between GO terms of one aspect.
///
/// Implementations must be deterministic and must not mutate the shared
/// ontology or annotations.
pub trait SimilarityProvider: Send + Sync {
    /// Evaluate `measure` between every pair of `terms`.
    ///
    /// Fails with `TermNotFound` for an id absent from `ontology`, and with
    /// `UnsupportedMeasure` when the measure cannot be evaluated for `aspect`.
    fn compute(
        &self,
        ontology: &Ontology,
        annotations: &SpeciesAnnotations,
        aspect: Aspect,
        terms: &[GoTermId],
        measure: SimilarityMeasure,
    ) -> Result<SimilarityResult>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
