//! Information-content semantic similarity (SimRel, Lin, Resnik, Jiang).
//!
//! Term probability is the share of the aspect's annotations that reach the
//! term, with one pseudo-annotation so that unannotated terms stay finite:
//! `p(t) = (count(t) + 1) / (total + 1)`, `IC(t) = -ln p(t)`. Pairwise scores
//! use the most informative common ancestor (MICA).

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Aspect, GoTermId, SimilarityMeasure, TermStats};
use crate::ontology::{Ontology, SpeciesAnnotations};
use crate::similarity::SimilarityMatrix;
use crate::traits::{SimilarityProvider, SimilarityResult};

/// Default [`SimilarityProvider`] backed by annotation counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct InformationContentSimilarity;

/// Per-term data gathered once before the pairwise loop.
struct TermInfo {
    ancestors: HashSet<GoTermId>,
    ic: f64,
}

impl InformationContentSimilarity {
    pub fn new() -> Self {
        Self
    }

    fn probability(count: u64, total: u64) -> f64 {
        ((count + 1) as f64 / (total + 1) as f64).min(1.0)
    }

    /// Score one pair from the ICs of both terms and of their MICA.
    fn score(measure: SimilarityMeasure, ic_a: f64, ic_b: f64, ic_mica: f64, ic_max: f64) -> f64 {
        let lin = || {
            let denom = ic_a + ic_b;
            if denom > 0.0 {
                2.0 * ic_mica / denom
            } else {
                // Both terms are as general as the root
                1.0
            }
        };
        match measure {
            SimilarityMeasure::Lin => lin(),
            SimilarityMeasure::SimRel => lin() * (1.0 - (-ic_mica).exp()),
            SimilarityMeasure::Resnik => {
                if ic_max > 0.0 {
                    ic_mica / ic_max
                } else {
                    0.0
                }
            }
            SimilarityMeasure::Jiang => {
                if ic_max > 0.0 {
                    1.0 - (ic_a + ic_b - 2.0 * ic_mica) / (2.0 * ic_max)
                } else {
                    0.0
                }
            }
        }
    }
}

impl SimilarityProvider for InformationContentSimilarity {
    fn compute(
        &self,
        ontology: &Ontology,
        annotations: &SpeciesAnnotations,
        aspect: Aspect,
        terms: &[GoTermId],
        measure: SimilarityMeasure,
    ) -> Result<SimilarityResult> {
        let total = annotations.aspect_total(ontology, aspect);
        if total == 0 && !terms.is_empty() {
            return Err(Error::UnsupportedMeasure { measure, aspect });
        }
        let ic_max = -Self::probability(0, total).ln();
        let ic_of = |id: GoTermId| -Self::probability(annotations.count(id), total).ln();

        let mut infos = Vec::with_capacity(terms.len());
        let mut stats = Vec::with_capacity(terms.len());
        for &id in terms {
            let term = ontology.term(id).ok_or(Error::TermNotFound(id))?;
            if term.aspect != aspect {
                return Err(Error::InvalidInput(format!(
                    "{} belongs to {}, not {}",
                    id, term.aspect, aspect
                )));
            }
            let count = annotations.count(term.id);
            stats.push(TermStats {
                log_annotation_size: ((count + 1) as f64).log10(),
                annotation_frequency: Self::probability(count, total),
            });
            infos.push(TermInfo {
                ancestors: ontology.ancestors(term.id),
                ic: ic_of(term.id),
            });
        }

        let matrix = SimilarityMatrix::from_fn(terms.to_vec(), |i, j| {
            let (a, b) = (&infos[i], &infos[j]);
            let ic_mica = a
                .ancestors
                .intersection(&b.ancestors)
                .map(|&anc| ic_of(anc))
                .fold(0.0_f64, f64::max);
            Self::score(measure, a.ic, b.ic, ic_mica, ic_max)
        });

        debug!(
            aspect = aspect.code(),
            measure = %measure,
            term_count = terms.len(),
            annotation_total = total,
            "Similarity matrix computed"
        );

        Ok(SimilarityResult { matrix, stats })
    }

    fn name(&self) -> &str {
        "information_content"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoTerm;
    use std::collections::HashMap;

    fn term(id: u32, aspect: Aspect, parents: &[u32]) -> GoTerm {
        GoTerm {
            id: GoTermId(id),
            name: format!("term {}", id),
            aspect,
            obsolete: false,
            parents: parents.iter().map(|p| GoTermId(*p)).collect(),
            alt_ids: Vec::new(),
        }
    }

    /// root(1) <- a(2) <- {b(3), c(4)}; root <- d(5); cc root 10.
    fn fixture() -> (Ontology, SpeciesAnnotations) {
        let ontology = Ontology::from_terms(vec![
            term(1, Aspect::BiologicalProcess, &[]),
            term(2, Aspect::BiologicalProcess, &[1]),
            term(3, Aspect::BiologicalProcess, &[2]),
            term(4, Aspect::BiologicalProcess, &[2]),
            term(5, Aspect::BiologicalProcess, &[1]),
            term(10, Aspect::CellularComponent, &[]),
        ])
        .unwrap();
        let annotations = SpeciesAnnotations {
            taxon: 1,
            name: "test".to_string(),
            counts: HashMap::from([
                (GoTermId(1), 1000),
                (GoTermId(2), 100),
                (GoTermId(3), 10),
                (GoTermId(4), 20),
                (GoTermId(5), 500),
            ]),
        };
        (ontology, annotations)
    }

    fn ids(raw: &[u32]) -> Vec<GoTermId> {
        raw.iter().map(|i| GoTermId(*i)).collect()
    }

    #[test]
    fn test_siblings_more_similar_than_distant_terms() {
        let (ontology, annotations) = fixture();
        let provider = InformationContentSimilarity::new();
        for measure in [
            SimilarityMeasure::SimRel,
            SimilarityMeasure::Lin,
            SimilarityMeasure::Resnik,
            SimilarityMeasure::Jiang,
        ] {
            let result = provider
                .compute(
                    &ontology,
                    &annotations,
                    Aspect::BiologicalProcess,
                    &ids(&[3, 4, 5]),
                    measure,
                )
                .unwrap();
            let m = &result.matrix;
            assert!(m.get(0, 1) > m.get(0, 2), "{} siblings vs distant", measure);
            for i in 0..3 {
                assert_eq!(m.get(i, i), 1.0);
                for j in 0..3 {
                    assert!((0.0..=1.0).contains(&m.get(i, j)));
                }
            }
        }
    }

    #[test]
    fn test_root_as_mica_scores_zero_for_resnik() {
        let (ontology, annotations) = fixture();
        let result = InformationContentSimilarity
            .compute(
                &ontology,
                &annotations,
                Aspect::BiologicalProcess,
                &ids(&[3, 5]),
                SimilarityMeasure::Resnik,
            )
            .unwrap();
        // Root holds every annotation, so its IC is ~0
        assert!(result.matrix.get(0, 1) < 1e-3);
    }

    #[test]
    fn test_stats_reported_per_term() {
        let (ontology, annotations) = fixture();
        let result = InformationContentSimilarity
            .compute(
                &ontology,
                &annotations,
                Aspect::BiologicalProcess,
                &ids(&[3, 5]),
                SimilarityMeasure::Lin,
            )
            .unwrap();
        assert_eq!(result.stats.len(), 2);
        assert!((result.stats[0].log_annotation_size - 11f64.log10()).abs() < 1e-12);
        assert!((result.stats[1].annotation_frequency - 501.0 / 1001.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_term_fails() {
        let (ontology, annotations) = fixture();
        let err = InformationContentSimilarity
            .compute(
                &ontology,
                &annotations,
                Aspect::BiologicalProcess,
                &ids(&[3, 999]),
                SimilarityMeasure::Lin,
            )
            .unwrap_err();
        assert!(matches!(err, Error::TermNotFound(GoTermId(999))));
    }

    #[test]
    fn test_unannotated_aspect_is_unsupported() {
        let (ontology, annotations) = fixture();
        let err = InformationContentSimilarity
            .compute(
                &ontology,
                &annotations,
                Aspect::CellularComponent,
                &ids(&[10]),
                SimilarityMeasure::SimRel,
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMeasure { .. }));
    }

    #[test]
    fn test_wrong_aspect_is_rejected() {
        let (ontology, annotations) = fixture();
        let err = InformationContentSimilarity
            .compute(
                &ontology,
                &annotations,
                Aspect::BiologicalProcess,
                &ids(&[10]),
                SimilarityMeasure::SimRel,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_term_list() {
        let (ontology, annotations) = fixture();
        let result = InformationContentSimilarity
            .compute(
                &ontology,
                &annotations,
                Aspect::CellularComponent,
                &[],
                SimilarityMeasure::SimRel,
            )
            .unwrap();
        assert!(result.matrix.is_empty());
        assert!(result.stats.is_empty());
    }
}
