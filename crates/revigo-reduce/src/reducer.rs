//! Greedy redundancy reduction over a dense similarity matrix.
//!
//! Terms are ranked by their primary value; walking that ranking, every
//! term that has not been absorbed yet absorbs all lower-ranked, unabsorbed
//! terms whose similarity to it reaches the cutoff. A representative is
//! therefore never absorbed itself, so there are no representative chains.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, trace, warn};

use revigo_core::{Error, Result, SimilarityMatrix, TermProperties, ValueDirection, ValueType};

/// Outcome of one reduction run.
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Cluster-sorted terms.
    pub terms: Vec<TermProperties>,
    /// Representatives that absorbed at least one term.
    pub cluster_count: usize,
    /// False when the deadline stopped clustering early.
    pub complete: bool,
}

/// Clusters one aspect's terms.
#[derive(Debug, Clone)]
pub struct Reducer {
    cutoff: f64,
    value_type: ValueType,
    deadline: Option<Instant>,
}

impl Reducer {
    pub fn new(cutoff: f64, value_type: ValueType) -> Self {
        Self {
            cutoff,
            value_type,
            deadline: None,
        }
    }

    /// Stop absorbing once `deadline` passes; the rest stay unclustered.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Reduce `terms`, whose ids must all be rows of `similarity`.
    ///
    /// Uniqueness is taken over `terms` only, so a caller may reduce a
    /// subset of the matrix.
    pub fn reduce(
        &self,
        terms: Vec<TermProperties>,
        similarity: &SimilarityMatrix,
    ) -> Result<Reduction> {
        if !(self.cutoff > 0.0 && self.cutoff <= 1.0) {
            return Err(Error::InvalidInput(format!(
                "cutoff must be in (0, 1], got {}",
                self.cutoff
            )));
        }

        let row_of: HashMap<_, _> = similarity
            .ids()
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        let rows = terms
            .iter()
            .map(|t| {
                row_of.get(&t.term_id).copied().ok_or_else(|| {
                    Error::InvalidInput(format!("{} has no similarity row", t.term_id))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        let n = terms.len();
        let order = priority_order(&terms, self.value_type);
        let sim = |a: usize, b: usize| similarity.get(rows[order[a]], rows[order[b]]);

        // Indexed by priority rank.
        let mut claimed = vec![false; n];
        let mut absorbed_by: Vec<Option<usize>> = vec![None; n];
        let mut complete = true;

        for rank in 0..n {
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    processed = rank,
                    term_count = n,
                    "Reduction deadline reached, remaining terms left unclustered"
                );
                complete = false;
                break;
            }
            if claimed[rank] {
                continue;
            }
            for other in (rank + 1)..n {
                if !claimed[other] && sim(rank, other) >= self.cutoff {
                    claimed[other] = true;
                    absorbed_by[other] = Some(rank);
                    trace!(
                        term_id = %terms[order[other]].term_id,
                        representative = %terms[order[rank]].term_id,
                        "Term absorbed"
                    );
                }
            }
        }

        let uniqueness: Vec<f64> = (0..n)
            .map(|rank| {
                if n < 2 {
                    return 1.0;
                }
                let total: f64 = (0..n).filter(|&o| o != rank).map(|o| sim(rank, o)).sum();
                (1.0 - total / (n - 1) as f64).clamp(0.0, 1.0)
            })
            .collect();

        // Cluster order: representatives with members, then singletons.
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (rank, rep) in absorbed_by.iter().enumerate() {
            if let Some(rep) = rep {
                members[*rep].push(rank);
            }
        }
        let heads: Vec<usize> = (0..n).filter(|&r| absorbed_by[r].is_none()).collect();
        let (clustered, singletons): (Vec<usize>, Vec<usize>) =
            heads.into_iter().partition(|&r| !members[r].is_empty());
        let cluster_count = clustered.len();

        let mut sorted_ranks = Vec::with_capacity(n);
        for head in clustered {
            sorted_ranks.push(head);
            sorted_ranks.extend(members[head].iter().copied());
        }
        sorted_ranks.extend(singletons);

        let id_by_rank: Vec<_> = order.iter().map(|&i| terms[i].term_id).collect();
        let mut slots: Vec<Option<TermProperties>> = terms.into_iter().map(Some).collect();
        let mut reduced = Vec::with_capacity(n);
        for rank in sorted_ranks {
            let Some(mut props) = slots[order[rank]].take() else {
                return Err(Error::Internal("term emitted twice during reduction".into()));
            };
            props.uniqueness = uniqueness[rank];
            match absorbed_by[rank] {
                Some(rep) => {
                    props.dispensability = sim(rank, rep);
                    props.representative = Some(id_by_rank[rep]);
                }
                None => {
                    props.dispensability = 0.0;
                    props.representative = None;
                }
            }
            reduced.push(props);
        }

        debug!(
            term_count = n,
            cluster_count,
            cutoff = self.cutoff,
            complete,
            "Reduction complete"
        );

        Ok(Reduction {
            terms: reduced,
            cluster_count,
            complete,
        })
    }
}

/// Compare two terms by processing priority: most significant first, ties
/// broken by ascending term id.
pub fn priority_cmp(a: &TermProperties, b: &TermProperties, value_type: ValueType) -> Ordering {
    let (ka, kb) = (value_type.priority_key(a.value), value_type.priority_key(b.value));
    let by_value = match value_type.direction() {
        ValueDirection::LowerIsBetter => ka.total_cmp(&kb),
        ValueDirection::HigherIsBetter => kb.total_cmp(&ka),
    };
    by_value.then_with(|| a.term_id.cmp(&b.term_id))
}

/// Indices of `terms` in processing priority order.
pub fn priority_order(terms: &[TermProperties], value_type: ValueType) -> Vec<usize> {
    let mut order: Vec<usize> = (0..terms.len()).collect();
    order.sort_by(|&a, &b| priority_cmp(&terms[a], &terms[b], value_type));
    order
}

/// Reduce with no deadline.
pub fn reduce(
    terms: Vec<TermProperties>,
    similarity: &SimilarityMatrix,
    cutoff: f64,
    value_type: ValueType,
) -> Result<Vec<TermProperties>> {
    Reducer::new(cutoff, value_type)
        .reduce(terms, similarity)
        .map(|r| r.terms)
}
