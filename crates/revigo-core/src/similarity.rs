//! Dense symmetric term-by-term similarity matrix.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::GoTermId;

/// Tolerance for the symmetry and range checks.
const TOLERANCE: f64 = 1e-9;

/// Square similarity matrix over a job's terms of one aspect.
///
/// Row `i` belongs to `ids()[i]`. The diagonal is 1.0, entries lie in
/// `[0, 1]` and `get(i, j) == get(j, i)`. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    ids: Vec<GoTermId>,
    /// Row-major, `ids.len()^2` entries.
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build from row-major values, validating shape, range and symmetry.
    pub fn new(ids: Vec<GoTermId>, values: Vec<f64>) -> Result<Self> {
        let n = ids.len();
        if values.len() != n * n {
            return Err(Error::InvalidInput(format!(
                "similarity matrix for {} terms needs {} entries, got {}",
                n,
                n * n,
                values.len()
            )));
        }
        for i in 0..n {
            for j in 0..n {
                let v = values[i * n + j];
                if !v.is_finite() || !(-TOLERANCE..=1.0 + TOLERANCE).contains(&v) {
                    return Err(Error::InvalidInput(format!(
                        "similarity between {} and {} is out of range: {}",
                        ids[i], ids[j], v
                    )));
                }
                if (v - values[j * n + i]).abs() > TOLERANCE {
                    return Err(Error::InvalidInput(format!(
                        "similarity matrix is not symmetric at {} / {}",
                        ids[i], ids[j]
                    )));
                }
            }
        }

        let mut values = values;
        for (k, v) in values.iter_mut().enumerate() {
            *v = if k / n == k % n { 1.0 } else { v.clamp(0.0, 1.0) };
        }
        Ok(Self { ids, values })
    }

    /// Build by evaluating `f` on the strict upper triangle.
    pub fn from_fn<F>(ids: Vec<GoTermId>, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let n = ids.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
            for j in (i + 1)..n {
                let v = f(i, j);
                let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
                values[i * n + j] = v;
                values[j * n + i] = v;
            }
        }
        Self { ids, values }
    }

    /// Matrix with no off-diagonal similarity at all.
    pub fn identity(ids: Vec<GoTermId>) -> Self {
        Self::from_fn(ids, |_, _| 0.0)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[GoTermId] {
        &self.ids
    }

    /// Similarity between rows `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.ids.len() + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.ids.len();
        &self.values[i * n..(i + 1) * n]
    }

    pub fn index_of(&self, id: GoTermId) -> Option<usize> {
        self.ids.iter().position(|&t| t == id)
    }

    /// Similarity between two terms by identifier.
    pub fn between(&self, a: GoTermId, b: GoTermId) -> Option<f64> {
        Some(self.get(self.index_of(a)?, self.index_of(b)?))
    }

    /// Matrix restricted to `indices`, in that order.
    pub fn submatrix(&self, indices: &[usize]) -> Self {
        let ids = indices.iter().map(|&i| self.ids[i]).collect();
        let m = indices.len();
        let mut values = Vec::with_capacity(m * m);
        for &i in indices {
            for &j in indices {
                values.push(self.get(i, j));
            }
        }
        Self { ids, values }
    }
}
