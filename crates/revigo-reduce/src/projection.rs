//! 2-D projection of a similarity matrix for scatterplots.
//!
//! Classical multidimensional scaling: distances `1 - similarity` are
//! squared and double-centred, and the two leading eigenvectors of the
//! result (found by power iteration with deflation) give the coordinates.
//! The start vector is a fixed low-discrepancy sequence, so the output is a
//! pure function of the matrix.

use ndarray::{Array1, Array2};
use tracing::debug;

use revigo_core::defaults::{PROJECTION_EPSILON, PROJECTION_ITERATIONS};
use revigo_core::{SimilarityMatrix, TermProperties};

/// Coordinates of one term; a missing axis is `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Project every row of `similarity` to 2-D, in row order.
///
/// One term gets `(0, None)`; a matrix whose points all coincide, or that
/// only spans one dimension, gets `None` for the missing axis.
pub fn project(similarity: &SimilarityMatrix) -> Vec<Point2> {
    let n = similarity.len();
    match n {
        0 => return Vec::new(),
        1 => {
            return vec![Point2 {
                x: Some(0.0),
                y: None,
            }]
        }
        _ => {}
    }

    let b = double_centred(similarity);
    let (lambda1, v1) = leading_eigenpair(&b, &[]);
    if lambda1 <= PROJECTION_EPSILON {
        debug!(term_count = n, "Projection degenerate, all points coincide");
        return vec![
            Point2 {
                x: Some(0.0),
                y: None,
            };
            n
        ];
    }

    let deflated = &b - &(outer(&v1) * lambda1);
    let (lambda2, v2) = leading_eigenpair(&deflated, &[v1.clone()]);

    let scale1 = lambda1.sqrt();
    let scale2 = (lambda2 > PROJECTION_EPSILON).then(|| lambda2.sqrt());

    debug!(term_count = n, lambda1, lambda2, "Projection computed");

    (0..n)
        .map(|i| Point2 {
            x: Some(v1[i] * scale1),
            y: scale2.map(|s| v2[i] * s),
        })
        .collect()
}

/// Project and store the coordinates on each term by id.
pub fn assign_coordinates(terms: &mut [TermProperties], similarity: &SimilarityMatrix) {
    let points = project(similarity);
    for term in terms.iter_mut() {
        if let Some(point) = similarity.index_of(term.term_id).map(|i| points[i]) {
            term.pc_0 = point.x;
            term.pc_1 = point.y;
        }
    }
}

/// `-1/2 * J * D^2 * J` with `D = 1 - S`.
fn double_centred(similarity: &SimilarityMatrix) -> Array2<f64> {
    let n = similarity.len();
    let d2 = Array2::from_shape_fn((n, n), |(i, j)| {
        let d = 1.0 - similarity.get(i, j);
        d * d
    });
    let row_means: Vec<f64> = (0..n).map(|i| d2.row(i).sum() / n as f64).collect();
    let grand_mean = row_means.iter().sum::<f64>() / n as f64;
    Array2::from_shape_fn((n, n), |(i, j)| {
        -0.5 * (d2[[i, j]] - row_means[i] - row_means[j] + grand_mean)
    })
}

/// Largest algebraic eigenpair of symmetric `m`, searched orthogonally to
/// the constant vector and to `exclude`.
fn leading_eigenpair(m: &Array2<f64>, exclude: &[Array1<f64>]) -> (f64, Array1<f64>) {
    let n = m.nrows();
    // Shift by a Gershgorin bound so every eigenvalue is non-negative
    let shift = m
        .rows()
        .into_iter()
        .map(|r| r.iter().map(|x| x.abs()).sum::<f64>())
        .fold(0.0_f64, f64::max);

    let mut v = Array1::from_shape_fn(n, |i| {
        ((i as f64 + 1.0) * 0.618_033_988_749_895).fract() - 0.5
    });
    orthogonalize(&mut v, exclude);
    if !normalize(&mut v) {
        return (0.0, v);
    }

    for _ in 0..PROJECTION_ITERATIONS {
        let mut next = m.dot(&v) + &(&v * shift);
        orthogonalize(&mut next, exclude);
        if !normalize(&mut next) {
            return (0.0, next);
        }
        let delta = (&next - &v).mapv(f64::abs).sum();
        v = next;
        if delta < 1e-12 {
            break;
        }
    }

    canonical_sign(&mut v);
    let lambda = v.dot(&m.dot(&v));
    (lambda, v)
}

fn orthogonalize(v: &mut Array1<f64>, exclude: &[Array1<f64>]) {
    let mean = v.mean().unwrap_or(0.0);
    v.mapv_inplace(|x| x - mean);
    for e in exclude {
        let proj = v.dot(e);
        v.scaled_add(-proj, e);
    }
}

fn normalize(v: &mut Array1<f64>) -> bool {
    let norm = v.dot(&*v).sqrt();
    if norm <= 1e-12 {
        return false;
    }
    v.mapv_inplace(|x| x / norm);
    true
}

/// Flip so the largest-magnitude component is positive.
fn canonical_sign(v: &mut Array1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() + 1e-12 { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

fn outer(v: &Array1<f64>) -> Array2<f64> {
    let n = v.len();
    Array2::from_shape_fn((n, n), |(i, j)| v[i] * v[j])
}
