//! Takagi Decomposition for Complex Symmetric Matrices
//!
//! Factorises a complex symmetric `A` as `A = U diag(σ) U^T` with unitary
//! `U` and non-negative `σ`. The factorisation is read off the real
//! symmetric eigenproblem of
//!
//! ```text
//! [[Re A,  Im A],
//!  [Im A, -Re A]]
//! ```
//!
//! whose spectrum is `±σ_k`. An eigenvector `[u; v]` for `+σ_k` gives the
//! Takagi vector `u + i v`, since then `A conj(u + i v) = σ_k (u + i v)`.

use std::cmp::Ordering;

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{FockError, Result};

/// Result of a Takagi decomposition.
#[derive(Clone, Debug)]
pub struct Takagi {
    /// Singular values in descending order.
    pub singular_values: Array1<f64>,
    /// Unitary whose columns are the Takagi vectors.
    pub unitary: Array2<Complex64>,
}

impl Takagi {
    /// Rebuild `U diag(σ) U^T`.
    pub fn reconstruct(&self) -> Array2<Complex64> {
        let scaled = &self.unitary * &self.singular_values.mapv(|s| Complex64::new(s, 0.0));
        scaled.dot(&self.unitary.t())
    }
}

/// Frobenius norm of `a - a^T`.
pub fn asymmetry(a: &Array2<Complex64>) -> f64 {
    let (n, _) = a.dim();
    let mut acc = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            acc += 2.0 * (a[[i, j]] - a[[j, i]]).norm_sqr();
        }
    }
    acc.sqrt()
}

fn frobenius(a: &Array2<Complex64>) -> f64 {
    a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
}

/// Takagi-decompose the complex symmetric matrix `a`.
///
/// `tol` is relative to `max(1, ‖a‖_F)` and bounds both the allowed
/// asymmetry and the eigenvalues treated as zero singular values.
pub fn takagi(a: &Array2<Complex64>, tol: f64) -> Result<Takagi> {
    let (n, cols) = a.dim();
    if n != cols {
        return Err(FockError::ShapeMismatch {
            what: "Takagi input",
            expected: n,
            rows: n,
            cols,
        });
    }
    if n == 0 {
        return Ok(Takagi {
            singular_values: Array1::zeros(0),
            unitary: Array2::zeros((0, 0)),
        });
    }

    let scale = frobenius(a).max(1.0);
    let asym = asymmetry(a);
    if asym > tol * scale {
        return Err(FockError::NotSymmetric { asymmetry: asym });
    }

    // Real embedding, symmetrised
    let embed = DMatrix::from_fn(2 * n, 2 * n, |i, j| {
        let (bi, ri) = (i / n, i % n);
        let (bj, rj) = (j / n, j % n);
        let z = 0.5 * (a[[ri, rj]] + a[[rj, ri]]);
        match (bi, bj) {
            (0, 0) => z.re,
            (1, 1) => -z.re,
            _ => z.im,
        }
    });

    let eigen = SymmetricEigen::new(embed);
    let mut pairs: Vec<(f64, Vec<Complex64>)> = eigen
        .eigenvalues
        .iter()
        .zip(eigen.eigenvectors.column_iter())
        .map(|(&val, vec)| {
            let z = (0..n).map(|k| Complex64::new(vec[k], vec[k + n])).collect();
            (val, z)
        })
        .collect();
    pairs.sort_by(|x, y| y.0.partial_cmp(&x.0).unwrap_or(Ordering::Equal));

    let zero_tol = tol * scale;
    let mut values = Vec::with_capacity(n);
    let mut vectors: Vec<Vec<Complex64>> = Vec::with_capacity(n);

    for (val, z) in pairs.iter().take(n) {
        if *val > zero_tol {
            values.push(*val);
            vectors.push(z.clone());
        }
    }

    // Zero singular values: any orthonormal basis of the null space works
    let mut candidates: Vec<Vec<Complex64>> = pairs
        .iter()
        .filter(|(val, _)| val.abs() <= zero_tol)
        .map(|(_, z)| z.clone())
        .collect();
    while vectors.len() < n {
        let next = pick_orthogonal(&mut candidates, &vectors).ok_or_else(|| {
            FockError::Takagi(format!(
                "found {} of {} orthonormal vectors",
                vectors.len(),
                n
            ))
        })?;
        values.push(0.0);
        vectors.push(next);
    }

    debug!(
        dim = n,
        rank = values.iter().filter(|&&s| s > 0.0).count(),
        "takagi decomposition"
    );

    let unitary = Array2::from_shape_fn((n, n), |(i, j)| vectors[j][i]);
    Ok(Takagi {
        singular_values: Array1::from_vec(values),
        unitary,
    })
}

/// Project every candidate off `basis` and return the largest residual,
/// normalised. Pivoting keeps the choice stable when candidates overlap.
fn pick_orthogonal(
    candidates: &mut Vec<Vec<Complex64>>,
    basis: &[Vec<Complex64>],
) -> Option<Vec<Complex64>> {
    let mut best: Option<(usize, f64, Vec<Complex64>)> = None;

    for (idx, cand) in candidates.iter().enumerate() {
        let mut v = cand.clone();
        for q in basis {
            let proj: Complex64 = q.iter().zip(v.iter()).map(|(a, b)| a.conj() * b).sum();
            for (vk, qk) in v.iter_mut().zip(q.iter()) {
                *vk -= proj * qk;
            }
        }
        let norm = v.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        if best.as_ref().map_or(true, |(_, b, _)| norm > *b) {
            best = Some((idx, norm, v));
        }
    }

    let (idx, norm, v) = best?;
    if norm < 1e-6 {
        return None;
    }
    candidates.swap_remove(idx);
    Some(v.into_iter().map(|x| x / norm).collect())
}
