//! Hafnians and Loop Hafnians
//!
//! The loop hafnian of a symmetric `n x n` matrix `A` sums, over every
//! perfect matching of the complete graph with loops, the product of the
//! weights of the chosen edges: `A_ij` for a pair `(i, j)` and `A_ii` for a
//! vertex matched to itself. The plain hafnian drops the loops.

use std::collections::HashMap;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{FockError, Result};
use crate::takagi::asymmetry;

/// Largest matrix dimension accepted.
///
/// The memo holds one entry per reachable vertex subset, which grows like
/// the Fibonacci numbers `F(n + 2)`: about 5.7e6 entries at this bound.
pub const MAX_DIM: usize = 32;

const SYMMETRY_TOL: f64 = 1e-10;

/// Loop hafnian of a complex symmetric matrix.
pub fn loop_hafnian(a: &Array2<Complex64>) -> Result<Complex64> {
    Matchings::new(a, true)?.evaluate()
}

/// Hafnian (no loops) of a complex symmetric matrix. Zero for odd dimension.
pub fn hafnian(a: &Array2<Complex64>) -> Result<Complex64> {
    let n = a.nrows();
    if n % 2 == 1 && a.is_square() {
        return Ok(Complex64::new(0.0, 0.0));
    }
    Matchings::new(a, false)?.evaluate()
}

/// Build `A[reps, reps]` with its diagonal replaced by `diag[reps]`.
///
/// `reps` is a multiset of indices, so rows and columns may repeat.
pub fn repeat_indices(
    a: &Array2<Complex64>,
    diag: &Array1<Complex64>,
    reps: &[usize],
) -> Array2<Complex64> {
    let mut out = Array2::from_shape_fn((reps.len(), reps.len()), |(i, j)| a[[reps[i], reps[j]]]);
    for (i, &k) in reps.iter().enumerate() {
        out[[i, i]] = diag[k];
    }
    out
}

/// Memoised sum over matchings of the vertices left in a bitmask.
struct Matchings<'a> {
    a: &'a Array2<Complex64>,
    loops: bool,
    memo: HashMap<u32, Complex64>,
}

impl<'a> Matchings<'a> {
    fn new(a: &'a Array2<Complex64>, loops: bool) -> Result<Self> {
        let (rows, cols) = a.dim();
        if rows != cols {
            return Err(FockError::ShapeMismatch {
                what: "hafnian input",
                expected: rows,
                rows,
                cols,
            });
        }
        if rows > MAX_DIM {
            return Err(FockError::TooLarge {
                dim: rows,
                max: MAX_DIM,
            });
        }
        let scale = a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt().max(1.0);
        let asym = asymmetry(a);
        if asym > SYMMETRY_TOL * scale {
            return Err(FockError::NotSymmetric { asymmetry: asym });
        }
        Ok(Self {
            a,
            loops,
            memo: HashMap::new(),
        })
    }

    fn evaluate(mut self) -> Result<Complex64> {
        let n = self.a.nrows();
        let full = if n == MAX_DIM {
            u32::MAX
        } else {
            (1u32 << n) - 1
        };
        let value = self.sum(full);
        debug!(dim = n, loops = self.loops, states = self.memo.len(), "hafnian evaluated");
        Ok(value)
    }

    fn sum(&mut self, mask: u32) -> Complex64 {
        if mask == 0 {
            return Complex64::new(1.0, 0.0);
        }
        if let Some(&v) = self.memo.get(&mask) {
            return v;
        }

        // Lowest vertex is either looped or paired with a later one
        let i = mask.trailing_zeros() as usize;
        let rest = mask & !(1u32 << i);

        let mut acc = Complex64::new(0.0, 0.0);
        if self.loops {
            let w = self.a[[i, i]];
            if w != Complex64::new(0.0, 0.0) {
                acc += w * self.sum(rest);
            }
        }

        let mut partners = rest;
        while partners != 0 {
            let j = partners.trailing_zeros() as usize;
            partners &= partners - 1;
            let w = self.a[[i, j]];
            if w != Complex64::new(0.0, 0.0) {
                acc += w * self.sum(rest & !(1u32 << j));
            }
        }

        self.memo.insert(mask, acc);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64) -> Complex64 {
        Complex64::new(re, 0.0)
    }

    fn ones(n: usize) -> Array2<Complex64> {
        Array2::from_elem((n, n), c(1.0))
    }

    #[test]
    fn test_empty_is_one() {
        let a: Array2<Complex64> = Array2::zeros((0, 0));
        assert_eq!(loop_hafnian(&a).unwrap(), c(1.0));
        assert_eq!(hafnian(&a).unwrap(), c(1.0));
    }

    #[test]
    fn test_single_vertex() {
        let a = Array2::from_elem((1, 1), Complex64::new(0.3, -0.2));
        assert_eq!(loop_hafnian(&a).unwrap(), Complex64::new(0.3, -0.2));
        assert_eq!(hafnian(&a).unwrap(), c(0.0));
    }

    #[test]
    fn test_two_by_two() {
        let a = Array2::from_shape_vec((2, 2), vec![c(2.0), c(3.0), c(3.0), c(5.0)]).unwrap();
        // loops: a00*a11 + a01
        assert!((loop_hafnian(&a).unwrap() - c(13.0)).norm() < 1e-12);
        assert!((hafnian(&a).unwrap() - c(3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_four_by_four_hafnian() {
        let a = Array2::from_shape_fn((4, 4), |(i, j)| c((i + j + 1) as f64));
        // a01 a23 + a02 a13 + a03 a12
        let expected = 2.0 * 6.0 + 3.0 * 5.0 + 4.0 * 4.0;
        assert!((hafnian(&a).unwrap() - c(expected)).norm() < 1e-12);
    }

    #[test]
    fn test_all_ones_counts_matchings() {
        // Perfect matchings of K_6: 5!! = 15
        assert!((hafnian(&ones(6)).unwrap() - c(15.0)).norm() < 1e-9);
        // Matchings with loops of K_4 (telephone number T(4) = 10)
        assert!((loop_hafnian(&ones(4)).unwrap() - c(10.0)).norm() < 1e-9);
        // T(7) = 232
        assert!((loop_hafnian(&ones(7)).unwrap() - c(232.0)).norm() < 1e-9);
    }

    #[test]
    fn test_largest_supported_sizes() {
        // Perfect matchings of K_24: 23!! = 316234143225
        assert!((hafnian(&ones(24)).unwrap() - c(316234143225.0)).norm() < 1.0);

        // Row count just past the bound is refused before any work
        assert!(matches!(
            loop_hafnian(&ones(MAX_DIM + 1)),
            Err(FockError::TooLarge { dim: 33, max: 32 })
        ));
    }

    #[test]
    fn test_zero_diagonal_loop_equals_plain() {
        let mut a = Array2::from_shape_fn((6, 6), |(i, j)| {
            Complex64::new(0.1 * (i * j) as f64, 0.05 * (i + j) as f64)
        });
        for i in 0..6 {
            a[[i, i]] = c(0.0);
        }
        let lh = loop_hafnian(&a).unwrap();
        let h = hafnian(&a).unwrap();
        assert!((lh - h).norm() < 1e-12);
    }

    #[test]
    fn test_repeat_indices() {
        let a = Array2::from_shape_fn((3, 3), |(i, j)| c((10 * i + 10 * j) as f64));
        let diag = Array1::from_vec(vec![c(-1.0), c(-2.0), c(-3.0)]);
        let r = repeat_indices(&a, &diag, &[0, 0, 2]);

        assert_eq!(r.dim(), (3, 3));
        assert_eq!(r[[0, 0]], c(-1.0));
        assert_eq!(r[[1, 1]], c(-1.0));
        assert_eq!(r[[2, 2]], c(-3.0));
        assert_eq!(r[[0, 1]], c(0.0));
        assert_eq!(r[[0, 2]], c(20.0));
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut a = ones(3);
        a[[0, 2]] = c(4.0);
        assert!(matches!(
            loop_hafnian(&a),
            Err(FockError::NotSymmetric { .. })
        ));

        let big = ones(MAX_DIM + 1);
        assert_eq!(MAX_DIM, 32);
        assert!(matches!(
            loop_hafnian(&big),
            Err(FockError::TooLarge { .. })
        ));
    }
}
