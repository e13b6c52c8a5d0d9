//! Linear-Optical Gates
//!
//! Passive building blocks acting on the annihilation operators of a set of
//! bosonic modes: beamsplitters, block-diagonal extensions and random
//! interferometers.

use ndarray::{s, Array2};
use num_complex::Complex64;
use rand::Rng;
use rand_distr::StandardNormal;

/// Two-mode beamsplitter with transmission angle `theta` and phase `phi`.
///
/// Implements the transformation:
/// B(θ, φ) = [[cos(θ),         -e^(-iφ)sin(θ)],
///            [e^(iφ)sin(θ),    cos(θ)       ]]
#[derive(Clone, Copy, Debug)]
pub struct BeamSplitter {
    pub theta: f64,
    pub phi: f64,
}

impl BeamSplitter {
    /// Create new beamsplitter with given angles.
    pub fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Balanced (50:50) beamsplitter.
    pub fn balanced() -> Self {
        Self::new(std::f64::consts::FRAC_PI_4, 0.0)
    }

    /// Entries `[[t, -r*], [r, t]]` of the transfer matrix.
    #[inline]
    pub fn coefficients(&self) -> [[Complex64; 2]; 2] {
        let t = Complex64::new(self.theta.cos(), 0.0);
        let r = Complex64::from_polar(self.theta.sin(), self.phi);
        [[t, -r.conj()], [r, t]]
    }

    /// Get the 2x2 transfer matrix.
    pub fn matrix(&self) -> Array2<Complex64> {
        let [[a, b], [c, d]] = self.coefficients();
        Array2::from_shape_fn((2, 2), |(i, j)| match (i, j) {
            (0, 0) => a,
            (0, 1) => b,
            (1, 0) => c,
            _ => d,
        })
    }
}

impl Default for BeamSplitter {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// `n x n` complex identity.
pub fn identity(n: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(n, Complex64::new(1.0, 0.0))
}

/// Block-diagonal matrix `a ⊕ b`.
pub fn direct_sum(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ra, ca) = a.dim();
    let (rb, cb) = b.dim();
    let mut out = Array2::zeros((ra + rb, ca + cb));
    out.slice_mut(s![..ra, ..ca]).assign(a);
    out.slice_mut(s![ra.., ca..]).assign(b);
    out
}

/// Generate a Haar-random unitary from a complex Ginibre matrix.
pub fn random_unitary<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Array2<Complex64> {
    let mut z: Array2<Complex64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            z[[i, j]] = Complex64::new(re, im) / 2.0_f64.sqrt();
        }
    }

    // Gram-Schmidt on the columns
    let mut q: Array2<Complex64> = Array2::zeros((n, n));

    for i in 0..n {
        let mut v = z.column(i).to_owned();

        for j in 0..i {
            let q_j = q.column(j);
            let proj: Complex64 = q_j.iter().zip(v.iter()).map(|(a, b)| a.conj() * b).sum();
            for k in 0..n {
                v[k] -= proj * q[[k, j]];
            }
        }

        let norm: f64 = v.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt();
        if norm > 1e-10 {
            for k in 0..n {
                q[[k, i]] = v[k] / norm;
            }
        }
    }

    q
}

/// Check if `u` is unitary within `tolerance`.
pub fn is_unitary(u: &Array2<Complex64>, tolerance: f64) -> bool {
    let (rows, cols) = u.dim();
    if rows != cols {
        return false;
    }
    let u_h = u.t().mapv(|x| x.conj());
    let product = u.dot(&u_h);

    (0..rows).all(|i| {
        (0..rows).all(|j| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (product[[i, j]] - expected).norm() <= tolerance
        })
    })
}
