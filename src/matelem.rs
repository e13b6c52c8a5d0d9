//! Fock Matrix Elements of Gaussian Unitaries
//!
//! Computes `<m| W |n>` for the Gaussian unitary
//! `W = D(alpha) U S(ls) Up` acting on `l` modes. The ket `n` is absorbed
//! into `l` auxiliary modes through two-mode squeezers, the resulting
//! `2l`-mode pure Gaussian state is Takagi-decomposed, and the amplitude is
//! a loop hafnian of the matrix `B` with rows and columns repeated per the
//! photon numbers `m ++ n`.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{check_len, check_square, Result};
use crate::gates::{direct_sum, identity};
use crate::gaussian_circuit::GaussianModes;
use crate::hafnian::{loop_hafnian, repeat_indices};
use crate::takagi::takagi;

/// Relative tolerance handed to the Takagi decomposition.
pub const TAKAGI_TOL: f64 = 1e-10;

/// Gaussian unitary made of an interferometer `u_prime`, single-mode
/// squeezers, a second interferometer `u` and displacements.
#[derive(Clone, Debug)]
pub struct GaussianUnitary {
    modes: usize,
    u: Array2<Complex64>,
    u_prime: Array2<Complex64>,
    squeezing: Array1<f64>,
    displacement: Array1<Complex64>,
}

impl GaussianUnitary {
    /// Create a Gaussian unitary, checking every shape against the mode count
    /// implied by `u`.
    pub fn new(
        u: Array2<Complex64>,
        u_prime: Array2<Complex64>,
        squeezing: Array1<f64>,
        displacement: Array1<Complex64>,
    ) -> Result<Self> {
        let modes = u.nrows();
        check_square("U", &u, modes)?;
        check_square("U'", &u_prime, modes)?;
        check_len("squeezing", squeezing.len(), modes)?;
        check_len("displacement", displacement.len(), modes)?;
        Ok(Self {
            modes,
            u,
            u_prime,
            squeezing,
            displacement,
        })
    }

    /// The identity on `modes` modes.
    pub fn identity(modes: usize) -> Self {
        Self {
            modes,
            u: identity(modes),
            u_prime: identity(modes),
            squeezing: Array1::zeros(modes),
            displacement: Array1::zeros(modes),
        }
    }

    /// Replace the displacement vector.
    pub fn with_displacement(mut self, displacement: Array1<Complex64>) -> Result<Self> {
        check_len("displacement", displacement.len(), self.modes)?;
        self.displacement = displacement;
        Ok(self)
    }

    pub fn modes(&self) -> usize {
        self.modes
    }

    pub fn u(&self) -> &Array2<Complex64> {
        &self.u
    }

    pub fn u_prime(&self) -> &Array2<Complex64> {
        &self.u_prime
    }

    pub fn squeezing(&self) -> &Array1<f64> {
        &self.squeezing
    }

    pub fn displacement(&self) -> &Array1<Complex64> {
        &self.displacement
    }

    /// Matrix element `<bra| W |ket>` for Fock occupations `bra` and `ket`.
    pub fn matrix_element(&self, bra: &[usize], ket: &[usize]) -> Result<Complex64> {
        let l = self.modes;
        check_len("bra occupations", bra.len(), l)?;
        check_len("ket occupations", ket.len(), l)?;

        let ts: Vec<f64> = ket.iter().map(|&k| (k as f64).sqrt().asinh()).collect();

        // Auxiliary circuit on 2l modes
        let mut state = GaussianModes::new(2 * l);
        for (i, &t) in ts.iter().enumerate() {
            state.two_mode_squeeze(-t, i, i + l)?;
        }
        state.apply_u(&direct_sum(&self.u_prime, &identity(l)))?;
        for (i, &r) in self.squeezing.iter().enumerate() {
            state.squeeze(-r, 0.0, i)?;
        }
        state.apply_u(&direct_sum(&self.u, &identity(l)))?;

        // Bloch-Messiah shortcut through the Takagi factorisation of M
        let decomposition = takagi(state.mmat(), TAKAGI_TOL)?;
        let lt = decomposition
            .singular_values
            .mapv(|s| -0.5 * (2.0 * s).asinh());
        let ut = decomposition.unitary.mapv(|x| x.conj());

        let tanh_lt = lt.mapv(|x| Complex64::new(x.tanh(), 0.0));
        let b = (&ut * &tanh_lt).dot(&ut.t());

        let mut alphat: Array1<Complex64> = Array1::zeros(2 * l);
        alphat.slice_mut(s![..l]).assign(&self.displacement);
        let alphat_conj = alphat.mapv(|x| x.conj());
        let zeta = &alphat - &b.dot(&alphat_conj);
        let pref = -0.5 * alphat_conj.dot(&zeta);

        let p: Vec<usize> = bra.iter().chain(ket.iter()).copied().collect();

        // Prefactors
        let r_factor: f64 = ts
            .iter()
            .zip(ket.iter())
            .map(|(&t, &k)| t.cosh() / t.tanh().powi(k as i32))
            .product();
        let prefns = p.iter().map(|&k| factorial(k)).product::<f64>().sqrt();
        let cosh_lt = lt.iter().map(|x| x.cosh()).product::<f64>();
        let t_factor = pref.exp() / (prefns * cosh_lt.sqrt());

        // Multiset S_p: mode k repeated p_k times
        let sp: Vec<usize> = p
            .iter()
            .enumerate()
            .flat_map(|(k, &count)| std::iter::repeat(k).take(count))
            .collect();

        let amp = if sp.is_empty() {
            Complex64::new(1.0, 0.0)
        } else {
            loop_hafnian(&repeat_indices(&b, &zeta, &sp))?
        };

        debug!(
            modes = l,
            photons = sp.len(),
            amp_re = amp.re,
            amp_im = amp.im,
            "matrix element"
        );

        Ok(amp * t_factor * r_factor)
    }

    /// Transition probability `|<bra| W |ket>|^2`.
    pub fn probability(&self, bra: &[usize], ket: &[usize]) -> Result<f64> {
        Ok(self.matrix_element(bra, ket)?.norm_sqr())
    }
}

/// Matrix element `<m| W(alpha, U, ls, Up) |n>` on `l` modes.
pub fn matelem(
    l: usize,
    m: &[usize],
    n: &[usize],
    u: &Array2<Complex64>,
    u_prime: &Array2<Complex64>,
    ls: &[f64],
    alpha: &[Complex64],
) -> Result<Complex64> {
    check_len("bra occupations", m.len(), l)?;
    check_len("ket occupations", n.len(), l)?;
    check_square("U", u, l)?;
    check_square("U'", u_prime, l)?;
    check_len("squeezing", ls.len(), l)?;
    check_len("displacement", alpha.len(), l)?;

    let unitary = GaussianUnitary {
        modes: l,
        u: u.clone(),
        u_prime: u_prime.clone(),
        squeezing: Array1::from_vec(ls.to_vec()),
        displacement: Array1::from_vec(alpha.to_vec()),
    };
    unitary.matrix_element(m, n)
}

fn factorial(k: usize) -> f64 {
    (1..=k).map(|i| i as f64).product()
}
