//! Gaussian-State Circuit Backend
//!
//! Tracks a multimode Gaussian state through its first and second moments:
//! the mean `<a_k>`, the normally ordered correlations `N_kl = <a_k† a_l>` and
//! the phase-sensitive correlations `M_kl = <a_k a_l>`. Second moments are
//! central (displacement removed), so `displace` only touches the mean.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::trace;

use crate::error::{check_square, FockError, Result};
use crate::gates::BeamSplitter;

/// Gaussian state of `nlen` bosonic modes, initialised to vacuum.
#[derive(Clone, Debug)]
pub struct GaussianModes {
    nlen: usize,
    mean: Array1<Complex64>,
    nmat: Array2<Complex64>,
    mmat: Array2<Complex64>,
}

impl GaussianModes {
    /// Create `nlen` modes in the vacuum state.
    pub fn new(nlen: usize) -> Self {
        Self {
            nlen,
            mean: Array1::zeros(nlen),
            nmat: Array2::zeros((nlen, nlen)),
            mmat: Array2::zeros((nlen, nlen)),
        }
    }

    pub fn nlen(&self) -> usize {
        self.nlen
    }

    /// Mean field `<a_k>`.
    pub fn mean(&self) -> &Array1<Complex64> {
        &self.mean
    }

    /// Hermitian matrix `N_kl = <a_k† a_l>`.
    pub fn nmat(&self) -> &Array2<Complex64> {
        &self.nmat
    }

    /// Symmetric matrix `M_kl = <a_k a_l>`.
    pub fn mmat(&self) -> &Array2<Complex64> {
        &self.mmat
    }

    /// Mean photon number in mode `k`.
    pub fn mean_photon(&self, k: usize) -> Result<f64> {
        self.check_mode(k)?;
        Ok(self.nmat[[k, k]].re + self.mean[k].norm_sqr())
    }

    fn check_mode(&self, k: usize) -> Result<()> {
        if k >= self.nlen {
            return Err(FockError::ModeOutOfRange {
                index: k,
                modes: self.nlen,
            });
        }
        Ok(())
    }

    /// Displace mode `k` by `beta`.
    pub fn displace(&mut self, beta: Complex64, k: usize) -> Result<()> {
        self.check_mode(k)?;
        self.mean[k] += beta;
        Ok(())
    }

    /// Rotate mode `k` by `phi`, `a_k -> e^(iφ) a_k`.
    pub fn phase_shift(&mut self, phi: f64, k: usize) -> Result<()> {
        self.check_mode(k)?;
        let e = Complex64::from_polar(1.0, phi);

        self.mean[k] *= e;
        for l in 0..self.nlen {
            self.mmat[[k, l]] *= e;
            self.mmat[[l, k]] *= e;
            if l != k {
                self.nmat[[k, l]] *= e.conj();
                self.nmat[[l, k]] *= e;
            }
        }
        Ok(())
    }

    /// Squeeze mode `k` by `S(r e^(iφ))`, `a_k -> a_k cosh r - e^(iφ) a_k† sinh r`.
    pub fn squeeze(&mut self, r: f64, phi: f64, k: usize) -> Result<()> {
        self.check_mode(k)?;
        trace!(r, phi, k, "squeeze");

        let phase = Complex64::from_polar(1.0, phi);
        let phase2 = phase * phase;
        let sh = r.sinh();
        let ch = r.cosh();
        let shch = sh * ch;

        let nk = self.nmat.row(k).to_owned();
        let mk = self.mmat.row(k).to_owned();

        let alpha = self.mean[k];
        self.mean[k] = alpha * ch - phase * alpha.conj() * sh;

        // Only row and column k change
        self.nmat[[k, k]] = Complex64::new(sh * sh, 0.0)
            - phase * shch * mk[k].conj()
            - phase.conj() * shch * mk[k]
            + nk[k] * (ch * ch + sh * sh);
        self.mmat[[k, k]] = -phase * shch + phase2 * sh * sh * mk[k].conj() + mk[k] * (ch * ch)
            - phase * shch * 2.0 * nk[k];

        for l in (0..self.nlen).filter(|&l| l != k) {
            self.nmat[[k, l]] = nk[l] * ch - phase.conj() * sh * mk[l];
            self.mmat[[k, l]] = mk[l] * ch - phase * sh * nk[l];
            self.nmat[[l, k]] = self.nmat[[k, l]].conj();
            self.mmat[[l, k]] = self.mmat[[k, l]];
        }
        Ok(())
    }

    /// Beamsplitter `B(θ, φ)` between modes `k` and `l`.
    pub fn beamsplitter(&mut self, theta: f64, phi: f64, k: usize, l: usize) -> Result<()> {
        self.check_mode(k)?;
        self.check_mode(l)?;
        if k == l {
            return Err(FockError::SameMode(k));
        }
        trace!(theta, phi, k, l, "beamsplitter");

        let u = BeamSplitter::new(theta, phi).coefficients();
        let uc = u.map(|row| row.map(|x| x.conj()));

        let (ak, al) = (self.mean[k], self.mean[l]);
        self.mean[k] = u[0][0] * ak + u[0][1] * al;
        self.mean[l] = u[1][0] * ak + u[1][1] * al;

        // M -> U M U^T and N -> U* N U^T, rows first then columns
        mix_rows(&mut self.mmat, &u, k, l);
        mix_cols(&mut self.mmat, &u, k, l);
        mix_rows(&mut self.nmat, &uc, k, l);
        mix_cols(&mut self.nmat, &u, k, l);
        Ok(())
    }

    /// Two-mode squeezing between modes `i` and `j`, built from two
    /// beamsplitters sandwiching opposite single-mode squeezers.
    pub fn two_mode_squeeze(&mut self, r: f64, i: usize, j: usize) -> Result<()> {
        self.beamsplitter(std::f64::consts::FRAC_PI_4, 0.0, i, j)?;
        self.squeeze(-r, 0.0, i)?;
        self.squeeze(r, 0.0, j)?;
        self.beamsplitter(-std::f64::consts::FRAC_PI_4, 0.0, i, j)
    }

    /// Apply the passive transformation `a -> U a` to all modes.
    pub fn apply_u(&mut self, u: &Array2<Complex64>) -> Result<()> {
        check_square("passive unitary", u, self.nlen)?;

        let ut = u.t();
        self.mean = u.dot(&self.mean);
        self.nmat = u.mapv(|x| x.conj()).dot(&self.nmat).dot(&ut);
        self.mmat = u.dot(&self.mmat).dot(&ut);
        Ok(())
    }
}

fn mix_rows(m: &mut Array2<Complex64>, u: &[[Complex64; 2]; 2], k: usize, l: usize) {
    for col in 0..m.ncols() {
        let mk = m[[k, col]];
        let ml = m[[l, col]];
        m[[k, col]] = u[0][0] * mk + u[0][1] * ml;
        m[[l, col]] = u[1][0] * mk + u[1][1] * ml;
    }
}

fn mix_cols(m: &mut Array2<Complex64>, u: &[[Complex64; 2]; 2], k: usize, l: usize) {
    for row in 0..m.nrows() {
        let mk = m[[row, k]];
        let ml = m[[row, l]];
        m[[row, k]] = u[0][0] * mk + u[0][1] * ml;
        m[[row, l]] = u[1][0] * mk + u[1][1] * ml;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{direct_sum, identity, random_unitary};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
        (a - b).iter().map(|x| x.norm()).fold(0.0, f64::max)
    }

    #[test]
    fn test_vacuum() {
        let state = GaussianModes::new(3);
        assert_eq!(state.nlen(), 3);
        assert!(state.mmat().iter().all(|x| x.norm() == 0.0));
        assert!(state.mean_photon(2).unwrap().abs() < 1e-15);
    }

    #[test]
    fn test_squeezed_vacuum_moments() {
        let mut state = GaussianModes::new(1);
        let r = 0.7;
        let phi = 0.4;
        state.squeeze(r, phi, 0).unwrap();

        let expected_m = -Complex64::from_polar(1.0, phi) * r.sinh() * r.cosh();
        assert!((state.mmat()[[0, 0]] - expected_m).norm() < 1e-12);
        assert!((state.mean_photon(0).unwrap() - r.sinh().powi(2)).abs() < 1e-12);
    }

    #[test]
    fn test_squeeze_inverse() {
        let mut state = GaussianModes::new(2);
        state.squeeze(0.5, 0.0, 0).unwrap();
        state.beamsplitter(0.3, 0.2, 0, 1).unwrap();
        let before = state.clone();

        state.squeeze(0.25, 1.0, 1).unwrap();
        state.squeeze(-0.25, 1.0, 1).unwrap();

        assert!(max_abs_diff(state.mmat(), before.mmat()) < 1e-12);
        assert!(max_abs_diff(state.nmat(), before.nmat()) < 1e-12);
    }

    #[test]
    fn test_beamsplitter_matches_apply_u() {
        let mut a = GaussianModes::new(3);
        a.squeeze(0.4, 0.1, 0).unwrap();
        a.squeeze(0.2, -0.3, 2).unwrap();
        a.displace(Complex64::new(0.3, -0.1), 0).unwrap();
        let mut b = a.clone();

        a.beamsplitter(0.6, 0.9, 0, 2).unwrap();

        let bs = BeamSplitter::new(0.6, 0.9).matrix();
        let mut u = identity(3);
        for (i, &p) in [0usize, 2].iter().enumerate() {
            for (j, &q) in [0usize, 2].iter().enumerate() {
                u[[p, q]] = bs[[i, j]];
            }
        }
        b.apply_u(&u).unwrap();

        assert!(max_abs_diff(a.mmat(), b.mmat()) < 1e-12);
        assert!(max_abs_diff(a.nmat(), b.nmat()) < 1e-12);
        assert!((a.mean()[2] - b.mean()[2]).norm() < 1e-12);
    }

    #[test]
    fn test_passive_preserves_photon_number() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = GaussianModes::new(4);
        for k in 0..4 {
            state.squeeze(0.1 * (k + 1) as f64, 0.0, k).unwrap();
        }
        let total_before: f64 = (0..4).map(|k| state.mean_photon(k).unwrap()).sum();

        state.apply_u(&random_unitary(4, &mut rng)).unwrap();
        let total_after: f64 = (0..4).map(|k| state.mean_photon(k).unwrap()).sum();

        assert!((total_before - total_after).abs() < 1e-10);
    }

    #[test]
    fn test_mmat_stays_symmetric() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GaussianModes::new(4);
        state.two_mode_squeeze(0.8, 0, 2).unwrap();
        state.apply_u(&direct_sum(&random_unitary(2, &mut rng), &identity(2))).unwrap();
        state.squeeze(0.3, 0.5, 1).unwrap();
        state.phase_shift(0.7, 3).unwrap();

        let m = state.mmat();
        assert!(max_abs_diff(m, &m.t().to_owned()) < 1e-12);
        let n = state.nmat();
        assert!(max_abs_diff(n, &n.t().mapv(|x| x.conj())) < 1e-12);
    }

    #[test]
    fn test_two_mode_squeeze_correlations() {
        let mut state = GaussianModes::new(2);
        let r = 0.6;
        state.two_mode_squeeze(r, 0, 1).unwrap();

        let m = state.mmat();
        assert!(m[[0, 0]].norm() < 1e-12);
        assert!(m[[1, 1]].norm() < 1e-12);
        assert!((m[[0, 1]].norm() - r.sinh() * r.cosh()).abs() < 1e-12);
        assert!((state.mean_photon(0).unwrap() - r.sinh().powi(2)).abs() < 1e-12);
        assert!((state.mean_photon(1).unwrap() - r.sinh().powi(2)).abs() < 1e-12);
    }

    #[test]
    fn test_phase_shift_rotates_moments() {
        let mut state = GaussianModes::new(1);
        state.squeeze(0.5, 0.0, 0).unwrap();
        state.displace(Complex64::new(1.0, 0.0), 0).unwrap();
        let m0 = state.mmat()[[0, 0]];

        state.phase_shift(0.3, 0).unwrap();

        assert!((state.mmat()[[0, 0]] - m0 * Complex64::from_polar(1.0, 0.6)).norm() < 1e-12);
        assert!((state.mean()[0].arg() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_gate_errors() {
        let mut state = GaussianModes::new(2);
        assert!(matches!(
            state.beamsplitter(0.1, 0.0, 1, 1),
            Err(FockError::SameMode(1))
        ));
        assert!(matches!(
            state.squeeze(0.1, 0.0, 5),
            Err(FockError::ModeOutOfRange { index: 5, modes: 2 })
        ));
        assert!(matches!(
            state.apply_u(&identity(3)),
            Err(FockError::ShapeMismatch { .. })
        ));
    }
}
