//! JSON Configuration for Gaussian Unitaries

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{check_len, FockError, Result};
use crate::matelem::GaussianUnitary;

/// On-disk description of a Gaussian unitary.
///
/// Complex entries are stored as `[re, im]` pairs and matrices row by row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianUnitaryConfig {
    pub modes: usize,
    pub u: Vec<Vec<Complex64>>,
    pub u_prime: Vec<Vec<Complex64>>,
    pub squeezing: Vec<f64>,
    pub displacement: Vec<Complex64>,
}

impl GaussianUnitaryConfig {
    /// Capture the parameters of an existing unitary.
    pub fn from_unitary(w: &GaussianUnitary) -> Self {
        Self {
            modes: w.modes(),
            u: rows(w.u()),
            u_prime: rows(w.u_prime()),
            squeezing: w.squeezing().to_vec(),
            displacement: w.displacement().to_vec(),
        }
    }

    /// Build the unitary, checking all shapes against `modes`.
    pub fn into_unitary(self) -> Result<GaussianUnitary> {
        let u = matrix("U", self.u, self.modes)?;
        let u_prime = matrix("U'", self.u_prime, self.modes)?;
        check_len("squeezing", self.squeezing.len(), self.modes)?;
        check_len("displacement", self.displacement.len(), self.modes)?;
        GaussianUnitary::new(
            u,
            u_prime,
            Array1::from_vec(self.squeezing),
            Array1::from_vec(self.displacement),
        )
    }

    /// Save configuration to file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn rows(m: &Array2<Complex64>) -> Vec<Vec<Complex64>> {
    m.outer_iter().map(|row| row.to_vec()).collect()
}

fn matrix(what: &'static str, rows: Vec<Vec<Complex64>>, n: usize) -> Result<Array2<Complex64>> {
    let cols = rows.first().map_or(0, |r| r.len());
    if rows.len() != n || rows.iter().any(|r| r.len() != n) {
        return Err(FockError::ShapeMismatch {
            what,
            expected: n,
            rows: rows.len(),
            cols,
        });
    }
    let flat: Vec<Complex64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n, n), flat).map_err(|_| FockError::ShapeMismatch {
        what,
        expected: n,
        rows: n,
        cols,
    })
}
