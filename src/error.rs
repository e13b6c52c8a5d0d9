//! Error types for Gaussian Fock-amplitude computations

use thiserror::Error;

/// Errors raised while building circuits or evaluating amplitudes.
#[derive(Debug, Error)]
pub enum FockError {
    #[error("{what} has length {actual}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{what} has shape {rows}x{cols}, expected {expected}x{expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Mode index {index} out of range for {modes} modes")]
    ModeOutOfRange { index: usize, modes: usize },

    #[error("Two-mode gate requires distinct modes, got {0} twice")]
    SameMode(usize),

    #[error("Matrix is not symmetric (asymmetry {asymmetry:e})")]
    NotSymmetric { asymmetry: f64 },

    #[error("Takagi decomposition failed: {0}")]
    Takagi(String),

    #[error("Hafnian dimension {dim} exceeds maximum {max}")]
    TooLarge { dim: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FockError>;

/// Check that `m` is a `n x n` matrix.
pub(crate) fn check_square<T>(
    what: &'static str,
    m: &ndarray::Array2<T>,
    n: usize,
) -> Result<()> {
    let (rows, cols) = m.dim();
    if rows != n || cols != n {
        return Err(FockError::ShapeMismatch {
            what,
            expected: n,
            rows,
            cols,
        });
    }
    Ok(())
}

/// Check that a vector argument has `n` entries.
pub(crate) fn check_len(what: &'static str, len: usize, n: usize) -> Result<()> {
    if len != n {
        return Err(FockError::LengthMismatch {
            what,
            expected: n,
            actual: len,
        });
    }
    Ok(())
}
