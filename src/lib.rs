//! Fock-basis matrix elements of multimode Gaussian unitaries.
//!
//! A Gaussian unitary `W = D(alpha) U S(ls) Up` is compiled into an
//! auxiliary Gaussian circuit whose phase-sensitive moments, after a Takagi
//! factorisation, give the matrix whose loop hafnian is `<m|W|n>`.

pub mod config;
pub mod error;
pub mod gates;
pub mod gaussian_circuit;
pub mod hafnian;
pub mod matelem;
pub mod takagi;

pub use config::GaussianUnitaryConfig;
pub use error::{FockError, Result};
pub use gates::{random_unitary, BeamSplitter};
pub use gaussian_circuit::GaussianModes;
pub use hafnian::{hafnian, loop_hafnian};
pub use matelem::{matelem, GaussianUnitary};
pub use takagi::{takagi, Takagi};
