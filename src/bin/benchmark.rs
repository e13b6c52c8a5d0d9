//! fockgaussian Benchmark Suite

use fockgaussian::gates::random_unitary;
use fockgaussian::matelem::GaussianUnitary;
use fockgaussian::takagi::takagi;

use ndarray::Array1;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn random_gaussian_unitary(modes: usize, rng: &mut StdRng) -> fockgaussian::Result<GaussianUnitary> {
    let squeezing: Array1<f64> = (0..modes).map(|_| rng.gen_range(-0.5..0.5)).collect();
    let displacement: Array1<Complex64> = (0..modes)
        .map(|_| Complex64::new(rng.gen_range(-0.3..0.3), rng.gen_range(-0.3..0.3)))
        .collect();
    GaussianUnitary::new(
        random_unitary(modes, rng),
        random_unitary(modes, rng),
        squeezing,
        displacement,
    )
}

fn benchmark_takagi(rng: &mut StdRng) {
    println!("\n{}", "=".repeat(60));
    println!("BENCHMARK: Takagi Decomposition");
    println!("{}", "=".repeat(60));

    let sizes = [4, 8, 16, 32, 64];

    for &n in &sizes {
        let u = random_unitary(n, rng);
        let sigma: Array1<Complex64> = (0..n).map(|k| Complex64::new(1.0 / (k + 1) as f64, 0.0)).collect();
        let a = (&u * &sigma).dot(&u.t());

        let n_iters = if n <= 16 { 100 } else { 10 };

        let start = Instant::now();
        for _ in 0..n_iters {
            if let Err(e) = takagi(&a, 1e-10) {
                println!("  {}x{}: failed ({})", n, n, e);
                break;
            }
        }
        let elapsed = start.elapsed().as_secs_f64() / n_iters as f64;

        println!("  {}x{}: {:.3} ms", n, n, elapsed * 1000.0);
    }
}

fn benchmark_matrix_elements(rng: &mut StdRng) -> fockgaussian::Result<()> {
    println!("\n{}", "=".repeat(60));
    println!("BENCHMARK: Fock Matrix Elements");
    println!("{}", "=".repeat(60));

    let cases: [(usize, usize); 6] = [(1, 2), (2, 2), (2, 4), (3, 4), (4, 6), (4, 8)];

    for &(modes, photons) in &cases {
        let w = random_gaussian_unitary(modes, rng)?;

        // Spread photons round-robin over bra and ket
        let mut bra = vec![0; modes];
        let mut ket = vec![0; modes];
        for k in 0..photons {
            if k % 2 == 0 {
                bra[(k / 2) % modes] += 1;
            } else {
                ket[(k / 2) % modes] += 1;
            }
        }

        let n_iters = if photons <= 4 { 100 } else { 10 };

        let start = Instant::now();
        let mut mu = Complex64::new(0.0, 0.0);
        for _ in 0..n_iters {
            mu = w.matrix_element(&bra, &ket)?;
        }
        let elapsed = start.elapsed().as_secs_f64() / n_iters as f64;

        println!(
            "  {} modes, {} photons: {:.3} ms, |<m|W|n>|^2 = {:.3e}",
            modes,
            photons,
            elapsed * 1000.0,
            mu.norm_sqr()
        );
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("\n{}", "#".repeat(60));
    println!("#  fockgaussian Benchmark Suite");
    println!("{}", "#".repeat(60));

    let mut rng = StdRng::seed_from_u64(2019);

    benchmark_takagi(&mut rng);
    if let Err(e) = benchmark_matrix_elements(&mut rng) {
        tracing::error!(error = %e, "matrix element benchmark failed");
    }

    println!("\n{}", "=".repeat(60));
    println!("BENCHMARK COMPLETE");
    println!("{}", "=".repeat(60));
}
