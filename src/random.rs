//! Random draws for stochastic models.
//!
//! [`flip`] is the building block of the coin-flip style models: a
//! Bernoulli draw that takes any [`Rng`], so scripts can pass a seeded
//! generator from [`seeded`] and reproduce a run exactly.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use thiserror::Error;

/// A probability outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("probability must lie in [0, 1], got {probability}")]
pub struct ProbabilityError {
    /// The offending probability.
    pub probability: f64,
}

/// Draws `true` with probability `p`.
///
/// # Errors
///
/// Returns [`ProbabilityError`] when `p` is NaN or outside `[0, 1]`.
pub fn flip(p: f64, rng: &mut impl Rng) -> Result<bool, ProbabilityError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ProbabilityError { probability: p });
    }
    Ok(rng.gen_range(0.0..1.0) < p)
}

/// A deterministic generator for reproducible runs.
#[must_use]
pub fn seeded(seed: u64) -> Pcg64 {
    Pcg64::seed_from_u64(seed)
}
