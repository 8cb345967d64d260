//! Deterministic random streams
//!
//! One run seed fans out into independent sub-streams keyed by a domain
//! label and a unit index. Workers generating content units concurrently
//! each own their sub-stream, so scheduling order never changes what any
//! unit samples - parallel runs reproduce sequential ones bit for bit.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Derive the sub-stream RNG for one content unit
///
/// The sub-seed is the first eight bytes of `SHA-256(seed || domain || index)`,
/// so streams for different domains or indices are statistically independent
/// while remaining a pure function of the run seed.
#[must_use]
pub fn unit_rng(seed: u64, domain: &str, index: u64) -> StdRng {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(domain.as_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();

    let mut sub_seed = [0u8; 8];
    sub_seed.copy_from_slice(&digest[..8]);
    StdRng::seed_from_u64(u64::from_le_bytes(sub_seed))
}

/// Pick an index according to relative weights
///
/// Weights need not sum to one; zero-weight entries are never picked.
/// Falls back to the final index on accumulated floating-point shortfall.
#[must_use]
pub fn weighted_index(rng: &mut StdRng, weights: &[f64]) -> usize {
    debug_assert!(!weights.is_empty());
    let total: f64 = weights.iter().sum();
    let mut roll = rng.gen::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        if roll < *w {
            return i;
        }
        roll -= w;
    }
    weights.len() - 1
}

/// Sample an integer from an inclusive range
#[must_use]
pub fn range_inclusive(rng: &mut StdRng, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..=max)
}
