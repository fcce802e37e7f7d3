//! Seeds and the RNGs built from them.
//!
//! Every run is seeded, even when nobody asked for a seed: an unseeded run
//! draws its seed from OS entropy first, so a failure can always be replayed.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// A seed from OS entropy
pub fn fresh_seed() -> u64 {
    rand::random()
}

/// The configured seed, or a fresh one
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(fresh_seed)
}

pub fn create_seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
