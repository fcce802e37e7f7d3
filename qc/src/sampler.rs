//! The tricky/bootstrap sampling policy shared by the concrete generators.
//!
//! A fresh generator first plays back its tricky values deterministically, in
//! their original order, then once more in a shuffled order. After that
//! bootstrap each draw returns a random tricky value with probability
//! [`TRICKY_PROBABILITY`], and otherwise a "normal" value from the
//! generator-specific [`NormalSampler`].

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::generator::Generator;

/// Probability of a tricky value once the bootstrap sequence is exhausted
pub const TRICKY_PROBABILITY: f64 = 0.1;

/// Ordered edge-case values for one generator configuration
///
/// Candidates that violate the generator's constraints are filtered out on
/// construction. Repeated candidates keep their first position only.
#[derive(Debug, Clone, PartialEq)]
pub struct TrickySet<T> {
    values: Vec<T>,
}

impl<T> TrickySet<T> {
    /// Build a set from candidate values.
    ///
    /// `admit` decides validity for the generator, `same` decides duplicates.
    pub fn new<I, A, S>(candidates: I, admit: A, same: S) -> Self
    where
        I: IntoIterator<Item = T>,
        A: Fn(&T) -> bool,
        S: Fn(&T, &T) -> bool,
    {
        let mut values: Vec<T> = Vec::new();
        for candidate in candidates {
            if admit(&candidate) && !values.iter().any(|kept| same(kept, &candidate)) {
                values.push(candidate);
            }
        }
        Self { values }
    }

    pub fn empty() -> Self {
        Self { values: Vec::new() }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Clone> TrickySet<T> {
    /// A uniformly chosen tricky value, if there are any
    pub fn choose(&self, rng: &mut dyn RngCore) -> Option<T> {
        self.values.choose(rng).cloned()
    }

    /// The bootstrap queue: values in order, then shuffled, stored reversed so
    /// that popping from the back yields them front to back
    fn bootstrap_queue(&self, rng: &mut dyn RngCore) -> Vec<T> {
        let mut shuffled = self.values.clone();
        shuffled.shuffle(rng);

        let mut queue = self.values.clone();
        queue.extend(shuffled);
        queue.reverse();
        queue
    }
}

/// The generator-specific rule for "normal" (non-tricky) values
pub trait NormalSampler {
    type Value: Clone;

    fn sample(&mut self, rng: &mut dyn RngCore) -> Self::Value;
}

/// A generator combining a tricky set, its bootstrap queue and a normal sampler
#[derive(Debug, Clone)]
pub struct WithTrickySet<S: NormalSampler> {
    tricky: TrickySet<S::Value>,
    bootstrap: Vec<S::Value>,
    sampler: S,
}

impl<S: NormalSampler> WithTrickySet<S> {
    /// Create the generator; the RNG only shuffles the bootstrap sequence
    pub fn new(tricky: TrickySet<S::Value>, sampler: S, rng: &mut dyn RngCore) -> Self {
        let bootstrap = tricky.bootstrap_queue(rng);
        Self {
            tricky,
            bootstrap,
            sampler,
        }
    }

    pub fn tricky(&self) -> &TrickySet<S::Value> {
        &self.tricky
    }

    /// Number of deterministic draws left before random sampling starts
    pub fn bootstrap_remaining(&self) -> usize {
        self.bootstrap.len()
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}

impl<S: NormalSampler> Generator<S::Value> for WithTrickySet<S> {
    fn generate(&mut self, rng: &mut dyn RngCore) -> S::Value {
        if let Some(value) = self.bootstrap.pop() {
            if self.bootstrap.is_empty() {
                tracing::trace!(tricky = self.tricky.len(), "bootstrap sequence exhausted");
            }
            return value;
        }
        if rng.gen_bool(TRICKY_PROBABILITY) {
            if let Some(value) = self.tricky.choose(rng) {
                return value;
            }
        }
        self.sampler.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Normal values are always 1000, so tricky draws are easy to tell apart
    #[derive(Debug, Clone)]
    struct Thousand;

    impl NormalSampler for Thousand {
        type Value = i32;

        fn sample(&mut self, _rng: &mut dyn RngCore) -> i32 {
            1000
        }
    }

    fn tricky(values: &[i32]) -> TrickySet<i32> {
        TrickySet::new(values.iter().copied(), |_| true, |a, b| a == b)
    }

    #[test]
    fn test_tricky_set_filters_and_dedups() {
        let set = TrickySet::new(vec![0, 1, -1, 0, 9], |v| *v >= 0, |a, b| a == b);
        assert_eq!(set.values(), &[0, 1, 9]);
        assert_eq!(set.len(), 3);
        assert!(TrickySet::<i32>::empty().is_empty());
    }

    #[test]
    fn test_bootstrap_plays_in_order_then_shuffled() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut generator = WithTrickySet::new(tricky(&[5, 6, 7, 8]), Thousand, &mut rng);
        assert_eq!(generator.bootstrap_remaining(), 8);

        let first: Vec<i32> = generator.draws(&mut rng).take(4).collect();
        assert_eq!(first, vec![5, 6, 7, 8]);

        let mut second: Vec<i32> = generator.draws(&mut rng).take(4).collect();
        second.sort();
        assert_eq!(second, vec![5, 6, 7, 8]);
        assert_eq!(generator.bootstrap_remaining(), 0);
    }

    #[test]
    fn test_after_bootstrap_mostly_normal_values() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut generator = WithTrickySet::new(tricky(&[1, 2]), Thousand, &mut rng);
        let _bootstrap: Vec<i32> = generator.draws(&mut rng).take(4).collect();

        let draws: Vec<i32> = generator.draws(&mut rng).take(10_000).collect();
        let tricky_count = draws.iter().filter(|v| **v != 1000).count();
        assert!(draws.iter().all(|v| [1, 2, 1000].contains(v)));
        // Expect ~1000 tricky draws at p = 0.1
        assert!(tricky_count > 700 && tricky_count < 1300, "{}", tricky_count);
    }

    #[test]
    fn test_empty_tricky_set_always_samples_normally() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut generator = WithTrickySet::new(TrickySet::empty(), Thousand, &mut rng);
        assert_eq!(generator.bootstrap_remaining(), 0);
        assert!(generator.draws(&mut rng).take(500).all(|v| v == 1000));
    }

    #[test]
    fn test_shuffle_depends_on_rng() {
        let values: Vec<i32> = (0..16).collect();
        let orders: Vec<Vec<i32>> = (0..4)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut generator = WithTrickySet::new(tricky(&values), Thousand, &mut rng);
                generator.draws(&mut rng).skip(16).take(16).collect()
            })
            .collect();
        assert!(orders.iter().any(|order| *order != orders[0]));
    }
}
