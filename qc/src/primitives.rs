//! Concrete generators for integers, floats and byte strings, plus the
//! bootstrap-free list picker and corpus cycling.

use std::fmt::Debug;

use num_traits::{NumCast, PrimInt};
use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Triangular};

use crate::error::GenerationError;
use crate::generator::Generator;
use crate::sampler::{NormalSampler, TrickySet, WithTrickySet};

/// Probability that a float's normal draw uses the triangular distribution
pub const TRIANGULAR_PROBABILITY: f64 = 0.6;

/// Half-width of the window used by uniform float draws
pub const UNIFORM_WINDOW: f64 = 10.0;

/// Exclusive upper bound of a byte string's "short" length generator
pub const SHORT_LENGTH_LIMIT: usize = 10;

/// Exclusive upper bound of a byte string's "long" length generator
pub const LONG_LENGTH_LIMIT: usize = 500;

/// Uniform integers over a half-open range
#[derive(Debug, Clone)]
pub struct IntSampler<T> {
    low: T,
    high: T,
}

impl<T> NormalSampler for IntSampler<T>
where
    T: PrimInt + SampleUniform,
{
    type Value = T;

    fn sample(&mut self, rng: &mut dyn RngCore) -> T {
        rng.gen_range(self.low..self.high)
    }
}

/// Generator for integers in `[low, high)`
///
/// Tricky values are 0, 1, -1, 65536 and both ends of the range, keeping
/// those the type can represent and the range admits.
#[derive(Debug, Clone)]
pub struct IntGenerator<T>
where
    T: PrimInt + SampleUniform,
{
    inner: WithTrickySet<IntSampler<T>>,
}

impl<T> IntGenerator<T>
where
    T: PrimInt + SampleUniform + Debug,
{
    pub fn new(low: T, high: T, rng: &mut dyn RngCore) -> Result<Self, GenerationError> {
        Self::with_kind("int", low, high, rng)
    }

    /// Like [`IntGenerator::new`], naming `kind` in construction errors
    pub fn with_kind(
        kind: &str,
        low: T,
        high: T,
        rng: &mut dyn RngCore,
    ) -> Result<Self, GenerationError> {
        if low >= high {
            return Err(GenerationError::invalid_bounds(kind, low, high));
        }

        let candidates = [
            Some(T::zero()),
            Some(T::one()),
            <T as NumCast>::from(-1i32),
            <T as NumCast>::from(65536i32),
            Some(low),
            Some(high - T::one()),
        ];
        let tricky = TrickySet::new(
            candidates.into_iter().flatten(),
            |v| low <= *v && *v < high,
            |a, b| a == b,
        );

        Ok(Self {
            inner: WithTrickySet::new(tricky, IntSampler { low, high }, rng),
        })
    }

    pub fn tricky(&self) -> &[T] {
        self.inner.tricky().values()
    }

    pub fn bootstrap_remaining(&self) -> usize {
        self.inner.bootstrap_remaining()
    }
}

impl<T> Generator<T> for IntGenerator<T>
where
    T: PrimInt + SampleUniform,
{
    fn generate(&mut self, rng: &mut dyn RngCore) -> T {
        self.inner.generate(rng)
    }
}

/// Triangular-or-uniform floats, clamped to `[low, high]`
#[derive(Debug, Clone)]
pub struct FloatSampler {
    low: f64,
    high: f64,
    /// Unit triangular distribution peaked at 0.5, interpolated onto the range
    triangular: Option<Triangular<f64>>,
    /// `[low, high]` intersected with the uniform window, if non-empty
    uniform: Option<(f64, f64)>,
}

impl FloatSampler {
    fn new(low: f64, high: f64) -> Self {
        let triangular = if low < high {
            Triangular::new(0.0, 1.0, 0.5).ok()
        } else {
            None
        };

        let window = (low.max(-UNIFORM_WINDOW), high.min(UNIFORM_WINDOW));
        let uniform = (window.0 <= window.1).then_some(window);

        Self {
            low,
            high,
            triangular,
            uniform,
        }
    }

    /// Interpolate without forming `high - low`, which overflows for wide ranges
    fn lerp(&self, t: f64) -> f64 {
        self.low * (1.0 - t) + self.high * t
    }
}

impl NormalSampler for FloatSampler {
    type Value = f64;

    fn sample(&mut self, rng: &mut dyn RngCore) -> f64 {
        let value = match (self.uniform, &self.triangular) {
            (Some((lo, hi)), Some(_)) if !rng.gen_bool(TRIANGULAR_PROBABILITY) => {
                rng.gen_range(lo..=hi)
            }
            (Some((lo, hi)), None) => rng.gen_range(lo..=hi),
            (_, Some(distribution)) => self.lerp(distribution.sample(rng)),
            (None, None) => self.low,
        };
        value.clamp(self.low, self.high)
    }
}

/// Generator for finite floats in `[low, high]`; never yields NaN
#[derive(Debug, Clone)]
pub struct FloatGenerator {
    inner: WithTrickySet<FloatSampler>,
}

impl FloatGenerator {
    pub fn new(low: f64, high: f64, rng: &mut dyn RngCore) -> Result<Self, GenerationError> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(GenerationError::invalid_bounds("float", low, high));
        }

        let candidates = [
            0.0,
            -0.0,
            1.0,
            -1.0,
            1e-10,
            -1e-10,
            low,
            high,
            f64::EPSILON,
        ];
        let tricky = TrickySet::new(
            candidates,
            |v| low <= *v && *v <= high,
            |a, b| a.to_bits() == b.to_bits(),
        );

        Ok(Self {
            inner: WithTrickySet::new(tricky, FloatSampler::new(low, high), rng),
        })
    }

    pub fn tricky(&self) -> &[f64] {
        self.inner.tricky().values()
    }

    pub fn bootstrap_remaining(&self) -> usize {
        self.inner.bootstrap_remaining()
    }
}

impl Generator<f64> for FloatGenerator {
    fn generate(&mut self, rng: &mut dyn RngCore) -> f64 {
        self.inner.generate(rng)
    }
}

/// `n` bytes from the RNG
pub fn random_bytes(rng: &mut dyn RngCore, n: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; n];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Random bytes whose length comes from a short or a long length generator
#[derive(Debug, Clone)]
pub struct ByteStringSampler {
    short: IntGenerator<usize>,
    long: IntGenerator<usize>,
}

impl NormalSampler for ByteStringSampler {
    type Value = Vec<u8>;

    fn sample(&mut self, rng: &mut dyn RngCore) -> Vec<u8> {
        let n = if rng.gen_bool(0.5) {
            self.short.generate(rng)
        } else {
            self.long.generate(rng)
        };
        random_bytes(rng, n)
    }
}

/// Generator for byte strings strictly shorter than `max_len` bytes
///
/// A `max_len` of zero admits no length at all and is rejected.
#[derive(Debug, Clone)]
pub struct ByteStringGenerator {
    inner: WithTrickySet<ByteStringSampler>,
    max_len: Option<usize>,
}

impl ByteStringGenerator {
    pub fn new(max_len: Option<usize>, rng: &mut dyn RngCore) -> Result<Self, GenerationError> {
        if max_len == Some(0) {
            return Err(GenerationError::invalid_bounds("byte_string", 0, 0));
        }
        let limit = |cap: usize| max_len.map_or(cap, |max| max.min(cap));
        let short = IntGenerator::with_kind("byte_string", 0, limit(SHORT_LENGTH_LIMIT), rng)?;
        let long = IntGenerator::with_kind("byte_string", 0, limit(LONG_LENGTH_LIMIT), rng)?;

        let candidates: [&[u8]; 4] = [b"", b"\0", b"\xc2", b"\0foo"];
        let tricky = TrickySet::new(
            candidates.into_iter().map(<[u8]>::to_vec),
            |v| max_len.is_none_or(|max| v.len() < max),
            |a, b| a == b,
        );

        Ok(Self {
            inner: WithTrickySet::new(tricky, ByteStringSampler { short, long }, rng),
            max_len,
        })
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    pub fn tricky(&self) -> &[Vec<u8>] {
        self.inner.tricky().values()
    }
}

impl Generator<Vec<u8>> for ByteStringGenerator {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Vec<u8> {
        self.inner.generate(rng)
    }
}

/// Exactly `length` random bytes per draw, no tricky values
#[derive(Debug, Clone)]
pub struct FixedLengthBytes {
    length: usize,
}

impl FixedLengthBytes {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Generator<Vec<u8>> for FixedLengthBytes {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Vec<u8> {
        random_bytes(rng, self.length)
    }
}

/// Uniform independent picks from a fixed list
///
/// Unlike the other generators this one has no tricky values and no
/// bootstrap: the first draw is already random, and every element is equally
/// likely on every draw.
#[derive(Debug, Clone)]
pub struct FromList<T> {
    items: Vec<T>,
}

impl<T> FromList<T> {
    pub fn new(items: Vec<T>) -> Result<Self, GenerationError> {
        if items.is_empty() {
            return Err(GenerationError::EmptyList {
                kind: "from_list".to_string(),
            });
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> Generator<T> for FromList<T> {
    fn generate(&mut self, rng: &mut dyn RngCore) -> T {
        self.items[rng.gen_range(0..self.items.len())].clone()
    }
}

/// Deterministic round-robin over a fixed list
#[derive(Debug, Clone)]
pub struct Cycle<T> {
    items: Vec<T>,
    position: usize,
}

impl<T> Cycle<T> {
    pub fn new(kind: &str, items: Vec<T>) -> Result<Self, GenerationError> {
        if items.is_empty() {
            return Err(GenerationError::EmptyList {
                kind: kind.to_string(),
            });
        }
        Ok(Self { items, position: 0 })
    }
}

impl<T: Clone> Generator<T> for Cycle<T> {
    fn generate(&mut self, _rng: &mut dyn RngCore) -> T {
        let value = self.items[self.position].clone();
        self.position = (self.position + 1) % self.items.len();
        value
    }
}
