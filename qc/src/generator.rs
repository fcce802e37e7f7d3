//! Core generator trait, type erasure and generator keys.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use rand::RngCore;

use crate::call_site::CallSite;
use crate::error::GenerationError;
use crate::value::Value;

/// An infinite, non-restartable stream of arbitrary values
///
/// Generators carry state between draws (bootstrap progress, cycling
/// positions), so drawing takes `&mut self`. Randomness always comes from the
/// caller's RNG, which keeps whole runs reproducible from one seed.
pub trait Generator<T> {
    /// Draw the next value
    fn generate(&mut self, rng: &mut dyn RngCore) -> T;

    /// View the generator as an iterator over its draws
    fn draws<'a>(&'a mut self, rng: &'a mut dyn RngCore) -> Draws<'a, Self, T>
    where
        Self: Sized,
    {
        Draws {
            generator: self,
            rng,
            _phantom: PhantomData,
        }
    }
}

impl<T, G: Generator<T> + ?Sized> Generator<T> for Box<G> {
    fn generate(&mut self, rng: &mut dyn RngCore) -> T {
        (**self).generate(rng)
    }
}

/// Iterator adapter returned by [`Generator::draws`]; never ends
pub struct Draws<'a, G, T> {
    generator: &'a mut G,
    rng: &'a mut dyn RngCore,
    _phantom: PhantomData<fn() -> T>,
}

impl<G: Generator<T>, T> Iterator for Draws<'_, G, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Some(self.generator.generate(&mut *self.rng))
    }
}

/// A generator of [`Value`]s with its concrete type erased
///
/// This is what the registry stores, and what kind factories return.
pub struct BoxedGenerator {
    generator: Box<dyn Generator<Value>>,
}

impl BoxedGenerator {
    /// Erase a typed generator whose values convert into [`Value`]
    pub fn new<T, G>(generator: G) -> Self
    where
        T: Into<Value> + 'static,
        G: Generator<T> + 'static,
    {
        Self {
            generator: Box::new(GeneratorWrapper {
                inner: generator,
                _phantom: PhantomData,
            }),
        }
    }
}

impl Generator<Value> for BoxedGenerator {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Value {
        self.generator.generate(rng)
    }
}

impl fmt::Debug for BoxedGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedGenerator").finish_non_exhaustive()
    }
}

/// Wrapper to make any typed Generator produce Values
struct GeneratorWrapper<G, T> {
    inner: G,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Into<Value>, G: Generator<T>> Generator<Value> for GeneratorWrapper<G, T> {
    fn generate(&mut self, rng: &mut dyn RngCore) -> Value {
        self.inner.generate(rng).into()
    }
}

/// Positional and keyword arguments of a generator request
///
/// Keyword arguments live in a sorted map so that two requests naming the
/// same arguments in a different order build the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeneratorArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl GeneratorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument; `None` values are left out entirely
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_none() {
            self.keyword.insert(name.into(), value);
        }
        self
    }

    /// Look an argument up by position, falling back to its keyword name
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.positional
            .get(index)
            .filter(|value| !value.is_none())
            .or_else(|| self.keyword.get(name))
    }

    /// An integer argument, or `default` when absent
    pub fn int_or(
        &self,
        kind: &str,
        index: usize,
        name: &str,
        default: i128,
    ) -> Result<i128, GenerationError> {
        match self.get(index, name) {
            None => Ok(default),
            Some(value) => value.as_int().ok_or_else(|| {
                GenerationError::invalid_argument(
                    kind,
                    name,
                    format!("expected an int, got a {}", value.type_name()),
                )
            }),
        }
    }

    /// An optional integer argument
    pub fn opt_int(
        &self,
        kind: &str,
        index: usize,
        name: &str,
    ) -> Result<Option<i128>, GenerationError> {
        self.get(index, name)
            .map(|value| {
                value.as_int().ok_or_else(|| {
                    GenerationError::invalid_argument(
                        kind,
                        name,
                        format!("expected an int, got a {}", value.type_name()),
                    )
                })
            })
            .transpose()
    }

    /// An optional length argument: a non-negative integer that fits in usize
    pub fn opt_len(
        &self,
        kind: &str,
        index: usize,
        name: &str,
    ) -> Result<Option<usize>, GenerationError> {
        self.opt_int(kind, index, name)?
            .map(|n| {
                usize::try_from(n).map_err(|_| {
                    GenerationError::invalid_argument(
                        kind,
                        name,
                        format!("{} is not a valid length", n),
                    )
                })
            })
            .transpose()
    }

    /// A float argument, or `default` when absent
    pub fn float_or(
        &self,
        kind: &str,
        index: usize,
        name: &str,
        default: f64,
    ) -> Result<f64, GenerationError> {
        match self.get(index, name) {
            None => Ok(default),
            Some(value) => value.as_float().ok_or_else(|| {
                GenerationError::invalid_argument(
                    kind,
                    name,
                    format!("expected a float, got a {}", value.type_name()),
                )
            }),
        }
    }
}

impl fmt::Display for GeneratorArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.positional {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
            first = false;
        }
        for (name, value) in &self.keyword {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Identity of one persistent generator instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratorKey {
    pub kind: String,
    pub args: GeneratorArgs,
    pub call_site: CallSite,
}

impl GeneratorKey {
    pub fn new(kind: impl Into<String>, args: GeneratorArgs, call_site: CallSite) -> Self {
        Self {
            kind: kind.into(),
            args,
            call_site,
        }
    }
}

impl fmt::Display for GeneratorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) @ {}", self.kind, self.args, self.call_site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct Counter {
        next: i64,
    }

    impl Generator<i64> for Counter {
        fn generate(&mut self, _rng: &mut dyn RngCore) -> i64 {
            self.next += 1;
            self.next
        }
    }

    #[test]
    fn test_draws_iterator_advances_state() {
        let mut generator = Counter { next: 0 };
        let mut rng = StdRng::seed_from_u64(1);
        let first: Vec<i64> = generator.draws(&mut rng).take(3).collect();
        assert_eq!(first, vec![1, 2, 3]);

        // Non-restartable: a new iterator continues where the last stopped
        let more: Vec<i64> = generator.draws(&mut rng).take(2).collect();
        assert_eq!(more, vec![4, 5]);
    }

    #[test]
    fn test_boxed_generator_erases_type() {
        let mut boxed = BoxedGenerator::new(Counter { next: 10 });
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(boxed.generate(&mut rng), Value::Int(11));
        assert_eq!(boxed.generate(&mut rng), Value::Int(12));
    }

    #[test]
    fn test_keyword_order_does_not_matter() {
        let a = GeneratorArgs::new().kwarg("maxlen", 5).kwarg("length", 2);
        let b = GeneratorArgs::new().kwarg("length", 2).kwarg("maxlen", 5);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "length=2, maxlen=5");

        let site = CallSite::label("s");
        assert_eq!(
            GeneratorKey::new("text", a, site.clone()),
            GeneratorKey::new("text", b, site)
        );
    }

    #[test]
    fn test_none_keywords_are_omitted() {
        let args = GeneratorArgs::new()
            .kwarg("length", None::<usize>)
            .kwarg("maxlen", Some(3usize));
        assert_eq!(args.keyword.len(), 1);
        assert_eq!(args.opt_len("text", 0, "length").unwrap(), None);
        assert_eq!(args.opt_len("text", 1, "maxlen").unwrap(), Some(3));
    }

    #[test]
    fn test_argument_lookup() {
        let args = GeneratorArgs::new().arg(-5).kwarg("high", 9);
        assert_eq!(args.int_or("int", 0, "low", 0).unwrap(), -5);
        assert_eq!(args.int_or("int", 1, "high", 0).unwrap(), 9);
        assert_eq!(args.float_or("float", 0, "low", 0.0).unwrap(), -5.0);

        let args = GeneratorArgs::new().arg("oops");
        assert!(matches!(
            args.int_or("int", 0, "low", 0),
            Err(GenerationError::InvalidArgument { .. })
        ));

        let args = GeneratorArgs::new().arg(-1);
        assert!(args.opt_len("random_bytes", 0, "length").is_err());
    }

    #[test]
    fn test_key_display() {
        let key = GeneratorKey::new(
            "int",
            GeneratorArgs::new().arg(0).arg(10),
            CallSite::index(2),
        );
        assert_eq!(key.to_string(), "int(0, 10) @ #2");
    }
}
