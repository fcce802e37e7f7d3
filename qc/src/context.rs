//! The draw context handed to every property invocation.

use std::fmt;

use rand::RngCore;
use rand::rngs::StdRng;

use crate::call_site::CallSite;
use crate::error::GenerationError;
use crate::generator::{BoxedGenerator, Generator, GeneratorArgs, GeneratorKey};
use crate::registry::{GeneratorRegistry, kinds};
use crate::rng::{create_seeded_rng, fresh_seed};
use crate::value::Value;

/// One value drawn during the current iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub call_site: CallSite,
    pub kind: String,
    pub value: Value,
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} (at {})", self.kind, self.value, self.call_site)
    }
}

/// Owns a generator registry and the RNG every draw uses
///
/// Each entry point is `#[track_caller]`: the generator it draws from is
/// keyed by the caller's source location, so a given line of a property keeps
/// the same generator across iterations while two different lines get
/// independent ones. Helpers that draw on behalf of their caller should be
/// `#[track_caller]` too.
///
/// ```
/// let mut ctx = qc::Context::with_seed(7);
/// let n = ctx.int(0, 10).unwrap();
/// assert!((0..10).contains(&n));
/// ```
#[derive(Debug)]
pub struct Context {
    registry: GeneratorRegistry,
    rng: StdRng,
    seed: u64,
    draws: Vec<Draw>,
}

impl Context {
    /// A context seeded from entropy
    pub fn new() -> Self {
        Self::with_seed(fresh_seed())
    }

    /// A context whose draws are fully determined by `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            registry: GeneratorRegistry::with_builtin_kinds(),
            rng: create_seeded_rng(seed),
            seed,
            draws: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Resolve the generator for (`kind`, `args`, `call_site`) and draw once
    pub fn draw(
        &mut self,
        kind: &str,
        args: GeneratorArgs,
        call_site: CallSite,
    ) -> Result<Value, GenerationError> {
        let key = GeneratorKey::new(kind, args, call_site.clone());
        let value = self.registry.resolve(key, &mut self.rng)?.generate(&mut self.rng);
        tracing::trace!(kind, %call_site, %value, "drew value");
        self.draws.push(Draw {
            call_site,
            kind: kind.to_string(),
            value: value.clone(),
        });
        Ok(value)
    }

    /// [`Context::draw`], converting the value to `T`
    pub fn draw_as<T: TryFrom<Value>>(
        &mut self,
        kind: &str,
        args: GeneratorArgs,
        call_site: CallSite,
    ) -> Result<T, GenerationError> {
        let value = self.draw(kind, args, call_site)?;
        let found = value.type_name();
        T::try_from(value).map_err(|_| GenerationError::ValueMismatch {
            kind: kind.to_string(),
            expected: std::any::type_name::<T>(),
            found,
        })
    }

    /// An integer in `[low, high)`
    #[track_caller]
    pub fn int(&mut self, low: i64, high: i64) -> Result<i64, GenerationError> {
        let args = GeneratorArgs::new().arg(low).arg(high);
        self.draw_as(kinds::INT, args, CallSite::caller())
    }

    /// A wide integer in `[low, high)`
    #[track_caller]
    pub fn long(&mut self, low: i128, high: i128) -> Result<i128, GenerationError> {
        let args = GeneratorArgs::new().arg(low).arg(high);
        self.draw_as(kinds::LONG, args, CallSite::caller())
    }

    /// A finite float in `[low, high]`
    #[track_caller]
    pub fn float(&mut self, low: f64, high: f64) -> Result<f64, GenerationError> {
        let args = GeneratorArgs::new().arg(low).arg(high);
        self.draw_as(kinds::FLOAT, args, CallSite::caller())
    }

    /// Random bytes: exactly `length` of them, or at most `max_len`
    #[track_caller]
    pub fn random_bytes(
        &mut self,
        length: Option<usize>,
        max_len: Option<usize>,
    ) -> Result<Vec<u8>, GenerationError> {
        let args = GeneratorArgs::new()
            .kwarg("length", length)
            .kwarg("maxlen", max_len);
        self.draw_as(kinds::RANDOM_BYTES, args, CallSite::caller())
    }

    /// Composite text as UTF-8 bytes; lengths count bytes
    #[track_caller]
    pub fn byte_string(
        &mut self,
        length: Option<usize>,
        max_len: Option<usize>,
    ) -> Result<Vec<u8>, GenerationError> {
        let args = GeneratorArgs::new()
            .kwarg("length", length)
            .kwarg("maxlen", max_len);
        self.draw_as(kinds::BYTE_STRING, args, CallSite::caller())
    }

    /// Composite text; lengths count characters
    #[track_caller]
    pub fn text(
        &mut self,
        length: Option<usize>,
        max_len: Option<usize>,
    ) -> Result<String, GenerationError> {
        let args = GeneratorArgs::new()
            .kwarg("length", length)
            .kwarg("maxlen", max_len);
        self.draw_as(kinds::TEXT, args, CallSite::caller())
    }

    /// A uniformly chosen element of `items`
    ///
    /// Every draw is independent and uniform; unlike the other entry points
    /// there is no deterministic bootstrap phase.
    #[track_caller]
    pub fn from_list<T>(&mut self, items: &[T]) -> Result<T, GenerationError>
    where
        T: Clone + Into<Value> + TryFrom<Value>,
    {
        let items = Value::list(items.iter().cloned());
        let args = GeneratorArgs::new().arg(items);
        self.draw_as(kinds::FROM_LIST, args, CallSite::caller())
    }

    /// The next awkward personal name
    #[track_caller]
    pub fn name(&mut self) -> Result<String, GenerationError> {
        self.draw_as(kinds::NAME, GeneratorArgs::new(), CallSite::caller())
    }

    /// The next awkward personal name, UTF-8 encoded
    #[track_caller]
    pub fn name_utf8(&mut self) -> Result<Vec<u8>, GenerationError> {
        self.draw_as(kinds::NAME_UTF8, GeneratorArgs::new(), CallSite::caller())
    }

    /// Drop every generator so the next draws start fresh bootstraps
    pub fn reset(&mut self) {
        self.registry.reset();
        self.draws.clear();
    }

    /// Add or replace a generator kind
    pub fn register_kind<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&GeneratorArgs, &mut dyn RngCore) -> Result<BoxedGenerator, GenerationError>
            + 'static,
    {
        self.registry.register_kind(name, factory);
    }

    /// Values drawn since the current iteration began
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    /// Start a new iteration: forget the previous iteration's draws
    ///
    /// Generators are kept, so bootstrap progress carries over.
    pub fn begin_iteration(&mut self) {
        self.draws.clear();
    }

    /// Number of live generators
    pub fn generator_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_line_shares_generator_across_calls() {
        let mut ctx = Context::with_seed(1);
        let values: Vec<i64> = (0..3).map(|_| ctx.int(0, 10).unwrap()).collect();
        assert_eq!(values, vec![0, 1, 9]);
        assert_eq!(ctx.generator_count(), 1);
    }

    #[test]
    fn test_distinct_lines_are_independent() {
        let mut ctx = Context::with_seed(1);
        let a = ctx.int(0, 10).unwrap();
        let b = ctx.int(0, 10).unwrap();
        assert_eq!((a, b), (0, 0));
        assert_eq!(ctx.generator_count(), 2);
    }

    #[test]
    fn test_draw_log_and_iterations() {
        let mut ctx = Context::with_seed(2);
        ctx.int(0, 10).unwrap();
        ctx.float(-1.0, 1.0).unwrap();
        assert_eq!(ctx.draws().len(), 2);
        assert_eq!(ctx.draws()[0].kind, "int");
        assert_eq!(ctx.draws()[0].value, Value::Int(0));

        ctx.begin_iteration();
        assert!(ctx.draws().is_empty());
        assert_eq!(ctx.generator_count(), 2);
    }

    #[test]
    fn test_reset_restarts_bootstrap() {
        let mut ctx = Context::with_seed(3);
        let draw = |ctx: &mut Context| ctx.int(0, 10).unwrap();
        assert_eq!(draw(&mut ctx), 0);
        assert_eq!(draw(&mut ctx), 1);
        ctx.reset();
        assert_eq!(ctx.generator_count(), 0);
        assert_eq!(draw(&mut ctx), 0);
    }

    #[test]
    fn test_from_list_typed() {
        let mut ctx = Context::with_seed(4);
        let mut seen = Vec::new();
        for _ in 0..1000 {
            let pick: String = ctx
                .from_list(&["a".to_string(), "b".to_string()])
                .unwrap();
            assert!(pick == "a" || pick == "b");
            seen.push(pick);
        }
        assert!(seen.iter().any(|s| s == "a") && seen.iter().any(|s| s == "b"));

        let empty: &[i32] = &[];
        assert!(matches!(
            ctx.from_list(empty),
            Err(GenerationError::EmptyList { .. })
        ));
    }

    #[test]
    fn test_explicit_call_sites() {
        let mut ctx = Context::with_seed(5);
        let args = || GeneratorArgs::new().arg(0).arg(10);
        let first = ctx.draw("int", args(), CallSite::label("x")).unwrap();
        let second = ctx.draw("int", args(), CallSite::label("x")).unwrap();
        let other = ctx.draw("int", args(), CallSite::index(0)).unwrap();
        assert_eq!(first, Value::Int(0));
        assert_eq!(second, Value::Int(1));
        assert_eq!(other, Value::Int(0));
    }

    #[test]
    fn test_value_mismatch_for_replaced_kind() {
        let mut ctx = Context::with_seed(6);
        ctx.register_kind("int", |_, _| {
            Ok(BoxedGenerator::new(crate::primitives::Cycle::new(
                "int",
                vec!["not a number".to_string()],
            )?))
        });
        assert!(matches!(
            ctx.int(0, 10),
            Err(GenerationError::ValueMismatch { found: "text", .. })
        ));
    }

    #[test]
    fn test_names_cycle() {
        let mut ctx = Context::with_seed(7);
        let names: Vec<String> = (0..3).map(|_| ctx.name().unwrap()).collect();
        assert_eq!(names[0], "");
        assert_eq!(names[1], "\u{a0}");
        assert_eq!(ctx.name_utf8().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_same_seed_same_draws() {
        fn run(seed: u64) -> Vec<Value> {
            let mut ctx = Context::with_seed(seed);
            for _ in 0..50 {
                ctx.int(-100, 100).unwrap();
                ctx.float(0.0, 1.0).unwrap();
                ctx.text(None, Some(20)).unwrap();
            }
            ctx.draws().iter().map(|d| d.value.clone()).collect()
        }
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn test_unknown_kind_via_draw() {
        let mut ctx = Context::with_seed(8);
        assert!(matches!(
            ctx.draw("nope", GeneratorArgs::new(), CallSite::caller()),
            Err(GenerationError::UnknownKind { .. })
        ));
        assert!(ctx.draws().is_empty());
    }
}
