//! Call-site generator registry: one persistent generator per key.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rand::RngCore;

use crate::corpus::NAMES;
use crate::error::GenerationError;
use crate::generator::{BoxedGenerator, GeneratorArgs, GeneratorKey};
use crate::primitives::{
    ByteStringGenerator, Cycle, FixedLengthBytes, FloatGenerator, FromList, IntGenerator,
};
use crate::text::{ByteTextGenerator, TextGenerator};
use crate::value::Value;

/// Names of the built-in generator kinds
pub mod kinds {
    pub const INT: &str = "int";
    pub const LONG: &str = "long";
    pub const FLOAT: &str = "float";
    pub const RANDOM_BYTES: &str = "random_bytes";
    pub const BYTE_STRING: &str = "byte_string";
    pub const TEXT: &str = "text";
    pub const FROM_LIST: &str = "from_list";
    pub const NAME: &str = "name";
    pub const NAME_UTF8: &str = "name_utf8";

    pub const ALL: &[&str] = &[
        INT,
        LONG,
        FLOAT,
        RANDOM_BYTES,
        BYTE_STRING,
        TEXT,
        FROM_LIST,
        NAME,
        NAME_UTF8,
    ];
}

/// Default bounds of the `int` kind, `[low, high)`
pub const INT_DEFAULT_BOUNDS: (i64, i64) = (i64::MIN, i64::MAX);

/// Default bounds of the `long` kind, `[low, high)`
pub const LONG_DEFAULT_BOUNDS: (i128, i128) = (-2 * i64::MAX as i128, 2 * i64::MAX as i128);

/// Default bounds of the `float` kind, `[low, high]`
pub const FLOAT_DEFAULT_BOUNDS: (f64, f64) = (-1e11, 1e11);

/// Builds a generator for one kind from the request's arguments
///
/// The RNG is only used for construction-time randomness such as the
/// bootstrap shuffle.
pub type GeneratorFactory =
    Box<dyn Fn(&GeneratorArgs, &mut dyn RngCore) -> Result<BoxedGenerator, GenerationError>>;

/// Maps generator keys to persistent generator instances
pub struct GeneratorRegistry {
    factories: HashMap<String, GeneratorFactory>,
    generators: HashMap<GeneratorKey, BoxedGenerator>,
}

impl GeneratorRegistry {
    /// An empty registry with no kinds registered
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            generators: HashMap::new(),
        }
    }

    /// A registry with every built-in kind registered
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        registry.register_kind(kinds::INT, build_int);
        registry.register_kind(kinds::LONG, build_long);
        registry.register_kind(kinds::FLOAT, build_float);
        registry.register_kind(kinds::RANDOM_BYTES, build_random_bytes);
        registry.register_kind(kinds::BYTE_STRING, build_byte_string);
        registry.register_kind(kinds::TEXT, build_text);
        registry.register_kind(kinds::FROM_LIST, build_from_list);
        registry.register_kind(kinds::NAME, |_, _| {
            let names = NAMES.iter().map(|name| name.to_string()).collect();
            Ok(BoxedGenerator::new(Cycle::<String>::new(kinds::NAME, names)?))
        });
        registry.register_kind(kinds::NAME_UTF8, |_, _| {
            let names = NAMES.iter().map(|name| name.as_bytes().to_vec()).collect();
            Ok(BoxedGenerator::new(Cycle::<Vec<u8>>::new(
                kinds::NAME_UTF8,
                names,
            )?))
        });
        registry
    }

    /// Add a kind, replacing any factory already registered under `name`
    pub fn register_kind<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&GeneratorArgs, &mut dyn RngCore) -> Result<BoxedGenerator, GenerationError>
            + 'static,
    {
        let name = name.into();
        tracing::trace!(kind = %name, "registering generator kind");
        self.factories.insert(name, Box::new(factory));
    }

    /// The generator for `key`, constructing it on first use
    pub fn resolve(
        &mut self,
        key: GeneratorKey,
        rng: &mut dyn RngCore,
    ) -> Result<&mut BoxedGenerator, GenerationError> {
        match self.generators.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let key = entry.key();
                let factory =
                    self.factories
                        .get(&key.kind)
                        .ok_or_else(|| GenerationError::UnknownKind {
                            name: key.kind.clone(),
                        })?;
                let generator = factory(&key.args, rng)?;
                tracing::debug!(key = %key, "constructed generator");
                Ok(entry.insert(generator))
            }
        }
    }

    /// Drop every generator instance; registered kinds are kept
    pub fn reset(&mut self) {
        if !self.generators.is_empty() {
            tracing::debug!(generators = self.generators.len(), "resetting registry");
        }
        self.generators.clear();
    }

    /// Number of live generator instances
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Whether a generator instance exists for `key`
    pub fn contains(&self, key: &GeneratorKey) -> bool {
        self.generators.contains_key(key)
    }

    pub fn has_kind(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtin_kinds()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("kinds", &self.kinds())
            .field("generators", &self.generators.len())
            .finish()
    }
}

fn narrow<T: TryFrom<i128>>(kind: &str, name: &str, value: i128) -> Result<T, GenerationError> {
    T::try_from(value).map_err(|_| {
        GenerationError::invalid_argument(kind, name, format!("{} is out of range", value))
    })
}

fn build_int(
    args: &GeneratorArgs,
    rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let (low, high) = INT_DEFAULT_BOUNDS;
    let low: i64 = narrow(kinds::INT, "low", args.int_or(kinds::INT, 0, "low", low.into())?)?;
    let high: i64 = narrow(kinds::INT, "high", args.int_or(kinds::INT, 1, "high", high.into())?)?;
    Ok(BoxedGenerator::new(IntGenerator::with_kind(kinds::INT, low, high, rng)?))
}

fn build_long(
    args: &GeneratorArgs,
    rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let (low, high) = LONG_DEFAULT_BOUNDS;
    let low = args.int_or(kinds::LONG, 0, "low", low)?;
    let high = args.int_or(kinds::LONG, 1, "high", high)?;
    Ok(BoxedGenerator::new(IntGenerator::with_kind(kinds::LONG, low, high, rng)?))
}

fn build_float(
    args: &GeneratorArgs,
    rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let (low, high) = FLOAT_DEFAULT_BOUNDS;
    let low = args.float_or(kinds::FLOAT, 0, "low", low)?;
    let high = args.float_or(kinds::FLOAT, 1, "high", high)?;
    Ok(BoxedGenerator::new(FloatGenerator::new(low, high, rng)?))
}

fn build_random_bytes(
    args: &GeneratorArgs,
    rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let length = args.opt_len(kinds::RANDOM_BYTES, 0, "length")?;
    let max_len = args.opt_len(kinds::RANDOM_BYTES, 1, "maxlen")?;
    Ok(match length {
        Some(length) => BoxedGenerator::new(FixedLengthBytes::new(length)),
        None => BoxedGenerator::new(ByteStringGenerator::new(max_len, rng)?),
    })
}

fn build_byte_string(
    args: &GeneratorArgs,
    rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let length = args.opt_len(kinds::BYTE_STRING, 0, "length")?;
    let max_len = args.opt_len(kinds::BYTE_STRING, 1, "maxlen")?;
    Ok(BoxedGenerator::new(ByteTextGenerator::new(length, max_len, rng)?))
}

fn build_text(
    args: &GeneratorArgs,
    rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let length = args.opt_len(kinds::TEXT, 0, "length")?;
    let max_len = args.opt_len(kinds::TEXT, 1, "maxlen")?;
    Ok(BoxedGenerator::new(TextGenerator::new(length, max_len, rng)?))
}

fn build_from_list(
    args: &GeneratorArgs,
    _rng: &mut dyn RngCore,
) -> Result<BoxedGenerator, GenerationError> {
    let items = match args.get(0, "items") {
        Some(Value::List(items)) => items.clone(),
        Some(other) => {
            return Err(GenerationError::invalid_argument(
                kinds::FROM_LIST,
                "items",
                format!("expected a list, got a {}", other.type_name()),
            ));
        }
        None => Vec::new(),
    };
    Ok(BoxedGenerator::new(FromList::<Value>::new(items)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_site::CallSite;
    use crate::generator::Generator;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn key(kind: &str, args: GeneratorArgs, site: &str) -> GeneratorKey {
        GeneratorKey::new(kind, args, CallSite::label(site.to_string()))
    }

    #[test]
    fn test_builtin_kinds_registered() {
        let registry = GeneratorRegistry::with_builtin_kinds();
        for kind in kinds::ALL {
            assert!(registry.has_kind(kind), "missing {}", kind);
        }
        assert_eq!(registry.kinds().len(), kinds::ALL.len());
        assert!(registry.is_empty());
        assert!(!GeneratorRegistry::new().has_kind(kinds::INT));
    }

    #[test]
    fn test_same_key_shares_generator() {
        let mut registry = GeneratorRegistry::with_builtin_kinds();
        let mut rng = StdRng::seed_from_u64(1);
        let args = GeneratorArgs::new().arg(0).arg(10);

        let first = registry
            .resolve(key(kinds::INT, args.clone(), "a"), &mut rng)
            .unwrap()
            .generate(&mut rng);
        let second = registry
            .resolve(key(kinds::INT, args.clone(), "a"), &mut rng)
            .unwrap()
            .generate(&mut rng);
        assert_eq!((first, second), (Value::Int(0), Value::Int(1)));
        assert_eq!(registry.len(), 1);

        // A different site starts its own bootstrap
        let other = registry
            .resolve(key(kinds::INT, args, "b"), &mut rng)
            .unwrap()
            .generate(&mut rng);
        assert_eq!(other, Value::Int(0));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reset_is_idempotent_and_keeps_kinds() {
        let mut registry = GeneratorRegistry::with_builtin_kinds();
        let mut rng = StdRng::seed_from_u64(2);
        let key = key(kinds::INT, GeneratorArgs::new().arg(0).arg(10), "a");

        registry.resolve(key.clone(), &mut rng).unwrap().generate(&mut rng);
        assert!(registry.contains(&key));

        registry.reset();
        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.has_kind(kinds::INT));

        let value = registry.resolve(key, &mut rng).unwrap().generate(&mut rng);
        assert_eq!(value, Value::Int(0));
    }

    #[test]
    fn test_unknown_kind() {
        let mut registry = GeneratorRegistry::with_builtin_kinds();
        let mut rng = StdRng::seed_from_u64(3);
        let err = registry
            .resolve(key("nope", GeneratorArgs::new(), "a"), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownKind {
                name: "nope".to_string()
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_construction_errors() {
        let mut registry = GeneratorRegistry::with_builtin_kinds();
        let mut rng = StdRng::seed_from_u64(4);

        let err = registry
            .resolve(key(kinds::INT, GeneratorArgs::new().arg(5).arg(5), "a"), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidBounds { .. }));

        let items = GeneratorArgs::new().arg(Value::List(vec![]));
        let err = registry
            .resolve(key(kinds::FROM_LIST, items, "b"), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyList { .. }));

        let too_big = GeneratorArgs::new().arg(i128::MAX);
        assert!(registry.resolve(key(kinds::INT, too_big, "c"), &mut rng).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_custom_kind() {
        struct Constant(i64);

        impl Generator<i64> for Constant {
            fn generate(&mut self, _rng: &mut dyn RngCore) -> i64 {
                self.0
            }
        }

        let mut registry = GeneratorRegistry::new();
        registry.register_kind("seven", |_, _| Ok(BoxedGenerator::new(Constant(7))));
        let mut rng = StdRng::seed_from_u64(5);
        let value = registry
            .resolve(key("seven", GeneratorArgs::new(), "a"), &mut rng)
            .unwrap()
            .generate(&mut rng);
        assert_eq!(value, Value::Int(7));
    }

    #[test]
    fn test_default_bounds() {
        let mut registry = GeneratorRegistry::with_builtin_kinds();
        let mut rng = StdRng::seed_from_u64(6);
        let generator = registry
            .resolve(key(kinds::LONG, GeneratorArgs::new(), "a"), &mut rng)
            .unwrap();
        for _ in 0..500 {
            let value = generator.generate(&mut rng).as_int().unwrap();
            assert!(LONG_DEFAULT_BOUNDS.0 <= value && value < LONG_DEFAULT_BOUNDS.1);
        }
    }
}
