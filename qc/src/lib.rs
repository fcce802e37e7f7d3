#![allow(clippy::result_large_err)]

//! # qc - arbitrary values for property tests
//!
//! qc feeds properties with "arbitrary" integers, floats, byte strings and
//! text. Every call site in a property gets its own persistent generator,
//! which first plays back a set of known edge cases (zero, one, the range
//! ends, empty and NUL-laden strings) and then samples randomly with an
//! occasional edge case mixed in.
//!
//! ## Quick Start
//!
//! ```rust
//! use qc::{Context, PropertyTestBuilder};
//!
//! let result = PropertyTestBuilder::new()
//!     .iterations(200)
//!     .seed(7)
//!     .run(|ctx: &mut Context| {
//!         let n = ctx.int(0, 10).unwrap();
//!         let s = ctx.text(None, Some(16)).unwrap();
//!         assert!((0..10).contains(&n));
//!         assert!(s.chars().count() <= 16);
//!     });
//! assert!(result.is_ok());
//! ```
//!
//! With the `derive` feature (on by default) the same property can be
//! written as a test function:
//!
//! ```rust,ignore
//! #[qc::property(iterations = 200)]
//! fn text_is_bounded(ctx: &mut qc::Context) {
//!     assert!(ctx.text(None, Some(16)).unwrap().chars().count() <= 16);
//! }
//! ```

pub mod call_site;
pub mod config;
pub mod context;
pub mod corpus;
pub mod error;
pub mod execution;
pub mod generator;
pub mod primitives;
pub mod property;
pub mod registry;
pub mod rng;
pub mod sampler;
pub mod test_runner;
pub mod text;
pub mod value;

// Re-export the main public API
pub use call_site::CallSite;
pub use config::{
    ConfigError, ConfigManager, GlobalConfig, TestConfig, create_test_config,
    create_test_config_with_overrides, get_global_config, set_global_config,
};
pub use context::{Context, Draw};
pub use error::{
    ErrorReporter, GenerationError, PropertyError, PropertyResult, TestFailure, TestSuccess,
};
pub use execution::{PropertyTest, PropertyTestBuilder, check, check_with_config};
pub use generator::{BoxedGenerator, Generator, GeneratorArgs, GeneratorKey};
pub use primitives::{
    ByteStringGenerator, Cycle, FixedLengthBytes, FloatGenerator, FromList, IntGenerator,
};
pub use property::{Property, PropertyOutcome};
pub use registry::{GeneratorFactory, GeneratorRegistry, kinds};
pub use rng::{create_seeded_rng, fresh_seed, resolve_seed};
pub use sampler::{NormalSampler, TRICKY_PROBABILITY, TrickySet, WithTrickySet};
pub use test_runner::{TestResult, TestRunner};
pub use text::{ByteTextGenerator, TextGenerator, WordSalad};
pub use value::Value;

// Re-export the property attribute when the derive feature is enabled
#[cfg(feature = "derive")]
pub use qc_derive::property;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let test_config = TestConfig::default();
        assert_eq!(test_config.iterations, 100);
        assert!(test_config.seed.is_none());

        let global_config = GlobalConfig::default();
        assert_eq!(global_config.default_iterations, 100);
        assert!(global_config.default_seed.is_none());
    }

    #[test]
    fn test_property_error_display() {
        let error = PropertyError::PropertyFailed {
            message: "test failed".to_string(),
            context: None,
            iteration: None,
        };
        assert_eq!(format!("{}", error), "Property failed: test failed");
    }

    #[test]
    fn test_public_api_integration() {
        let mut ctx = Context::with_seed(5);
        let site = crate::call_site!();
        let args = GeneratorArgs::new().arg(-3).arg(3);
        let first = ctx.draw(kinds::INT, args.clone(), site.clone()).unwrap();
        let second = ctx.draw(kinds::INT, args, site).unwrap();
        assert_eq!((first, second), (Value::Int(0), Value::Int(1)));
    }
}
