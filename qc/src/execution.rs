//! Property test execution: the iteration loop, panic capture and reporting.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use crate::config::{TestConfig, create_test_config};
use crate::context::Context;
use crate::error::{ErrorReporter, PropertyError, PropertyResult, TestFailure, TestSuccess};
use crate::property::Property;
use crate::rng::resolve_seed;

/// Core property test execution struct
pub struct PropertyTest<P> {
    property: P,
    config: TestConfig,
    error_reporter: ErrorReporter,
}

impl<P: Property> PropertyTest<P> {
    /// Create a new property test with the given property and configuration
    pub fn new(property: P, config: TestConfig) -> Self {
        Self::with_error_reporter(property, config, ErrorReporter::new())
    }

    /// Create a new property test with custom error reporter
    pub fn with_error_reporter(
        property: P,
        config: TestConfig,
        error_reporter: ErrorReporter,
    ) -> Self {
        Self {
            property,
            config,
            error_reporter,
        }
    }

    /// Execute the property test
    ///
    /// One context (and so one registry) serves every iteration: each call
    /// site keeps its generator, and the bootstrap values come out over the
    /// first iterations.
    pub fn run(mut self) -> PropertyResult {
        let test_start = Instant::now();
        let seed = resolve_seed(self.config.seed);

        if let Err(error) = self.config.validate() {
            return Err(TestFailure {
                error: PropertyError::ConfigError {
                    message: error.to_string(),
                    field: Some("iterations".to_string()),
                },
                draws: Vec::new(),
                config: self.config,
                seed,
                failed_iteration: 0,
                test_duration: test_start.elapsed(),
            });
        }

        let mut ctx = Context::with_seed(seed);
        tracing::debug!(iterations = self.config.iterations, seed, "running property");

        for iteration in 0..self.config.iterations {
            ctx.begin_iteration();

            let outcome = catch_unwind(AssertUnwindSafe(|| self.property.test(&mut ctx)));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error.at_iteration(iteration),
                Err(payload) => PropertyError::property_failed_with_context(
                    panic_message(payload.as_ref()),
                    Some("panic"),
                    Some(iteration),
                ),
            };

            let failure = TestFailure {
                error,
                draws: ctx.draws().to_vec(),
                config: self.config,
                seed,
                failed_iteration: iteration,
                test_duration: test_start.elapsed(),
            };
            tracing::debug!(iteration, seed, "property failed");

            // Print detailed error report if verbose mode is enabled
            if self.error_reporter.verbose {
                eprintln!("{}", self.error_reporter.format_failure(&failure));
            } else {
                eprintln!("{}", self.error_reporter.format_summary(&failure));
            }

            return Err(failure);
        }

        tracing::debug!(
            iterations = self.config.iterations,
            generators = ctx.generator_count(),
            "property passed"
        );

        Ok(TestSuccess {
            iterations: self.config.iterations,
            seed,
            generators: ctx.generator_count(),
            config: self.config,
            test_duration: test_start.elapsed(),
        })
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "property panicked".to_string()
    }
}

/// Run a property with the current global defaults
pub fn check<P: Property>(property: P) -> PropertyResult {
    check_with_config(property, create_test_config())
}

/// Run a property with a custom configuration
pub fn check_with_config<P: Property>(property: P, config: TestConfig) -> PropertyResult {
    PropertyTest::new(property, config).run()
}

/// Builder pattern for configuring property tests
#[derive(Debug, Clone)]
pub struct PropertyTestBuilder {
    config: TestConfig,
    error_reporter: ErrorReporter,
}

impl PropertyTestBuilder {
    /// Create a new builder starting from the global defaults
    pub fn new() -> Self {
        Self {
            config: create_test_config(),
            error_reporter: ErrorReporter::new(),
        }
    }

    /// Set the number of test iterations
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set the random seed for reproducible tests
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Enable verbose error reporting
    pub fn verbose_errors(mut self) -> Self {
        self.error_reporter = self.error_reporter.verbose();
        self
    }

    /// Enable configuration display in error reports
    pub fn show_config_in_errors(mut self) -> Self {
        self.error_reporter = self.error_reporter.show_config();
        self
    }

    /// Leave timing out of error reports
    pub fn hide_timing_in_errors(mut self) -> Self {
        self.error_reporter = self.error_reporter.without_timing();
        self
    }

    /// Set a custom error reporter
    pub fn error_reporter(mut self, reporter: ErrorReporter) -> Self {
        self.error_reporter = reporter;
        self
    }

    pub fn config(&self) -> &TestConfig {
        &self.config
    }

    /// Run the property with the configured parameters
    pub fn run<P: Property>(self, property: P) -> PropertyResult {
        PropertyTest::with_error_reporter(property, self.config, self.error_reporter).run()
    }
}

impl Default for PropertyTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;

    #[test]
    fn test_passing_property_runs_every_iteration() {
        let mut calls = 0;
        let result = PropertyTestBuilder::new()
            .iterations(25)
            .seed(1)
            .run(|ctx: &mut Context| {
                calls += 1;
                let n = ctx.int(0, 10).unwrap();
                assert!((0..10).contains(&n));
            });
        let success = result.unwrap();
        assert_eq!(success.iterations, 25);
        assert_eq!(success.seed, 1);
        assert_eq!(success.generators, 1);
        assert_eq!(calls, 25);
    }

    #[test]
    fn test_bootstrap_spans_iterations() {
        let mut seen = Vec::new();
        PropertyTestBuilder::new()
            .iterations(3)
            .seed(2)
            .run(|ctx: &mut Context| seen.push(ctx.int(0, 10).unwrap()))
            .unwrap();
        assert_eq!(seen, vec![0, 1, 9]);
    }

    #[test]
    fn test_returned_error_is_reported_with_draws() {
        let failure = PropertyTestBuilder::new()
            .seed(3)
            .run(|ctx: &mut Context| -> Result<(), PropertyError> {
                let n = ctx.int(0, 10)?;
                if n == 9 {
                    return Err(PropertyError::property_failed("nine"));
                }
                Ok(())
            })
            .unwrap_err();

        // Bootstrap order is 0, 1, 9
        assert_eq!(failure.failed_iteration, 2);
        assert_eq!(failure.seed, 3);
        assert_eq!(failure.draws.len(), 1);
        assert_eq!(failure.draws[0].value, crate::value::Value::Int(9));
        assert!(failure.error.to_string().contains("(iteration: 2)"));
    }

    #[test]
    fn test_panic_is_captured() {
        let failure = check_with_config(
            |ctx: &mut Context| {
                let bytes = ctx.random_bytes(None, Some(3)).unwrap();
                assert!(!bytes.is_empty(), "empty input");
            },
            TestConfig::new(10, Some(4)).unwrap(),
        )
        .unwrap_err();

        assert_eq!(failure.failed_iteration, 0);
        match &failure.error {
            PropertyError::PropertyFailed {
                message, context, ..
            } => {
                assert!(message.contains("empty input"));
                assert_eq!(context.as_deref(), Some("panic"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_generation_errors_fail_the_property() {
        let failure = check(|ctx: &mut Context| -> Result<(), GenerationError> {
            ctx.float(1.0, 0.0)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            failure.error,
            PropertyError::GenerationFailed { .. }
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TestConfig {
            iterations: 0,
            seed: None,
        };
        let failure = check_with_config(|_: &mut Context| {}, config).unwrap_err();
        assert!(matches!(failure.error, PropertyError::ConfigError { .. }));
    }

    #[test]
    fn test_unseeded_runs_report_their_seed() {
        let failure = check(|_: &mut Context| false).unwrap_err();
        let replay = PropertyTestBuilder::new()
            .seed(failure.seed)
            .run(|_: &mut Context| false)
            .unwrap_err();
        assert_eq!(replay.seed, failure.seed);
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7);
        assert_eq!(panic_message(payload.as_ref()), "property panicked");
    }
}
