//! Error types and result handling for generation and property execution.

use std::fmt;
use std::time::Duration;

use crate::config::TestConfig;
use crate::context::Draw;

/// Errors raised while resolving or constructing a generator
///
/// All of these are structural: a kind that was never registered, or a
/// configuration that cannot produce a single valid value. None of them are
/// transient, so nothing retries them.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// No factory is registered under this kind name
    UnknownKind { name: String },

    /// Bounds that contradict each other or cannot be sampled
    InvalidBounds {
        kind: String,
        low: String,
        high: String,
    },

    /// A list-based picker was given nothing to pick from
    EmptyList { kind: String },

    /// An argument has the wrong shape for the kind's factory
    InvalidArgument {
        kind: String,
        argument: String,
        message: String,
    },

    /// A typed entry point received a value of an unexpected shape
    ValueMismatch {
        kind: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::UnknownKind { name } => {
                write!(f, "Unknown generator kind {:?}", name)
            }
            GenerationError::InvalidBounds { kind, low, high } => {
                write!(
                    f,
                    "Invalid bounds for {} generator: low={}, high={}",
                    kind, low, high
                )
            }
            GenerationError::EmptyList { kind } => {
                write!(f, "List given to {} generator must not be empty", kind)
            }
            GenerationError::InvalidArgument {
                kind,
                argument,
                message,
            } => {
                write!(
                    f,
                    "Invalid argument {:?} for {} generator: {}",
                    argument, kind, message
                )
            }
            GenerationError::ValueMismatch {
                kind,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Generator kind {:?} produced a {} value where a {} was expected",
                    kind, found, expected
                )
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl GenerationError {
    /// Create an invalid bounds error from any displayable bounds
    pub fn invalid_bounds(
        kind: impl Into<String>,
        low: impl fmt::Debug,
        high: impl fmt::Debug,
    ) -> Self {
        Self::InvalidBounds {
            kind: kind.into(),
            low: format!("{:?}", low),
            high: format!("{:?}", high),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(
        kind: impl Into<String>,
        argument: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            kind: kind.into(),
            argument: argument.into(),
            message: message.into(),
        }
    }
}

/// Error type for property execution failures
#[derive(Debug, Clone)]
pub enum PropertyError {
    /// Property failed with a specific message and optional context
    PropertyFailed {
        message: String,
        context: Option<String>,
        iteration: Option<usize>,
    },

    /// Drawing an arbitrary value failed
    GenerationFailed {
        message: String,
        context: Option<String>,
    },

    /// Configuration error
    ConfigError {
        message: String,
        field: Option<String>,
    },
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyError::PropertyFailed {
                message,
                context,
                iteration,
            } => {
                write!(f, "Property failed: {}", message)?;
                if let Some(ctx) = context {
                    write!(f, " (context: {})", ctx)?;
                }
                if let Some(iter) = iteration {
                    write!(f, " (iteration: {})", iter)?;
                }
                Ok(())
            }
            PropertyError::GenerationFailed { message, context } => {
                write!(f, "Generation failed: {}", message)?;
                if let Some(ctx) = context {
                    write!(f, " (context: {})", ctx)?;
                }
                Ok(())
            }
            PropertyError::ConfigError { message, field } => {
                write!(f, "Configuration error: {}", message)?;
                if let Some(field_name) = field {
                    write!(f, " (field: {})", field_name)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for PropertyError {}

impl From<GenerationError> for PropertyError {
    fn from(error: GenerationError) -> Self {
        let context = match &error {
            GenerationError::UnknownKind { .. } => Some("resolve".to_string()),
            _ => Some("construct".to_string()),
        };
        Self::GenerationFailed {
            message: error.to_string(),
            context,
        }
    }
}

impl From<crate::config::ConfigError> for PropertyError {
    fn from(error: crate::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
            field: None,
        }
    }
}

impl From<String> for PropertyError {
    fn from(message: String) -> Self {
        Self::property_failed(message)
    }
}

impl From<&str> for PropertyError {
    fn from(message: &str) -> Self {
        Self::property_failed(message)
    }
}

/// Result of a property test execution
pub type PropertyResult = Result<TestSuccess, TestFailure>;

/// Helper functions for creating PropertyError instances with context
impl PropertyError {
    /// Create a simple property failed error
    pub fn property_failed(message: impl Into<String>) -> Self {
        Self::PropertyFailed {
            message: message.into(),
            context: None,
            iteration: None,
        }
    }

    /// Create a property failed error with context
    pub fn property_failed_with_context(
        message: impl Into<String>,
        context: Option<impl Into<String>>,
        iteration: Option<usize>,
    ) -> Self {
        Self::PropertyFailed {
            message: message.into(),
            context: context.map(|c| c.into()),
            iteration,
        }
    }

    /// Attach the iteration number unless the error already carries one
    pub(crate) fn at_iteration(self, iteration: usize) -> Self {
        match self {
            PropertyError::PropertyFailed {
                message,
                context,
                iteration: None,
            } => PropertyError::PropertyFailed {
                message,
                context,
                iteration: Some(iteration),
            },
            other => other,
        }
    }
}

/// Information about a successful test run
#[derive(Debug)]
pub struct TestSuccess {
    /// Number of iterations completed
    pub iterations: usize,
    /// Test configuration used
    pub config: TestConfig,
    /// Seed the run was drawn from
    pub seed: u64,
    /// Number of distinct call-site generators the property created
    pub generators: usize,
    /// Total time spent on the test
    pub test_duration: Duration,
}

/// Information about a failed test run
#[derive(Debug)]
pub struct TestFailure {
    /// The error that caused the failure
    pub error: PropertyError,
    /// Values drawn during the failing iteration, in draw order
    pub draws: Vec<Draw>,
    /// Test configuration used
    pub config: TestConfig,
    /// Seed that reproduces the whole run
    pub seed: u64,
    /// Iteration number where the failure occurred
    pub failed_iteration: usize,
    /// Total time spent on the test
    pub test_duration: Duration,
}

impl TestFailure {
    /// Get a detailed report of the test failure
    pub fn detailed_report(&self) -> String {
        let mut report = String::new();

        report.push_str(&format!(
            "Property test failed on iteration {}\n",
            self.failed_iteration
        ));
        report.push_str(&format!("Error: {}\n", self.error));
        if self.draws.is_empty() {
            report.push_str("No values were drawn\n");
        } else {
            report.push_str("Drawn values:\n");
            for draw in &self.draws {
                report.push_str(&format!("  {}\n", draw));
            }
        }
        report.push_str(&format!("Total test time: {:?}\n", self.test_duration));
        report.push_str(&format!(
            "Test configuration: iterations={}, seed={}\n",
            self.config.iterations, self.seed
        ));

        report
    }

    /// Get a concise summary of the test failure
    pub fn summary(&self) -> String {
        let values: Vec<String> = self.draws.iter().map(|d| d.value.to_string()).collect();
        format!(
            "Property failed with values [{}] on iteration {} (seed {})",
            values.join(", "),
            self.failed_iteration,
            self.seed
        )
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Renders failures for humans
///
/// The summary form is what a failing run prints by default. The full form
/// adds the per-draw table, the configuration and the ways to replay the run.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    pub verbose: bool,
    pub show_timing: bool,
    pub show_config: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            verbose: false,
            show_timing: true,
            show_config: false,
        }
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Leave the timing line out, for output compared across runs
    pub fn without_timing(mut self) -> Self {
        self.show_timing = false;
        self
    }

    pub fn show_config(mut self) -> Self {
        self.show_config = true;
        self
    }

    /// The full report
    pub fn format_failure(&self, failure: &TestFailure) -> String {
        let rule = "-".repeat(64);
        let mut report = format!(
            "{rule}\nqc: property failed on iteration {}\n{rule}\n",
            failure.failed_iteration
        );
        report.push_str(&format!("{}\n\n", failure.error));

        report.push_str("Drawn values:\n");
        report.push_str(&self.format_draws(&failure.draws));
        report.push('\n');

        if self.show_timing {
            let runs = u32::try_from(failure.failed_iteration)
                .unwrap_or(u32::MAX)
                .saturating_add(1);
            report.push_str(&format!(
                "Time: {:?} over {} iterations ({:?} each)\n\n",
                failure.test_duration,
                runs,
                failure.test_duration / runs
            ));
        }

        if self.show_config {
            report.push_str(&format!(
                "Configuration: iterations={}, seed={}\n\n",
                failure.config.iterations,
                failure
                    .config
                    .seed
                    .map_or_else(|| format!("{} (fresh)", failure.seed), |s| s.to_string())
            ));
        }

        if self.verbose {
            report.push_str(&self.format_error_context(&failure.error));
            report.push('\n');
        }

        report.push_str("To reproduce:\n");
        report.push_str(&self.generate_suggestions(failure));
        report.push_str(&rule);
        report.push('\n');

        report
    }

    /// One aligned line per draw: kind, value, call site
    fn format_draws(&self, draws: &[Draw]) -> String {
        if draws.is_empty() {
            return "  (none)\n".to_string();
        }
        let width = draws.iter().map(|d| d.kind.len()).max().unwrap_or(0);
        draws
            .iter()
            .map(|draw| {
                format!(
                    "  {:<width$}  {}  (at {})\n",
                    draw.kind, draw.value, draw.call_site
                )
            })
            .collect()
    }

    /// Structured fields of `error`, one per line
    pub fn format_error_context(&self, error: &PropertyError) -> String {
        let mut fields: Vec<(&str, String)> = Vec::new();
        match error {
            PropertyError::PropertyFailed {
                message,
                context,
                iteration,
            } => {
                fields.push(("kind", "assertion".to_string()));
                fields.push(("message", message.clone()));
                if let Some(context) = context {
                    fields.push(("context", context.clone()));
                }
                if let Some(iteration) = iteration {
                    fields.push(("iteration", iteration.to_string()));
                }
            }
            PropertyError::GenerationFailed { message, context } => {
                fields.push(("kind", "generation".to_string()));
                fields.push(("message", message.clone()));
                if let Some(context) = context {
                    fields.push(("phase", context.clone()));
                }
            }
            PropertyError::ConfigError { message, field } => {
                fields.push(("kind", "configuration".to_string()));
                fields.push(("message", message.clone()));
                if let Some(field) = field {
                    fields.push(("field", field.clone()));
                }
            }
        }
        fields
            .into_iter()
            .map(|(name, value)| format!("  {:<10} {}\n", format!("{}:", name), value))
            .collect()
    }

    /// The ways to replay `failure`'s run
    pub fn generate_suggestions(&self, failure: &TestFailure) -> String {
        let seed = failure.seed;
        let mut suggestions = format!("  PropertyTestBuilder::new().seed({seed})\n");
        suggestions.push_str(&format!("  #[qc::property(seed = {seed})]\n"));
        suggestions.push_str(&format!("  QC_SEED={seed} cargo test\n"));
        if let PropertyError::GenerationFailed { .. } = failure.error {
            suggestions
                .push_str("  (the failing draw is rejected on every seed; check its arguments)\n");
        }
        suggestions
    }

    /// A short form of the report
    pub fn format_summary(&self, failure: &TestFailure) -> String {
        format!("qc: {}\nqc: {}\n", failure.summary(), failure.error)
    }

    /// Full or short report depending on `verbose`
    pub fn format_for_test_output(&self, failure: &TestFailure) -> String {
        if self.verbose {
            self.format_failure(failure)
        } else {
            self.format_summary(failure)
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call_site::CallSite;
    use crate::value::Value;

    fn sample_failure() -> TestFailure {
        TestFailure {
            error: PropertyError::property_failed("x was negative"),
            draws: vec![Draw {
                call_site: CallSite::label("x"),
                kind: "int".to_string(),
                value: Value::Int(-1),
            }],
            config: TestConfig::default(),
            seed: 42,
            failed_iteration: 3,
            test_duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_generation_error_display() {
        let error = GenerationError::UnknownKind {
            name: "quaternion".to_string(),
        };
        assert_eq!(error.to_string(), "Unknown generator kind \"quaternion\"");

        let error = GenerationError::invalid_bounds("int", 10, 10);
        assert_eq!(
            error.to_string(),
            "Invalid bounds for int generator: low=10, high=10"
        );

        let error = GenerationError::EmptyList {
            kind: "from_list".to_string(),
        };
        assert!(error.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_generation_error_into_property_error() {
        let error: PropertyError = GenerationError::UnknownKind {
            name: "nope".to_string(),
        }
        .into();
        match error {
            PropertyError::GenerationFailed { message, context } => {
                assert!(message.contains("nope"));
                assert_eq!(context.as_deref(), Some("resolve"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_at_iteration_keeps_existing_iteration() {
        let error = PropertyError::property_failed("boom").at_iteration(4);
        assert!(error.to_string().ends_with("(iteration: 4)"));

        let error = PropertyError::property_failed_with_context("boom", None::<String>, Some(1))
            .at_iteration(9);
        assert!(error.to_string().ends_with("(iteration: 1)"));
    }

    #[test]
    fn test_failure_summary_lists_drawn_values() {
        let failure = sample_failure();
        assert_eq!(
            failure.summary(),
            "Property failed with values [-1] on iteration 3 (seed 42)"
        );
        let report = failure.detailed_report();
        assert!(report.contains("int = -1 (at #x)"));
        assert!(report.contains("seed=42"));
    }

    #[test]
    fn test_reporter_output_modes() {
        let failure = sample_failure();
        let summary = ErrorReporter::new().format_for_test_output(&failure);
        assert!(summary.starts_with("qc: Property failed with values [-1]"));

        let reporter = ErrorReporter::new().verbose().show_config();
        let full = reporter.format_for_test_output(&failure);
        assert!(full.contains("property failed on iteration 3"));
        assert!(full.contains("int  -1  (at #x)"));
        assert!(full.contains("Configuration: iterations=100, seed=42 (fresh)"));
        assert!(full.contains("kind:      assertion"));
        assert!(full.contains(".seed(42)"));
        assert!(full.contains("QC_SEED=42"));
    }

    #[test]
    fn test_reporter_without_draws() {
        let mut failure = sample_failure();
        failure.draws.clear();
        failure.error = GenerationError::invalid_bounds("int", 3, 3).into();
        let full = ErrorReporter::new().verbose().format_failure(&failure);
        assert!(full.contains("(none)"));
        assert!(full.contains("phase:     construct"));
        assert!(full.contains("check its arguments"));
    }

    #[test]
    fn test_reporter_timing_line() {
        let failure = sample_failure();
        let full = ErrorReporter::new().format_failure(&failure);
        assert!(full.contains("over 4 iterations"));

        let untimed = ErrorReporter::new().without_timing().format_failure(&failure);
        assert!(!untimed.contains("Time:"));
        assert!(untimed.contains("To reproduce:"));
    }

    #[test]
    fn test_reporter_timing_with_huge_iteration_number() {
        let mut failure = sample_failure();
        failure.failed_iteration = usize::MAX;
        let full = ErrorReporter::new().format_failure(&failure);
        assert!(full.contains(&format!("over {} iterations", u32::MAX)));
    }
}
