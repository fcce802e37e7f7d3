//! Formatting of property results for the standard test harness.

use std::fmt;
use std::time::Duration;

use crate::error::{PropertyResult, TestFailure, TestSuccess};

/// Test runner integration utilities
pub struct TestRunner;

impl TestRunner {
    /// Format a property test result for standard test output
    pub fn format_result(result: &PropertyResult) -> String {
        match result {
            Ok(success) => Self::format_success(success),
            Err(failure) => Self::format_failure(failure),
        }
    }

    /// Format a successful test result
    pub fn format_success(success: &TestSuccess) -> String {
        format!(
            "Property test PASSED after {} iterations (seed: {}, {} generators, {:?})",
            success.iterations, success.seed, success.generators, success.test_duration
        )
    }

    /// Format a failed test result
    pub fn format_failure(failure: &TestFailure) -> String {
        let mut output = String::new();

        output.push_str(&format!("Property test FAILED: {}", failure.error));
        output.push_str(&format!("\nFailing iteration: {}", failure.failed_iteration));
        if failure.draws.is_empty() {
            output.push_str("\nNo values were drawn");
        } else {
            output.push_str("\nDrawn values:");
            for draw in &failure.draws {
                output.push_str(&format!("\n  {}", draw));
            }
        }
        output.push_str(&format!(
            "\nSeed: {} (use this to reproduce the failure)",
            failure.seed
        ));
        output.push_str(&format!("\nTest duration: {:?}", failure.test_duration));

        output
    }

    /// Create a panic message for property test failures
    pub fn create_panic_message(failure: &TestFailure) -> String {
        format!("Property test failed: {}", Self::format_failure(failure))
    }
}

/// Owned, printable summary of a property result
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Passed {
        iterations: usize,
        duration: Duration,
        seed: u64,
    },
    Failed {
        error: String,
        draws: Vec<String>,
        iteration: usize,
        seed: u64,
        duration: Duration,
    },
}

impl TestResult {
    /// Create a TestResult from a PropertyResult
    pub fn from_property_result(result: PropertyResult) -> Self {
        match result {
            Ok(success) => TestResult::Passed {
                iterations: success.iterations,
                duration: success.test_duration,
                seed: success.seed,
            },
            Err(failure) => TestResult::Failed {
                error: failure.error.to_string(),
                draws: failure.draws.iter().map(ToString::to_string).collect(),
                iteration: failure.failed_iteration,
                seed: failure.seed,
                duration: failure.test_duration,
            },
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, TestResult::Passed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestResult::Failed { .. })
    }

    pub fn duration(&self) -> Duration {
        match self {
            TestResult::Passed { duration, .. } | TestResult::Failed { duration, .. } => *duration,
        }
    }

    /// The seed that reproduces this run
    pub fn seed(&self) -> u64 {
        match self {
            TestResult::Passed { seed, .. } | TestResult::Failed { seed, .. } => *seed,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Passed {
                iterations,
                duration,
                seed,
            } => write!(
                f,
                "PASSED ({} iterations in {:?}, seed: {})",
                iterations, duration, seed
            ),
            TestResult::Failed {
                error,
                draws,
                iteration,
                seed,
                duration,
            } => {
                write!(f, "FAILED: {}", error)?;
                write!(f, "\n  Iteration: {}", iteration)?;
                for draw in draws {
                    write!(f, "\n  Drew {}", draw)?;
                }
                write!(f, "\n  Seed: {}", seed)?;
                write!(f, "\n  Duration: {:?}", duration)
            }
        }
    }
}
