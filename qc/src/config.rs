//! Run configuration: iteration counts and seeds, with per-thread defaults.
//!
//! Defaults start from [`DEFAULT_ITERATIONS`] and no seed, and can be changed
//! without touching code through the `QC_ITERATIONS` and `QC_SEED`
//! environment variables. Explicit values (builder calls, `#[property]`
//! options) always take precedence over both.

use std::cell::RefCell;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Number of times a property body runs unless told otherwise
pub const DEFAULT_ITERATIONS: usize = 100;

/// Environment variable overriding the default iteration count
pub const ITERATIONS_ENV: &str = "QC_ITERATIONS";

/// Environment variable fixing the default seed
pub const SEED_ENV: &str = "QC_SEED";

/// A configuration value that cannot drive a run
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A run needs at least one iteration
    InvalidIterations(usize),
    /// An environment variable did not parse
    InvalidEnvVar { name: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidIterations(n) => {
                write!(f, "Invalid iterations count: {} (must be > 0)", n)
            }
            ConfigError::InvalidEnvVar { name, value } => {
                write!(f, "Invalid value {:?} for {}", value, name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for one property run
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    /// How many times the property body runs
    pub iterations: usize,
    /// Seed for the run's RNG; `None` draws one from entropy
    pub seed: Option<u64>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            seed: None,
        }
    }
}

impl TestConfig {
    pub fn new(iterations: usize, seed: Option<u64>) -> Result<Self, ConfigError> {
        let config = Self { iterations, seed };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_iterations(self.iterations)
    }

    /// Fill a missing seed from `global`; the iteration count is kept as is
    pub fn merge_with_global(self, global: &GlobalConfig) -> Self {
        Self {
            seed: self.seed.or(global.default_seed),
            ..self
        }
    }

    /// `global`'s defaults with any explicitly given values on top
    pub fn from_global_with_overrides(
        global: &GlobalConfig,
        iterations: Option<usize>,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Self::new(
            iterations.unwrap_or(global.default_iterations),
            seed.or(global.default_seed),
        )
    }
}

fn check_iterations(iterations: usize) -> Result<(), ConfigError> {
    if iterations == 0 {
        Err(ConfigError::InvalidIterations(iterations))
    } else {
        Ok(())
    }
}

/// Defaults every run on the current thread starts from
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConfig {
    pub default_iterations: usize,
    pub default_seed: Option<u64>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_iterations: DEFAULT_ITERATIONS,
            default_seed: None,
        }
    }
}

impl GlobalConfig {
    pub fn new(default_iterations: usize, default_seed: Option<u64>) -> Result<Self, ConfigError> {
        let config = Self {
            default_iterations,
            default_seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_iterations(self.default_iterations)
    }

    /// Built-in defaults adjusted by `QC_ITERATIONS` and `QC_SEED`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Like [`GlobalConfig::from_env`], reading variables through `lookup`
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(iterations) = parse_var(&lookup, ITERATIONS_ENV)? {
            config.default_iterations = iterations;
        }
        if let Some(seed) = parse_var(&lookup, SEED_ENV)? {
            config.default_seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value,
            }),
    }
}

/// Holds the global defaults and derives per-run configurations from them
#[derive(Debug, Default)]
pub struct ConfigManager {
    global_config: GlobalConfig,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_config(global_config: GlobalConfig) -> Result<Self, ConfigError> {
        global_config.validate()?;
        Ok(Self { global_config })
    }

    /// A manager seeded from the environment
    ///
    /// Unparseable variables are logged and ignored.
    pub fn from_env() -> Self {
        match GlobalConfig::from_env() {
            Ok(global_config) => Self { global_config },
            Err(error) => {
                tracing::warn!(%error, "ignoring qc environment configuration");
                Self::new()
            }
        }
    }

    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    pub fn set_global_config(&mut self, global_config: GlobalConfig) -> Result<(), ConfigError> {
        global_config.validate()?;
        self.global_config = global_config;
        Ok(())
    }

    pub fn create_test_config(&self) -> TestConfig {
        TestConfig::from_global_with_overrides(&self.global_config, None, None)
            .unwrap_or_default()
    }

    pub fn create_test_config_with_overrides(
        &self,
        iterations: Option<usize>,
        seed: Option<u64>,
    ) -> Result<TestConfig, ConfigError> {
        TestConfig::from_global_with_overrides(&self.global_config, iterations, seed)
    }
}

// Per thread, so parallel tests changing their defaults stay independent
thread_local! {
    static CONFIG_MANAGER: RefCell<ConfigManager> = RefCell::new(ConfigManager::from_env());
}

/// This thread's global defaults
pub fn get_global_config() -> GlobalConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().global_config().clone())
}

/// Replace this thread's global defaults
pub fn set_global_config(config: GlobalConfig) -> Result<(), ConfigError> {
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().set_global_config(config))
}

/// A run configuration using this thread's defaults
pub fn create_test_config() -> TestConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().create_test_config())
}

/// A run configuration using this thread's defaults under explicit overrides
pub fn create_test_config_with_overrides(
    iterations: Option<usize>,
    seed: Option<u64>,
) -> Result<TestConfig, ConfigError> {
    CONFIG_MANAGER.with(|manager| {
        manager
            .borrow()
            .create_test_config_with_overrides(iterations, seed)
    })
}
