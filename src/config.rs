use std::env;
use std::str::FromStr;
use std::time::Duration;

use eyre::{bail, Error, Result};

/// Detector configuration.
///
/// Read from `ORBIT_*` environment variables (a `.env` file is honored), or
/// built in code starting from [`Config::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Longest cycle to consider, in currencies. `None` searches every length.
    pub max_cycle_length: Option<usize>,
    /// Only yields strictly above this are reported
    pub min_profit_threshold: f64,
    /// Wall-clock budget for the cycle search
    pub search_budget: Option<Duration>,
    /// Cap on the number of cycles scored
    pub max_cycles: Option<u64>,
    /// Search independent components on the rayon thread pool
    pub parallel: bool,
    /// Also report cycles that trade every hop through a synthesized inverse
    pub inverse_only_cycles: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cycle_length: None,
            min_profit_threshold: 1.0,
            search_budget: None,
            max_cycles: None,
            parallel: false,
            inverse_only_cycles: false,
        }
    }
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// # Environment Variables
    /// * `ORBIT_MAX_CYCLE_LENGTH` - longest cycle, in currencies (unset: unbounded)
    /// * `ORBIT_MIN_PROFIT_THRESHOLD` - minimum yield to report (default 1.0)
    /// * `ORBIT_SEARCH_BUDGET_MS` - search time budget in milliseconds
    /// * `ORBIT_MAX_CYCLES` - cap on cycles scored
    /// * `ORBIT_PARALLEL` - `true` to search components in parallel
    /// * `ORBIT_INVERSE_ONLY_CYCLES` - `true` to allow cycles made only of inverse quotes
    ///
    /// # Errors
    /// * If a variable is set but cannot be parsed
    /// * If the resulting configuration is invalid
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            max_cycle_length: var("ORBIT_MAX_CYCLE_LENGTH")?,
            min_profit_threshold: var("ORBIT_MIN_PROFIT_THRESHOLD")?
                .unwrap_or(defaults.min_profit_threshold),
            search_budget: var("ORBIT_SEARCH_BUDGET_MS")?.map(Duration::from_millis),
            max_cycles: var("ORBIT_MAX_CYCLES")?,
            parallel: var("ORBIT_PARALLEL")?.unwrap_or(defaults.parallel),
            inverse_only_cycles: var("ORBIT_INVERSE_ONLY_CYCLES")?
                .unwrap_or(defaults.inverse_only_cycles),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration.
    ///
    /// A `max_cycle_length` below 3 is allowed; it simply finds nothing.
    ///
    /// # Errors
    /// * If `min_profit_threshold` is not a finite number >= 1.0
    /// * If `max_cycle_length` is zero
    pub fn validate(&self) -> Result<()> {
        if !self.min_profit_threshold.is_finite() || self.min_profit_threshold < 1.0 {
            bail!(
                "Minimum profit threshold must be at least 1.0, got {}",
                self.min_profit_threshold
            );
        }
        if self.max_cycle_length == Some(0) {
            bail!("Maximum cycle length must be positive");
        }
        Ok(())
    }
}

/// Reads and parses an optional environment variable
fn var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::msg(format!("{name} has an invalid value: {value}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::msg(format!("{name} could not be read: {e}"))),
    }
}
