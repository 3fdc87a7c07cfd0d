//! Run configuration, read once from the environment in `main` and passed
//! into the workflows.

use crate::error::{Error, Result};
use std::time::Duration;

pub const DEFAULT_PROJECT: &str = "lambda-perf";
pub const DEFAULT_RESULTS_TABLE: &str = "report-log";

/// How long to wait for a freshly created function to become `Active`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivationPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        ActivationPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }
}

/// Fixed-backoff retry budget. `max_attempts` counts the first try.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            backoff: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeployConfig {
    pub region: String,
    pub role_arn: String,
    pub log_processor_arn: String,
    pub project: String,
    /// Pause after each runtime to stay under the control-plane rate limits.
    pub entry_delay: Duration,
    /// Pause between a configuration update and the version published from it.
    pub warm_delay: Duration,
    pub warm_versions: u32,
    pub activation: ActivationPolicy,
    pub publish_retry: RetryPolicy,
}

impl DeployConfig {
    pub fn new(region: String, role_arn: String, log_processor_arn: String) -> Self {
        DeployConfig {
            region,
            role_arn,
            log_processor_arn,
            project: DEFAULT_PROJECT.to_string(),
            entry_delay: Duration::from_secs(5),
            warm_delay: Duration::from_secs(10),
            warm_versions: 10,
            activation: ActivationPolicy::default(),
            publish_retry: RetryPolicy::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = DeployConfig::new(
            required(&lookup, "AWS_REGION")?,
            required(&lookup, "ROLE_ARN")?,
            required(&lookup, "LOG_PROCESSOR_ARN")?,
        );
        if let Some(project) = lookup("PROJECT") {
            config.project = project;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "ACTIVATION_TIMEOUT_SECS")? {
            config.activation.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeConfig {
    pub region: String,
    /// Function that dispatches each context to its deployed benchmark target.
    pub invoker: String,
    pub table: String,
    /// Wait after dropping and after creating the table.
    pub settle_delay: Duration,
    pub max_in_flight: usize,
}

impl InvokeConfig {
    pub fn new(region: String, invoker: String) -> Self {
        InvokeConfig {
            region,
            invoker,
            table: DEFAULT_RESULTS_TABLE.to_string(),
            settle_delay: Duration::from_secs(5),
            max_in_flight: 25,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = InvokeConfig::new(
            required(&lookup, "AWS_REGION")?,
            required(&lookup, "INVOKER")?,
        );
        if let Some(table) = lookup("RESULTS_TABLE") {
            config.table = table;
        }

        Ok(config)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::MissingEnv(name)),
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::InvalidEnv { name, value }),
    }
}
