//! SnapStart warming: publish a series of versions so the benchmark starts
//! from restored snapshots rather than the first cold init.

use shared::config::{ActivationPolicy, DeployConfig, RetryPolicy};
use shared::error::{Error, Result};
use shared::lambda::{FunctionState, Functions};
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Environment variable touched before each publish so every version differs.
pub const COLD_START_VARIABLE: &str = "coldStart";

pub async fn warm<F>(functions: &F, name: &str, config: &DeployConfig) -> Result<Vec<String>>
where
    F: Functions,
{
    wait_for_active(functions, name, config.activation).await?;

    let mut versions = Vec::with_capacity(config.warm_versions as usize);
    for _ in 0..config.warm_versions {
        let marker = rand::random::<f64>().to_string();
        functions
            .update_environment(name, COLD_START_VARIABLE, &marker)
            .await?;
        sleep(config.warm_delay).await;
        versions.push(publish_version(functions, name, config.publish_retry).await?);
    }

    Ok(versions)
}

pub async fn wait_for_active<F>(functions: &F, name: &str, policy: ActivationPolicy) -> Result<()>
where
    F: Functions,
{
    let deadline = Instant::now() + policy.timeout;
    loop {
        match functions.function_state(name).await? {
            FunctionState::Active => return Ok(()),
            FunctionState::Failed(reason) => {
                return Err(Error::ActivationFailed {
                    function: name.to_string(),
                    reason,
                })
            }
            state if Instant::now() >= deadline => {
                return Err(Error::ActivationFailed {
                    function: name.to_string(),
                    reason: format!("still {:?} after {:?}", state, policy.timeout),
                })
            }
            state => {
                info!("Waiting for function {} to be active ({:?})", name, state);
                sleep(policy.interval).await;
            }
        }
    }
}

pub async fn publish_version<F>(functions: &F, name: &str, policy: RetryPolicy) -> Result<String>
where
    F: Functions,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match functions.publish_version(name).await {
            Ok(version) => {
                info!("Published version {} for function {}", version, name);
                return Ok(version);
            }
            Err(e) if attempts >= policy.max_attempts => {
                return Err(Error::PublishExhausted {
                    function: name.to_string(),
                    attempts,
                    source: Box::new(e),
                });
            }
            Err(e) => {
                warn!(
                    "Publishing {} failed (attempt {}/{}): {}",
                    name, attempts, policy.max_attempts, e
                );
                sleep(policy.backoff).await;
            }
        }
    }
}
