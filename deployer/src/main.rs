mod deploy;
#[cfg(test)]
mod fake;
mod warm;

use anyhow::Result;
use deploy::Deployer;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::Deserialize;
use shared::config::DeployConfig;
use shared::lambda::Lambda;
use shared::logs::CloudWatchLogs;
use shared::manifest::{Manifest, ManifestSource};
use shared::response::Response;
use tracing::{error, info};

/// Scheduler payload selecting the slice of the matrix to redeploy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployRequest {
    memory_size: u16,
    architecture: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    shared::log::init(shared::log::level_from_env());

    lambda_runtime::run(service_fn(func)).await?;
    Ok(())
}

async fn func(event: LambdaEvent<DeployRequest>) -> Result<Response, Error> {
    let request = event.payload;
    info!(
        "Deploying memory size {} on {}",
        request.memory_size, request.architecture
    );

    match deploy(&request).await {
        Ok(deployed) => {
            info!("Deployed {} functions", deployed.len());
            Ok(Response::success())
        }
        Err(e) => {
            error!("Deployment failed: {:#}", e);
            Err(e.into())
        }
    }
}

async fn deploy(request: &DeployRequest) -> Result<Vec<String>> {
    let config = DeployConfig::from_env()?;
    let aws_config = shared::load_aws_config(&config.region).await;

    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let manifest = Manifest::load(&ManifestSource::from_env(), &s3).await?;

    let lambda = Lambda::new(aws_sdk_lambda::Client::new(&aws_config));
    let logs = CloudWatchLogs::new(aws_sdk_cloudwatchlogs::Client::new(&aws_config));

    let deployed = Deployer::new(&lambda, &logs, &config)
        .run(&manifest, request.memory_size, &request.architecture)
        .await?;

    Ok(deployed)
}
