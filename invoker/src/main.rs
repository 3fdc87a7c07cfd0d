#[cfg(test)]
mod fake;
mod invoke;

use anyhow::Result;
use invoke::Invoker;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::config::InvokeConfig;
use shared::dynamodb::DynamoDb;
use shared::lambda::Lambda;
use shared::manifest::{Manifest, ManifestSource};
use shared::response::Response;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    shared::log::init(shared::log::level_from_env());

    lambda_runtime::run(service_fn(func)).await?;
    Ok(())
}

async fn func(_event: LambdaEvent<Value>) -> Result<Response, Error> {
    match invoke_all().await {
        Ok(sent) => {
            info!("Invocations sent: {}", sent);
            Ok(Response::success())
        }
        Err(e) => {
            error!("Invocation run failed: {:#}", e);
            Err(e.into())
        }
    }
}

async fn invoke_all() -> Result<usize> {
    let config = InvokeConfig::from_env()?;
    let aws_config = shared::load_aws_config(&config.region).await;

    let s3 = aws_sdk_s3::Client::new(&aws_config);
    let manifest = Manifest::load(&ManifestSource::from_env(), &s3).await?;

    let lambda = Lambda::new(aws_sdk_lambda::Client::new(&aws_config));
    let dynamodb = DynamoDb::new(aws_sdk_dynamodb::Client::new(&aws_config));

    let sent = Invoker::new(&lambda, &dynamodb, &config)
        .run(&manifest)
        .await?;

    Ok(sent)
}
