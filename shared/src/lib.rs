//! Matrix model, configuration and AWS service seams shared by the deployer
//! and the invoker functions.

pub mod config;
pub mod dynamodb;
pub mod error;
pub mod lambda;
pub mod log;
pub mod logs;
pub mod manifest;
pub mod response;
pub mod s3;

/// SDK configuration pinned to the run's region.
pub async fn load_aws_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}
