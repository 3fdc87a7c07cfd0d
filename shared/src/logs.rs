use crate::error::{Error, Result};
use async_trait::async_trait;

/// Subscription filter routing a log group to a destination function.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionFilter {
    pub log_group_name: String,
    pub filter_name: String,
    pub filter_pattern: String,
    pub destination_arn: String,
}

#[async_trait]
pub trait LogGroups {
    /// Returns [`Error::NotFound`] when the log group does not exist.
    async fn delete_log_group(&self, name: &str) -> Result<()>;
    async fn create_log_group(&self, name: &str) -> Result<()>;
    async fn put_subscription_filter(&self, filter: &SubscriptionFilter) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct CloudWatchLogs {
    inner: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogs {
    pub fn new(inner: aws_sdk_cloudwatchlogs::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LogGroups for CloudWatchLogs {
    async fn delete_log_group(&self, name: &str) -> Result<()> {
        match self.inner.delete_log_group().log_group_name(name).send().await {
            Ok(_) => Ok(()),
            Err(e) => match e.into_service_error() {
                e if e.is_resource_not_found_exception() => Err(Error::not_found("log group", name)),
                e => Err(Error::remote("DeleteLogGroup", e)),
            },
        }
    }

    async fn create_log_group(&self, name: &str) -> Result<()> {
        self.inner
            .create_log_group()
            .log_group_name(name)
            .send()
            .await
            .map_err(|e| Error::remote("CreateLogGroup", e.into_service_error()))?;

        Ok(())
    }

    async fn put_subscription_filter(&self, filter: &SubscriptionFilter) -> Result<()> {
        self.inner
            .put_subscription_filter()
            .log_group_name(&filter.log_group_name)
            .filter_name(&filter.filter_name)
            .filter_pattern(&filter.filter_pattern)
            .destination_arn(&filter.destination_arn)
            .send()
            .await
            .map_err(|e| Error::remote("PutSubscriptionFilter", e.into_service_error()))?;

        Ok(())
    }
}
