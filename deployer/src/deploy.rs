use crate::warm::warm;
use shared::config::DeployConfig;
use shared::error::{deleted, Result};
use shared::lambda::{FunctionSpec, Functions, Permission};
use shared::logs::{LogGroups, SubscriptionFilter};
use shared::manifest::{code_bucket, log_group_name, Manifest, RuntimeEntry};
use tokio::time::sleep;
use tracing::{error, info, warn};

pub const REPORT_FILTER_PATTERN: &str = "REPORT";

/// Replaces every function of one `(memory size, architecture)` slice of the
/// matrix and wires its logs to the log processor.
pub struct Deployer<'a, F, L> {
    functions: &'a F,
    logs: &'a L,
    config: &'a DeployConfig,
}

impl<'a, F, L> Deployer<'a, F, L>
where
    F: Functions,
    L: LogGroups,
{
    pub fn new(functions: &'a F, logs: &'a L, config: &'a DeployConfig) -> Self {
        Deployer {
            functions,
            logs,
            config,
        }
    }

    /// Returns the names of the deployed functions, in manifest order.
    pub async fn run(
        &self,
        manifest: &Manifest,
        memory_size: u16,
        architecture: &str,
    ) -> Result<Vec<String>> {
        manifest.validate(&self.config.project, memory_size)?;
        self.grant_log_processor().await;

        let mut deployed = Vec::new();
        for entry in &manifest.runtimes {
            if !entry.supports(architecture) {
                info!(
                    "Skipping {} as it's not available for {}",
                    entry.suffix(),
                    architecture
                );
                continue;
            }

            let name = entry.function_name(&self.config.project, memory_size, architecture);
            if let Err(e) = self.deploy_runtime(entry, &name, memory_size, architecture).await {
                error!("Deploying {} failed: {}", name, e);
                return Err(e);
            }
            deployed.push(name);

            sleep(self.config.entry_delay).await;
        }

        Ok(deployed)
    }

    async fn deploy_runtime(
        &self,
        entry: &RuntimeEntry,
        name: &str,
        memory_size: u16,
        architecture: &str,
    ) -> Result<()> {
        self.delete_function(name).await?;
        self.create_function(entry, name, memory_size, architecture)
            .await?;
        if entry.snap_start.is_some() {
            warm(self.functions, name, self.config).await?;
        }
        self.reset_log_group(name).await
    }

    /// Lets CloudWatch Logs deliver subscription events to the log processor.
    /// Failures are only logged; the statement normally survives from an
    /// earlier run.
    async fn grant_log_processor(&self) {
        let permission = Permission {
            function_name: self.config.log_processor_arn.clone(),
            action: "lambda:InvokeFunction".to_string(),
            principal: "logs.amazonaws.com".to_string(),
            statement_id: "addInvokePermission".to_string(),
        };
        match self.functions.add_permission(&permission).await {
            Ok(()) => info!("Permission added to {}", permission.function_name),
            Err(e) => warn!(
                "Could not add permission to {}: {}",
                permission.function_name, e
            ),
        }
    }

    async fn delete_function(&self, name: &str) -> Result<()> {
        if deleted(self.functions.delete_function(name).await)? {
            info!("Function {} deleted", name);
        } else {
            info!("Function {} does not exist, skipping deletion", name);
        }
        Ok(())
    }

    async fn create_function(
        &self,
        entry: &RuntimeEntry,
        name: &str,
        memory_size: u16,
        architecture: &str,
    ) -> Result<()> {
        let spec = FunctionSpec {
            name: name.to_string(),
            handler: entry.handler.clone(),
            runtime: entry.runtime.clone(),
            code_bucket: code_bucket(&self.config.project, &self.config.region),
            code_key: entry.code_key(architecture),
            role_arn: self.config.role_arn.clone(),
            memory_size,
            architecture: architecture.to_string(),
            snap_start: entry.snap_start_apply_on()?,
        };

        info!(
            "Creating function {} for {} ({})",
            name, architecture, memory_size
        );
        self.functions.create_function(&spec).await
    }

    async fn reset_log_group(&self, name: &str) -> Result<()> {
        let log_group = log_group_name(name);
        if deleted(self.logs.delete_log_group(&log_group).await)? {
            info!("Log group {} deleted", log_group);
        } else {
            info!("Log group {} does not exist, skipping deletion", log_group);
        }

        self.logs.create_log_group(&log_group).await?;
        info!("Log group {} created", log_group);

        let filter = SubscriptionFilter {
            log_group_name: log_group,
            filter_name: format!("report-log-from-{}", name),
            filter_pattern: REPORT_FILTER_PATTERN.to_string(),
            destination_arn: self.config.log_processor_arn.clone(),
        };
        self.logs.put_subscription_filter(&filter).await?;
        info!("Subscription {} created", filter.filter_name);

        Ok(())
    }
}
