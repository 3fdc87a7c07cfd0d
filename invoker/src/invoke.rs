use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::try_join_all;
use serde::Serialize;
use shared::config::InvokeConfig;
use shared::dynamodb::Tables;
use shared::error::{deleted, Result};
use shared::lambda::Invoke;
use shared::manifest::{Manifest, RuntimeEntry};
use tokio::time::sleep;
use tracing::info;

pub const RESULTS_HASH_KEY: &str = "requestId";

/// Client context handed to the dispatcher: the runtime entry as listed in
/// the manifest plus the cell of the matrix to exercise.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext<'a> {
    #[serde(flatten)]
    pub runtime: &'a RuntimeEntry,
    pub architecture: &'a str,
    pub memory_size: u16,
}

impl InvocationContext<'_> {
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }
}

/// Every `(runtime, architecture, memory size)` cell in manifest order. Each
/// runtime contributes only its own architectures; memory sizes apply to all.
pub fn matrix(manifest: &Manifest) -> Vec<InvocationContext<'_>> {
    manifest
        .runtimes
        .iter()
        .flat_map(move |runtime| {
            runtime.architectures.iter().flat_map(move |architecture| {
                manifest
                    .memory_sizes
                    .iter()
                    .map(move |&memory_size| InvocationContext {
                        runtime,
                        architecture: architecture.as_str(),
                        memory_size,
                    })
            })
        })
        .collect()
}

pub struct Invoker<'a, I, T> {
    lambda: &'a I,
    tables: &'a T,
    config: &'a InvokeConfig,
}

impl<'a, I, T> Invoker<'a, I, T>
where
    I: Invoke,
    T: Tables,
{
    pub fn new(lambda: &'a I, tables: &'a T, config: &'a InvokeConfig) -> Self {
        Invoker {
            lambda,
            tables,
            config,
        }
    }

    /// Returns the number of invocations sent.
    pub async fn run(&self, manifest: &Manifest) -> Result<usize> {
        self.reset_table().await?;

        let contexts = matrix(manifest);
        let batch_size = self.config.max_in_flight.max(1);
        for batch in contexts.chunks(batch_size) {
            if batch.len() == batch_size {
                info!("Batch is full, waiting for {} invocations", batch.len());
            }
            try_join_all(batch.iter().map(|context| self.invoke(context))).await?;
        }

        Ok(contexts.len())
    }

    /// Drops every result from the previous run. The pauses cover DynamoDB's
    /// eventual consistency between the delete and the create.
    async fn reset_table(&self) -> Result<()> {
        let table = &self.config.table;
        if deleted(self.tables.delete_table(table).await)? {
            info!("Table {} deleted", table);
        } else {
            info!("Table {} does not exist, skipping deletion", table);
        }
        sleep(self.config.settle_delay).await;

        self.tables.create_table(table, RESULTS_HASH_KEY).await?;
        info!("Table {} created", table);
        sleep(self.config.settle_delay).await;

        Ok(())
    }

    async fn invoke(&self, context: &InvocationContext<'_>) -> Result<()> {
        let client_context = context.encode()?;
        self.lambda
            .invoke_with_context(&self.config.invoker, &client_context)
            .await?;
        info!(
            "Function {} invoked for {} on {} ({})",
            self.config.invoker,
            context.runtime.suffix(),
            context.architecture,
            context.memory_size
        );

        Ok(())
    }
}
