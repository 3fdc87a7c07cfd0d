//! Compute-service operations used by the deployer and the invoker.
//!
//! The workflows are generic over these traits; [`Lambda`] backs them with the SDK.

use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_lambda::types::{
    Architecture, Environment, FunctionCode, InvocationType, Runtime, SnapStart, SnapStartApplyOn,
    State,
};
use tracing::warn;

/// Everything needed to create one benchmark function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub handler: String,
    pub runtime: String,
    pub code_bucket: String,
    pub code_key: String,
    pub role_arn: String,
    pub memory_size: u16,
    pub architecture: String,
    pub snap_start: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionState {
    Pending,
    Active,
    Inactive,
    Failed(String),
    Unknown(String),
}

/// Permission granted to a principal to invoke a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Permission {
    pub function_name: String,
    pub action: String,
    pub principal: String,
    pub statement_id: String,
}

#[async_trait]
pub trait Functions {
    /// Returns [`Error::NotFound`] when the function does not exist.
    async fn delete_function(&self, name: &str) -> Result<()>;
    async fn create_function(&self, spec: &FunctionSpec) -> Result<()>;
    async fn function_state(&self, name: &str) -> Result<FunctionState>;
    async fn update_environment(&self, name: &str, key: &str, value: &str) -> Result<()>;
    /// Returns the published version identifier.
    async fn publish_version(&self, name: &str) -> Result<String>;
    async fn add_permission(&self, permission: &Permission) -> Result<()>;
}

#[async_trait]
pub trait Invoke {
    /// Invokes `function_name` with a base64 encoded client context and an empty payload.
    async fn invoke_with_context(&self, function_name: &str, client_context: &str) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct Lambda {
    inner: aws_sdk_lambda::Client,
}

impl Lambda {
    pub fn new(inner: aws_sdk_lambda::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Functions for Lambda {
    async fn delete_function(&self, name: &str) -> Result<()> {
        match self.inner.delete_function().function_name(name).send().await {
            Ok(_) => Ok(()),
            Err(e) => match e.into_service_error() {
                e if e.is_resource_not_found_exception() => Err(Error::not_found("function", name)),
                e => Err(Error::remote("DeleteFunction", e)),
            },
        }
    }

    async fn create_function(&self, spec: &FunctionSpec) -> Result<()> {
        let code = FunctionCode::builder()
            .s3_bucket(&spec.code_bucket)
            .s3_key(&spec.code_key)
            .build();

        let mut request = self
            .inner
            .create_function()
            .function_name(&spec.name)
            .handler(&spec.handler)
            .runtime(Runtime::from(spec.runtime.as_str()))
            .code(code)
            .role(&spec.role_arn)
            .memory_size(i32::from(spec.memory_size))
            .architectures(Architecture::from(spec.architecture.as_str()));

        if let Some(apply_on) = &spec.snap_start {
            request = request.snap_start(
                SnapStart::builder()
                    .apply_on(SnapStartApplyOn::from(apply_on.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| Error::remote("CreateFunction", e.into_service_error()))?;

        Ok(())
    }

    async fn function_state(&self, name: &str) -> Result<FunctionState> {
        let output = self
            .inner
            .get_function()
            .function_name(name)
            .send()
            .await
            .map_err(|e| Error::remote("GetFunction", e.into_service_error()))?;

        let configuration = output.configuration();
        let state = match configuration.and_then(|c| c.state()) {
            Some(State::Active) => FunctionState::Active,
            Some(State::Pending) => FunctionState::Pending,
            Some(State::Inactive) => FunctionState::Inactive,
            Some(State::Failed) => FunctionState::Failed(
                configuration
                    .and_then(|c| c.state_reason())
                    .unwrap_or("no reason given")
                    .to_string(),
            ),
            Some(other) => FunctionState::Unknown(other.as_str().to_string()),
            None => FunctionState::Unknown("missing".to_string()),
        };

        Ok(state)
    }

    async fn update_environment(&self, name: &str, key: &str, value: &str) -> Result<()> {
        self.inner
            .update_function_configuration()
            .function_name(name)
            .environment(Environment::builder().variables(key, value).build())
            .send()
            .await
            .map_err(|e| Error::remote("UpdateFunctionConfiguration", e.into_service_error()))?;

        Ok(())
    }

    async fn publish_version(&self, name: &str) -> Result<String> {
        let output = self
            .inner
            .publish_version()
            .function_name(name)
            .send()
            .await
            .map_err(|e| Error::remote("PublishVersion", e.into_service_error()))?;

        Ok(output.version().unwrap_or_default().to_string())
    }

    async fn add_permission(&self, permission: &Permission) -> Result<()> {
        self.inner
            .add_permission()
            .function_name(&permission.function_name)
            .action(&permission.action)
            .principal(&permission.principal)
            .statement_id(&permission.statement_id)
            .send()
            .await
            .map_err(|e| Error::remote("AddPermission", e.into_service_error()))?;

        Ok(())
    }
}

#[async_trait]
impl Invoke for Lambda {
    async fn invoke_with_context(&self, function_name: &str, client_context: &str) -> Result<()> {
        let output = self
            .inner
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .client_context(client_context)
            .send()
            .await
            .map_err(|e| Error::remote("Invoke", e.into_service_error()))?;

        // The dispatcher's own failures are recorded by the log pipeline, not here.
        if let Some(function_error) = output.function_error() {
            warn!("{} reported {}", function_name, function_error);
        }

        Ok(())
    }
}
