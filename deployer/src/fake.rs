//! In-memory stand-in for the Lambda and CloudWatch Logs control planes.

use async_trait::async_trait;
use shared::error::{Error, Result};
use shared::lambda::{FunctionSpec, FunctionState, Functions, Permission};
use shared::logs::{LogGroups, SubscriptionFilter};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeAws {
    calls: Mutex<Vec<String>>,
    existing: Mutex<HashSet<String>>,
    broken: Mutex<HashSet<String>>,
    failing: Mutex<HashSet<&'static str>>,
    deny_permission: Mutex<bool>,
    publish_failures: Mutex<u32>,
    published: Mutex<u32>,
    states: Mutex<VecDeque<FunctionState>>,
    stay_pending: Mutex<bool>,
    environment: Mutex<Vec<String>>,
    created: Mutex<Vec<FunctionSpec>>,
    filters: Mutex<Vec<SubscriptionFilter>>,
    permissions: Mutex<Vec<Permission>>,
}

impl FakeAws {
    /// Functions and log groups start out missing unless marked existing.
    pub fn existing(&self, name: &str) {
        self.existing.lock().unwrap().insert(name.to_string());
    }

    /// Any delete of `name` fails with a non-absence error.
    pub fn broken(&self, name: &str) {
        self.broken.lock().unwrap().insert(name.to_string());
    }

    /// Every call to the trait method `method` fails with a service error.
    pub fn fail(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    pub fn deny_permission(&self) {
        *self.deny_permission.lock().unwrap() = true;
    }

    pub fn fail_publishes(&self, times: u32) {
        *self.publish_failures.lock().unwrap() = times;
    }

    pub fn push_states(&self, states: impl IntoIterator<Item = FunctionState>) {
        self.states.lock().unwrap().extend(states);
    }

    pub fn stay_pending(&self) {
        *self.stay_pending.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    pub fn environment_values(&self) -> Vec<String> {
        self.environment.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<FunctionSpec> {
        self.created.lock().unwrap().clone()
    }

    pub fn filters(&self) -> Vec<SubscriptionFilter> {
        self.filters.lock().unwrap().clone()
    }

    pub fn permissions(&self) -> Vec<Permission> {
        self.permissions.lock().unwrap().clone()
    }

    fn record(&self, operation: &str, target: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", operation, target));
    }

    fn check(&self, method: &str, operation: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(method) {
            return Err(Error::remote(operation, "ServiceException"));
        }
        Ok(())
    }

    fn delete(&self, resource: &'static str, operation: &'static str, name: &str) -> Result<()> {
        if self.broken.lock().unwrap().contains(name) {
            return Err(Error::remote(operation, "AccessDeniedException"));
        }
        if self.existing.lock().unwrap().remove(name) {
            Ok(())
        } else {
            Err(Error::not_found(resource, name))
        }
    }
}

#[async_trait]
impl Functions for FakeAws {
    async fn delete_function(&self, name: &str) -> Result<()> {
        self.record("delete_function", name);
        self.delete("function", "DeleteFunction", name)
    }

    async fn create_function(&self, spec: &FunctionSpec) -> Result<()> {
        self.record("create_function", &spec.name);
        self.check("create_function", "CreateFunction")?;
        self.created.lock().unwrap().push(spec.clone());
        Ok(())
    }

    async fn function_state(&self, name: &str) -> Result<FunctionState> {
        self.record("function_state", name);
        if *self.stay_pending.lock().unwrap() {
            return Ok(FunctionState::Pending);
        }
        Ok(self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(FunctionState::Active))
    }

    async fn update_environment(&self, name: &str, _key: &str, value: &str) -> Result<()> {
        self.record("update_environment", name);
        self.check("update_environment", "UpdateFunctionConfiguration")?;
        self.environment.lock().unwrap().push(value.to_string());
        Ok(())
    }

    async fn publish_version(&self, name: &str) -> Result<String> {
        self.record("publish_version", name);
        let mut failures = self.publish_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(Error::remote("PublishVersion", "ResourceConflictException"));
        }
        let mut published = self.published.lock().unwrap();
        *published += 1;
        Ok(published.to_string())
    }

    async fn add_permission(&self, permission: &Permission) -> Result<()> {
        self.record("add_permission", &permission.function_name);
        if *self.deny_permission.lock().unwrap() {
            return Err(Error::remote("AddPermission", "ResourceConflictException"));
        }
        self.permissions.lock().unwrap().push(permission.clone());
        Ok(())
    }
}

#[async_trait]
impl LogGroups for FakeAws {
    async fn delete_log_group(&self, name: &str) -> Result<()> {
        self.record("delete_log_group", name);
        self.delete("log group", "DeleteLogGroup", name)
    }

    async fn create_log_group(&self, name: &str) -> Result<()> {
        self.record("create_log_group", name);
        self.check("create_log_group", "CreateLogGroup")?;
        Ok(())
    }

    async fn put_subscription_filter(&self, filter: &SubscriptionFilter) -> Result<()> {
        self.record("put_subscription_filter", &filter.log_group_name);
        self.check("put_subscription_filter", "PutSubscriptionFilter")?;
        self.filters.lock().unwrap().push(filter.clone());
        Ok(())
    }
}
