//! In-memory stand-in for the Lambda invoke API and DynamoDB.

use async_trait::async_trait;
use shared::dynamodb::Tables;
use shared::error::{Error, Result};
use shared::lambda::Invoke;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeAws {
    events: Mutex<Vec<String>>,
    contexts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    table_missing: Mutex<bool>,
    table_broken: Mutex<bool>,
    failing_invocation: Mutex<Option<usize>>,
}

impl FakeAws {
    pub const INVOKE_LATENCY: Duration = Duration::from_millis(50);

    pub fn table_missing(&self) {
        *self.table_missing.lock().unwrap() = true;
    }

    pub fn table_broken(&self) {
        *self.table_broken.lock().unwrap() = true;
    }

    /// The `nth` invocation (1-based) fails once its latency has elapsed.
    pub fn fail_invocation(&self, nth: usize) {
        *self.failing_invocation.lock().unwrap() = Some(nth);
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn contexts(&self) -> Vec<String> {
        self.contexts.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Invoke for FakeAws {
    async fn invoke_with_context(&self, function_name: &str, client_context: &str) -> Result<()> {
        self.record(format!("invoke {}", function_name));
        let nth = {
            let mut contexts = self.contexts.lock().unwrap();
            contexts.push(client_context.to_string());
            contexts.len()
        };

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        tokio::time::sleep(Self::INVOKE_LATENCY).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if *self.failing_invocation.lock().unwrap() == Some(nth) {
            return Err(Error::remote("Invoke", "TooManyRequestsException"));
        }
        Ok(())
    }
}

#[async_trait]
impl Tables for FakeAws {
    async fn delete_table(&self, name: &str) -> Result<()> {
        self.record(format!("delete_table {}", name));
        if *self.table_broken.lock().unwrap() {
            return Err(Error::remote("DeleteTable", "AccessDeniedException"));
        }
        if *self.table_missing.lock().unwrap() {
            return Err(Error::not_found("table", name));
        }
        Ok(())
    }

    async fn create_table(&self, name: &str, hash_key: &str) -> Result<()> {
        self.record(format!("create_table {} {}", name, hash_key));
        Ok(())
    }
}
