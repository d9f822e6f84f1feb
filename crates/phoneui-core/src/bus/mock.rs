//! Scripted in-process bus for tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{Bus, ObjectRef};
use crate::error::ServiceResult;

type Handler = dyn Fn(&ObjectRef, &str, &[Value]) -> ServiceResult<Value> + Send + Sync;

/// A call observed by [`MockBus`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub target: ObjectRef,
    pub method: String,
    pub args: Vec<Value>,
}

/// [`Bus`] answering every call from a handler closure.
pub struct MockBus {
    handler: Arc<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Option<Duration>,
}

impl MockBus {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ObjectRef, &str, &[Value]) -> ServiceResult<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            calls: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    /// A bus that answers every call with `null`.
    pub fn silent() -> Self {
        Self::new(|_, _, _| Ok(Value::Null))
    }

    /// Delays every reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Calls of `method`, in order of arrival.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait]
impl Bus for MockBus {
    async fn call(&self, target: &ObjectRef, method: &str, args: Vec<Value>) -> ServiceResult<Value> {
        self.calls.lock().push(RecordedCall {
            target: target.clone(),
            method: method.to_string(),
            args: args.clone(),
        });
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        (self.handler)(target, method, &args)
    }
}
