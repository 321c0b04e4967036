//! Fault-isolating execution of registered capabilities.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agent_primitives::CapabilityRef;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::outcome::InvocationOutcome;
use crate::registry::{CapabilityDescriptor, CapabilityRegistry, ToolResult};

/// Resolves capabilities against a registry and runs them in isolation.
///
/// [`Invoker::invoke`] never returns an error and never lets a handler panic
/// escape: every fault is recorded as [`InvocationOutcome::Failure`].
#[derive(Clone, Debug)]
pub struct Invoker {
    registry: Arc<CapabilityRegistry>,
    timeout: Option<Duration>,
}

impl Invoker {
    /// Creates an invoker without a time limit.
    #[must_use]
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Sets the per-invocation time limit. `None` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the backing registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Returns the configured time limit.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolves `reference` and invokes it.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`](crate::ToolError::NotFound) when the
    /// reference is unknown. Faults raised by the capability itself are never
    /// returned as errors; they are reported in the outcome.
    pub async fn call(
        &self,
        reference: &CapabilityRef,
        arguments: Value,
    ) -> ToolResult<InvocationOutcome> {
        let descriptor = self.registry.resolve(reference)?;
        Ok(self.invoke(&descriptor, arguments).await)
    }

    /// Executes `descriptor` against `arguments`.
    pub async fn invoke(
        &self,
        descriptor: &CapabilityDescriptor,
        arguments: Value,
    ) -> InvocationOutcome {
        let reference = descriptor.reference();

        if let Err(reason) = descriptor.inputs().conforms(&arguments) {
            warn!(capability = %reference, %reason, "arguments rejected");
            return InvocationOutcome::failure(format!("invalid arguments: {reason}"));
        }

        let started = Instant::now();
        let execution = AssertUnwindSafe(descriptor.call(arguments)).catch_unwind();
        let limit = self.timeout.filter(|_| descriptor.is_time_limited());
        let result = match limit {
            Some(limit) => match tokio::time::timeout(limit, execution).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(capability = %reference, ?limit, "capability timed out");
                    return InvocationOutcome::timeout();
                }
            },
            None => execution.await,
        };
        let elapsed = started.elapsed();

        match result {
            Ok(Ok(value)) => {
                debug!(capability = %reference, ?elapsed, "capability succeeded");
                InvocationOutcome::success(value)
            }
            Ok(Err(err)) => {
                warn!(capability = %reference, ?elapsed, error = %err, "capability failed");
                InvocationOutcome::failure(err.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(capability = %reference, ?elapsed, panic = %message, "capability panicked");
                InvocationOutcome::failure(format!("capability panicked: {message}"))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
