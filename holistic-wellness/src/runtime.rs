//! One-call wiring of a complete runtime.

use std::sync::Arc;

use agent_config::RuntimeConfig;
use agent_kernel::{Dispatcher, SchedulerConfig, TaskScheduler};
use agent_primitives::CapabilityRef;
use agent_tools::{CapabilityRegistry, InvocationOutcome, Invoker, ToolResult};
use serde_json::Value;
use tracing::info;

/// Registry, invoker, and dispatcher sharing one configuration.
#[derive(Debug, Clone)]
pub struct Runtime {
    registry: Arc<CapabilityRegistry>,
    invoker: Invoker,
    dispatcher: Dispatcher,
}

impl Runtime {
    /// Builds a runtime with the wellness capabilities and the dispatcher's
    /// built-ins registered under the configured namespace.
    ///
    /// # Errors
    ///
    /// Fails on an invalid namespace or a registration conflict.
    pub fn from_config(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let namespace = config.namespace()?;
        let registry = Arc::new(CapabilityRegistry::new());
        let invoker =
            Invoker::new(Arc::clone(&registry)).with_timeout(config.invocation_timeout());
        let scheduler = TaskScheduler::new(SchedulerConfig::new(config.max_concurrency));
        let dispatcher = Dispatcher::new(namespace.clone(), invoker.clone(), scheduler);

        agent_wellness::register(&registry, &namespace)?;
        dispatcher.register_builtins()?;
        let capabilities = registry.len()?;

        info!(
            namespace = %namespace,
            capabilities,
            timeout = ?config.invocation_timeout(),
            max_concurrency = config.max_concurrency.get(),
            "runtime ready"
        );

        Ok(Self {
            registry,
            invoker,
            dispatcher,
        })
    }

    /// Returns the shared registry, e.g. to register additional peers.
    #[must_use]
    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Returns the invoker.
    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Invokes a capability by reference.
    ///
    /// # Errors
    ///
    /// Returns [`agent_tools::ToolError::NotFound`] for unknown references.
    pub async fn call(&self, reference: &CapabilityRef, arguments: Value) -> ToolResult<InvocationOutcome> {
        self.invoker.call(reference, arguments).await
    }
}
