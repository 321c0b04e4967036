//! Capabilities the dispatcher exposes under its own namespace.

use std::sync::{Arc, Weak};
use std::time::Duration;

use agent_primitives::{Capability, FieldType, InputShape, Namespace};
use agent_tools::{CapabilityDescriptor, CapabilityRegistry, Invoker, ToolError, ToolResult};
use serde_json::Value;

use crate::dispatcher::{DispatchError, DispatchRequest, Dispatcher, SelfCare};
use crate::scheduler::TaskScheduler;

/// Name of the fan-out capability.
pub const CHAT_AGENTS: &str = "chat_agents";

/// Name of the catalog capability.
pub const LIST_TOOLS: &str = "list_tools";

// The registry owns these handlers, so they hold it weakly and rebuild a
// dispatcher per call.
#[derive(Clone)]
struct Rebind {
    registry: Weak<CapabilityRegistry>,
    namespace: Namespace,
    timeout: Option<Duration>,
    scheduler: TaskScheduler,
    self_care: SelfCare,
}

impl Rebind {
    fn registry(&self) -> ToolResult<Arc<CapabilityRegistry>> {
        self.registry
            .upgrade()
            .ok_or_else(|| ToolError::handler("capability registry has been dropped"))
    }

    fn dispatcher(&self) -> ToolResult<Dispatcher> {
        let invoker = Invoker::new(self.registry()?).with_timeout(self.timeout);
        Ok(
            Dispatcher::new(self.namespace.clone(), invoker, self.scheduler.clone())
                .with_self_care(self.self_care.clone()),
        )
    }
}

impl Dispatcher {
    /// Registers `chat_agents` and `list_tools` under this dispatcher's
    /// namespace in its own registry.
    ///
    /// `chat_agents` runs [`Dispatcher::dispatch`] for its argument bag;
    /// `list_tools` returns the catalog in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateCapability`] if either name is taken.
    pub fn register_builtins(&self) -> ToolResult<()> {
        let registry = self.invoker().registry();
        let rebind = Rebind {
            registry: Arc::downgrade(registry),
            namespace: self.namespace().clone(),
            timeout: self.timeout(),
            scheduler: self.scheduler().clone(),
            self_care: self.self_care().clone(),
        };

        let chat = rebind.clone();
        // Self-care and each peer call are time-limited individually; the
        // fan-out as a whole is not.
        let capability = chat_agents_capability(self.namespace())?;
        let fan_out = CapabilityDescriptor::new(capability, move |args: Value| {
            let chat = chat.clone();
            async move {
                let request = DispatchRequest::from_value(args)
                    .map_err(|err| ToolError::invalid_arguments(err.to_string()))?;
                let result = chat
                    .dispatcher()?
                    .dispatch(&request)
                    .await
                    .map_err(|err: DispatchError| ToolError::handler(err.to_string()))?;
                serde_json::to_value(result).map_err(|err| ToolError::handler(err.to_string()))
            }
        })
        .without_time_limit();
        registry.register(fan_out)?;

        let list = rebind;
        registry.register_handler(list_tools_capability(self.namespace())?, move |_: Value| {
            let list = list.clone();
            async move {
                let catalog = list.registry()?.list()?;
                serde_json::to_value(catalog.capabilities())
                    .map_err(|err| ToolError::handler(err.to_string()))
            }
        })?;

        Ok(())
    }
}

fn chat_agents_capability(namespace: &Namespace) -> ToolResult<Capability> {
    let capability = Capability::builder(namespace.clone())
        .name(CHAT_AGENTS)?
        .description("Forward a message to every peer accepting {message: string}")?
        .inputs(
            InputShape::message()
                .field("includeSelfCare", FieldType::Boolean)
                .field("includeSelf", FieldType::Boolean),
        )
        .build()?;
    Ok(capability)
}

fn list_tools_capability(namespace: &Namespace) -> ToolResult<Capability> {
    let capability = Capability::builder(namespace.clone())
        .name(LIST_TOOLS)?
        .description("Enumerate every registered capability")?
        .build()?;
    Ok(capability)
}
