//! Fan-out of a message to every compatible peer capability.

use std::time::Duration;

use agent_primitives::{CapabilityName, CapabilityRef, InputShape, InvocationId, Namespace};
use agent_tools::{InvocationOutcome, Invoker, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::scheduler::{SchedulerError, TaskScheduler};

/// Namespace the wellness capabilities are registered under by default.
pub const DEFAULT_NAMESPACE: &str = "holistic-wellness";

/// Capability invoked for the self-care half of a dispatch by default.
pub const DEFAULT_SELF_CARE_CAPABILITY: &str = "process_datastream";

/// Inbound fan-out request.
///
/// The self-care flag is read from `includeSelfCare` or its shorter form
/// `includeSelf`. When both are present `includeSelfCare` wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireRequest")]
pub struct DispatchRequest {
    /// Text forwarded verbatim to every peer.
    pub message: String,
    /// Whether to run the designated self-care capability as well.
    #[serde(rename = "includeSelfCare")]
    pub include_self: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    message: String,
    #[serde(default)]
    include_self_care: Option<bool>,
    #[serde(default)]
    include_self: Option<bool>,
}

impl From<WireRequest> for DispatchRequest {
    fn from(wire: WireRequest) -> Self {
        Self {
            message: wire.message,
            include_self: wire
                .include_self_care
                .or(wire.include_self)
                .unwrap_or_default(),
        }
    }
}

impl DispatchRequest {
    /// Creates a request that only fans out to peers.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            include_self: false,
        }
    }

    /// Toggles the self-care invocation.
    #[must_use]
    pub fn with_self_care(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }

    /// Parses a request from a JSON argument bag.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidRequest`] when `message` is missing or is
    /// not a string, or when the self-care flag is not a boolean.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        serde_json::from_value(value).map_err(|err| DispatchError::InvalidRequest {
            reason: err.to_string(),
        })
    }
}

/// One peer's entry in a [`DispatchResult`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerResponse {
    /// Namespace owning the peer capability.
    #[serde(rename = "agent")]
    pub namespace: Namespace,
    /// Name of the peer capability.
    #[serde(rename = "tool")]
    pub name: CapabilityName,
    /// What the invocation produced.
    #[serde(rename = "response")]
    pub outcome: InvocationOutcome,
}

/// Aggregated outcome of a fan-out.
///
/// `peer_responses` follows registry enumeration order regardless of the
/// order in which invocations completed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResult {
    /// Outcome of the self-care invocation, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_care: Option<InvocationOutcome>,
    /// Outcomes of every eligible peer.
    pub peer_responses: Vec<PeerResponse>,
}

/// The designated self capability and the fixed profile it is invoked with.
#[derive(Clone, Debug, PartialEq)]
pub struct SelfCare {
    target: CapabilityRef,
    arguments: Value,
}

impl SelfCare {
    /// Creates a self-care designation.
    #[must_use]
    pub fn new(target: CapabilityRef, arguments: Value) -> Self {
        Self { target, arguments }
    }

    /// Default designation: the wellness scorer under `namespace`, fed a neutral
    /// profile.
    #[must_use]
    pub fn neutral_profile(namespace: Namespace) -> Self {
        let name = CapabilityName::new(DEFAULT_SELF_CARE_CAPABILITY)
            .expect("constant capability name is valid");
        Self::new(
            CapabilityRef::new(namespace, name),
            json!({
                "sleepQuality": 0.7,
                "dietScore": 0.6,
                "activityScore": 0.8,
                "calendarBalance": 0.5,
                "personality": "Thoughtful coach",
            }),
        )
    }

    /// Returns the capability invoked for self-care.
    #[must_use]
    pub fn target(&self) -> &CapabilityRef {
        &self.target
    }

    /// Returns the synthetic argument bag.
    #[must_use]
    pub fn arguments(&self) -> &Value {
        &self.arguments
    }
}

/// Errors that abort a whole dispatch.
///
/// Individual peer faults never surface here; they are recorded per peer.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request itself was malformed.
    #[error("invalid dispatch request: {reason}")]
    InvalidRequest {
        /// Description of the problem.
        reason: String,
    },
    /// The registry could not be read.
    #[error("registry unavailable: {0}")]
    Registry(#[from] ToolError),
    /// The scheduler refused new work.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Fan-out orchestrator.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    namespace: Namespace,
    invoker: Invoker,
    scheduler: TaskScheduler,
    self_care: SelfCare,
}

impl Dispatcher {
    /// Creates a dispatcher owning `namespace`, using the default self-care
    /// designation under that namespace.
    #[must_use]
    pub fn new(namespace: Namespace, invoker: Invoker, scheduler: TaskScheduler) -> Self {
        let self_care = SelfCare::neutral_profile(namespace.clone());
        Self {
            namespace,
            invoker,
            scheduler,
            self_care,
        }
    }

    /// Overrides the self-care designation.
    #[must_use]
    pub fn with_self_care(mut self, self_care: SelfCare) -> Self {
        self.self_care = self_care;
        self
    }

    /// Returns the namespace this dispatcher speaks for.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the invoker used for every invocation.
    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Returns the scheduler peer invocations run on.
    #[must_use]
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// Returns the self-care designation.
    #[must_use]
    pub fn self_care(&self) -> &SelfCare {
        &self.self_care
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.invoker.timeout()
    }

    /// Runs the optional self-care invocation, then invokes every peer whose
    /// declared input shape is exactly `{message: string}` and which lives
    /// outside this dispatcher's namespace.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Registry`] if the registry cannot be read and
    /// [`DispatchError::Scheduler`] if the scheduler was closed before the
    /// dispatch started. Peer failures are reported in the result.
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResult, DispatchError> {
        let id = InvocationId::random();
        let span = info_span!(
            "dispatch",
            invocation_id = %id,
            namespace = %self.namespace,
            include_self = request.include_self
        );
        self.dispatch_inner(request).instrument(span).await
    }

    async fn dispatch_inner(&self, request: &DispatchRequest) -> Result<DispatchResult, DispatchError> {
        if self.scheduler.is_closed() {
            return Err(SchedulerError::Closed.into());
        }

        let self_care = if request.include_self {
            Some(self.run_self_care().await?)
        } else {
            None
        };

        let contract = InputShape::message();
        let catalog = self.invoker.registry().list()?;
        let mut pending = Vec::new();

        for descriptor in &catalog {
            if descriptor.namespace() == &self.namespace {
                continue;
            }
            if descriptor.inputs() != &contract {
                debug!(capability = %descriptor.reference(), "skipping peer with incompatible shape");
                continue;
            }

            let invoker = self.invoker.clone();
            let peer = descriptor.clone();
            let arguments = json!({ "message": request.message });
            let task = self
                .scheduler
                .spawn(async move { invoker.invoke(&peer, arguments).await });
            pending.push((descriptor.capability().clone(), task));
        }

        let mut peer_responses = Vec::with_capacity(pending.len());
        for (capability, task) in pending {
            let outcome = match task {
                Ok(handle) => match handle.await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(err)) => InvocationOutcome::failure(err.to_string()),
                    Err(err) => InvocationOutcome::failure(format!("peer task aborted: {err}")),
                },
                Err(err) => InvocationOutcome::failure(err.to_string()),
            };
            if !outcome.is_success() {
                warn!(
                    capability = %capability.reference(),
                    reason = outcome.reason().unwrap_or_default(),
                    "peer invocation failed"
                );
            }
            peer_responses.push(PeerResponse {
                namespace: capability.namespace().clone(),
                name: capability.name().clone(),
                outcome,
            });
        }

        info!(
            peers = peer_responses.len(),
            failed = peer_responses.iter().filter(|p| !p.outcome.is_success()).count(),
            "dispatch complete"
        );

        Ok(DispatchResult {
            self_care,
            peer_responses,
        })
    }

    async fn run_self_care(&self) -> Result<InvocationOutcome, DispatchError> {
        let target = self.self_care.target();
        match self
            .invoker
            .call(target, self.self_care.arguments().clone())
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(ToolError::RegistryPoisoned) => Err(ToolError::RegistryPoisoned.into()),
            Err(err) => {
                warn!(capability = %target, error = %err, "self-care unavailable");
                Ok(InvocationOutcome::failure(err.to_string()))
            }
        }
    }
}
