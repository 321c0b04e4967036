//! Runtime registry for capability metadata and handlers.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use agent_primitives::{Capability, CapabilityRef, InputShape, Namespace};
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Trait implemented by capability executors.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Invokes the capability with the given JSON argument bag, returning JSON output.
    async fn invoke(&self, arguments: Value) -> ToolResult<Value>;
}

#[async_trait]
impl<F, Fut> CapabilityHandler for F
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = ToolResult<Value>> + Send,
{
    async fn invoke(&self, arguments: Value) -> ToolResult<Value> {
        (self)(arguments).await
    }
}

/// Immutable pairing of capability metadata with its executable handler.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    capability: Capability,
    handler: Arc<dyn CapabilityHandler>,
    time_limited: bool,
}

impl CapabilityDescriptor {
    /// Creates a descriptor from metadata and a handler.
    #[must_use]
    pub fn new<H>(capability: Capability, handler: H) -> Self
    where
        H: CapabilityHandler + 'static,
    {
        Self {
            capability,
            handler: Arc::new(handler),
            time_limited: true,
        }
    }

    /// Exempts this capability from the invoker's time limit.
    ///
    /// Meant for capabilities that invoke other capabilities themselves and
    /// already bound each of those calls.
    #[must_use]
    pub fn without_time_limit(mut self) -> Self {
        self.time_limited = false;
        self
    }

    /// Returns `false` if the invoker's time limit does not apply.
    #[must_use]
    pub const fn is_time_limited(&self) -> bool {
        self.time_limited
    }

    /// Returns the associated metadata.
    #[must_use]
    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Returns the owning namespace.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        self.capability.namespace()
    }

    /// Returns the declared input shape.
    #[must_use]
    pub fn inputs(&self) -> &InputShape {
        self.capability.inputs()
    }

    /// Returns the qualified reference of this capability.
    #[must_use]
    pub fn reference(&self) -> CapabilityRef {
        self.capability.reference()
    }

    /// Executes the handler directly, without fault isolation.
    ///
    /// Callers that must never observe a raw fault go through
    /// [`Invoker`](crate::Invoker) instead.
    ///
    /// # Errors
    ///
    /// Propagates whatever the handler returns.
    pub async fn call(&self, arguments: Value) -> ToolResult<Value> {
        self.handler.invoke(arguments).await
    }
}

impl std::fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("capability", &self.capability)
            .field("time_limited", &self.time_limited)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of the registry in registration order.
///
/// Iterating a catalog is lazy and can be repeated any number of times; each
/// pass yields the same descriptors in the same order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Arc<Vec<CapabilityDescriptor>>,
}

impl Catalog {
    /// Iterates over descriptors in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, CapabilityDescriptor> {
        self.entries.iter()
    }

    /// Number of descriptors in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the metadata of every descriptor, in registration order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.iter().map(|d| d.capability().clone()).collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CapabilityDescriptor;
    type IntoIter = std::slice::Iter<'a, CapabilityDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Default)]
struct Inner {
    // Copy-on-write so that `list` hands out snapshots without cloning descriptors.
    entries: Arc<Vec<CapabilityDescriptor>>,
    index: HashMap<CapabilityRef, usize>,
}

/// Registry that stores capabilities keyed by `(namespace, name)`.
///
/// Enumeration order is the order of registration. The registry is expected to
/// be populated at startup and read concurrently afterwards; writers take an
/// exclusive lock, readers share one.
#[derive(Default)]
pub struct CapabilityRegistry {
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = match self.inner.read() {
            Ok(inner) => inner.entries.iter().map(|d| d.reference().to_string()).collect(),
            Err(_) => vec!["<poisoned>".to_owned()],
        };
        f.debug_struct("CapabilityRegistry")
            .field("registered", &names)
            .finish()
    }
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::DuplicateCapability`] if the `(namespace, name)`
    /// pair is already present, or [`ToolError::RegistryPoisoned`] if a writer
    /// panicked while holding the lock.
    pub fn register(&self, descriptor: CapabilityDescriptor) -> ToolResult<()> {
        let mut inner = self.inner.write().map_err(|_| ToolError::RegistryPoisoned)?;
        let reference = descriptor.reference();
        if inner.index.contains_key(&reference) {
            return Err(ToolError::DuplicateCapability { reference });
        }

        let position = inner.entries.len();
        Arc::make_mut(&mut inner.entries).push(descriptor);
        inner.index.insert(reference.clone(), position);
        info!(capability = %reference, "capability registered");

        Ok(())
    }

    /// Registers a handler together with its metadata.
    ///
    /// # Errors
    ///
    /// See [`CapabilityRegistry::register`].
    pub fn register_handler<H>(&self, capability: Capability, handler: H) -> ToolResult<()>
    where
        H: CapabilityHandler + 'static,
    {
        self.register(CapabilityDescriptor::new(capability, handler))
    }

    /// Resolves a reference to its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] when nothing is registered under the
    /// reference, or [`ToolError::RegistryPoisoned`] if the lock is poisoned.
    pub fn resolve(&self, reference: &CapabilityRef) -> ToolResult<CapabilityDescriptor> {
        let inner = self.inner.read().map_err(|_| ToolError::RegistryPoisoned)?;
        inner
            .index
            .get(reference)
            .map(|&position| inner.entries[position].clone())
            .ok_or_else(|| ToolError::NotFound {
                reference: reference.clone(),
            })
    }

    /// Returns the descriptor matching the reference, if present.
    #[must_use]
    pub fn get(&self, reference: &CapabilityRef) -> Option<CapabilityDescriptor> {
        self.resolve(reference).ok()
    }

    /// Returns a snapshot of every registered descriptor in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RegistryPoisoned`] if the lock is poisoned.
    pub fn list(&self) -> ToolResult<Catalog> {
        let inner = self.inner.read().map_err(|_| ToolError::RegistryPoisoned)?;
        Ok(Catalog {
            entries: Arc::clone(&inner.entries),
        })
    }

    /// Returns the distinct namespaces in order of first registration.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RegistryPoisoned`] if the lock is poisoned.
    pub fn namespaces(&self) -> ToolResult<Vec<Namespace>> {
        let catalog = self.list()?;
        let mut namespaces: Vec<Namespace> = Vec::new();
        for descriptor in &catalog {
            if !namespaces.contains(descriptor.namespace()) {
                namespaces.push(descriptor.namespace().clone());
            }
        }
        Ok(namespaces)
    }

    /// Number of registered capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RegistryPoisoned`] if the lock is poisoned.
    pub fn len(&self) -> ToolResult<usize> {
        let inner = self.inner.read().map_err(|_| ToolError::RegistryPoisoned)?;
        Ok(inner.entries.len())
    }

    /// Returns `true` if nothing has been registered.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RegistryPoisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> ToolResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Errors produced by capability registration and invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Capability metadata failed validation.
    #[error("invalid capability metadata: {0}")]
    InvalidMetadata(#[from] agent_primitives::Error),

    /// Reference collided with an existing registration.
    #[error("capability `{reference}` is already registered")]
    DuplicateCapability {
        /// Reference of the offending capability.
        reference: CapabilityRef,
    },

    /// Requested capability does not exist.
    #[error("capability `{reference}` is not registered")]
    NotFound {
        /// Reference that failed to resolve.
        reference: CapabilityRef,
    },

    /// Arguments did not match what the capability accepts.
    #[error("invalid arguments: {reason}")]
    InvalidArguments {
        /// Description of the mismatch.
        reason: String,
    },

    /// Capability logic failed.
    #[error("capability execution failed: {reason}")]
    Handler {
        /// Human-readable error returned by the implementation.
        reason: String,
    },

    /// A writer panicked while holding the registry lock.
    #[error("capability registry lock poisoned")]
    RegistryPoisoned,
}

impl ToolError {
    /// Creates a handler error from the supplied reason.
    #[must_use]
    pub fn handler(reason: impl Into<String>) -> Self {
        Self::Handler {
            reason: reason.into(),
        }
    }

    /// Creates an argument error from the supplied reason.
    #[must_use]
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
        }
    }
}
