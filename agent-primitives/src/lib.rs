//! Core shared types for capability registration and invocation.

#![warn(missing_docs, clippy::pedantic)]

mod capability;
mod error;
mod ids;
mod shape;

/// Capability metadata and supporting builders.
pub use capability::{Capability, CapabilityBuilder};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Identifiers for namespaces, capabilities, and invocations.
pub use ids::{CapabilityName, CapabilityRef, InvocationId, Namespace};
/// Declared input shapes compared structurally at dispatch time.
pub use shape::{FieldType, InputShape};
