//! Capability registration and invocation utilities.
//!
//! The registry keeps an insertion-ordered catalog of capabilities keyed by
//! `(namespace, name)`. The invoker executes a resolved capability and folds
//! every fault raised by its handler into an [`InvocationOutcome`].

#![warn(missing_docs, clippy::pedantic)]

pub mod invoker;
pub mod outcome;
pub mod registry;

pub use invoker::Invoker;
pub use outcome::InvocationOutcome;
pub use registry::{
    Catalog, CapabilityDescriptor, CapabilityHandler, CapabilityRegistry, ToolError, ToolResult,
};
