//! Wellness capability mesh facade.
//!
//! Bundles the runtime crates behind feature flags so downstream users can
//! enable only the components they need. With the default features,
//! [`runtime::Runtime`] wires a registry, invoker, dispatcher, and the
//! wellness capabilities from a single [`config::RuntimeConfig`].

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use agent_primitives as primitives;

/// Capability registry and invoker.
pub use agent_tools as tools;

/// Fan-out dispatcher and scheduler (enabled by `kernel` feature).
#[cfg(feature = "kernel")]
pub use agent_kernel as kernel;

/// Wellness capabilities (enabled by `wellness` feature).
#[cfg(feature = "wellness")]
pub use agent_wellness as wellness;

/// Tracing setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use agent_telemetry as telemetry;

/// Configuration management (enabled by `config` feature).
#[cfg(feature = "config")]
pub use agent_config as config;

#[cfg(all(feature = "kernel", feature = "wellness", feature = "config"))]
pub mod runtime;
