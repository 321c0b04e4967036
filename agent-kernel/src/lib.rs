//! Fan-out dispatch over a capability registry.
//!
//! This crate provides the orchestration layer: a [`Dispatcher`] that resolves
//! the designated self-care capability, discovers peers declaring the
//! `{message: string}` contract, invokes them concurrently on a bounded
//! [`TaskScheduler`], and aggregates every outcome in registry order.

#![warn(missing_docs, clippy::pedantic)]

mod builtin;
mod dispatcher;
mod scheduler;

pub use builtin::{CHAT_AGENTS, LIST_TOOLS};
pub use dispatcher::{
    DEFAULT_NAMESPACE, DEFAULT_SELF_CARE_CAPABILITY, DispatchError, DispatchRequest,
    DispatchResult, Dispatcher, PeerResponse, SelfCare,
};
pub use scheduler::{SchedulerConfig, SchedulerError, SchedulerResult, TaskScheduler};
