//! Strongly typed configuration schema.

use std::num::NonZeroUsize;
use std::time::Duration;

use agent_primitives::Namespace;
use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_NAMESPACE: &str = "holistic-wellness";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_CONCURRENCY: NonZeroUsize = NonZeroUsize::new(32).unwrap();
const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for one runtime process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Namespace the local capabilities and the dispatcher live under.
    pub namespace: String,
    /// Per-invocation time limit in milliseconds; `None` disables it.
    pub invocation_timeout_ms: Option<u64>,
    /// Maximum number of peer invocations running at once.
    pub max_concurrency: NonZeroUsize,
    /// `tracing` filter directive, e.g. `info` or `agent_kernel=debug`.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            invocation_timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl RuntimeConfig {
    /// Parses the configured namespace.
    ///
    /// # Errors
    ///
    /// Fails when the namespace is not a valid identifier.
    pub fn namespace(&self) -> anyhow::Result<Namespace> {
        Namespace::new(self.namespace.as_str())
            .with_context(|| format!("invalid namespace `{}`", self.namespace))
    }

    /// Returns the per-invocation time limit.
    #[must_use]
    pub fn invocation_timeout(&self) -> Option<Duration> {
        self.invocation_timeout_ms.map(Duration::from_millis)
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Fails on an invalid namespace, a zero timeout, or an empty log filter.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.namespace()?;
        if self.invocation_timeout_ms == Some(0) {
            anyhow::bail!("invocation timeout must be greater than zero; omit it to disable");
        }
        if self.log_filter.trim().is_empty() {
            anyhow::bail!("log filter cannot be empty");
        }
        Ok(())
    }
}
