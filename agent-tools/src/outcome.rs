//! Uniform result of a single invocation attempt.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::ToolResult;

/// Reason recorded when an invocation exceeds its time budget.
pub const TIMEOUT_REASON: &str = "timeout";

/// Outcome of one invocation: either the handler's value or a failure reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationOutcome {
    /// The handler returned a value.
    Success {
        /// Value returned by the handler.
        result: Value,
    },
    /// The handler failed, panicked, or timed out.
    Failure {
        /// Human-readable failure description.
        reason: String,
    },
}

impl InvocationOutcome {
    /// Wraps a successful value.
    #[must_use]
    pub fn success(result: Value) -> Self {
        Self::Success { result }
    }

    /// Records a failure.
    #[must_use]
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Records an invocation that ran out of time.
    #[must_use]
    pub fn timeout() -> Self {
        Self::failure(TIMEOUT_REASON)
    }

    /// Returns `true` for [`InvocationOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the successful value, if any.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Success { result } => Some(result),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason),
        }
    }
}

impl From<ToolResult<Value>> for InvocationOutcome {
    fn from(value: ToolResult<Value>) -> Self {
        match value {
            Ok(result) => Self::success(result),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToolError;
    use serde_json::json;

    #[test]
    fn wire_format_is_tagged() {
        assert_eq!(
            serde_json::to_value(InvocationOutcome::success(json!({ "mealPlan": "soup" }))).unwrap(),
            json!({ "status": "success", "result": { "mealPlan": "soup" } })
        );
        assert_eq!(
            serde_json::to_value(InvocationOutcome::timeout()).unwrap(),
            json!({ "status": "failure", "reason": "timeout" })
        );
    }

    #[test]
    fn converts_from_tool_result() {
        let ok: InvocationOutcome = Ok(json!(1)).into();
        assert_eq!(ok.result(), Some(&json!(1)));

        let failed: InvocationOutcome = Err(ToolError::handler("boom")).into();
        assert!(!failed.is_success());
        assert_eq!(failed.reason(), Some("capability execution failed: boom"));
    }
}
