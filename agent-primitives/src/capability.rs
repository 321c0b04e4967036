//! Capability metadata shared across the agent runtime.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ids::{CapabilityName, CapabilityRef, Namespace};
use crate::shape::InputShape;

const MAX_DESCRIPTION_LEN: usize = 512;

/// Describes a capability exposed under a namespace.
///
/// This is the catalog entry a remote orchestrator enumerates; the wire keys
/// follow the agent/tool vocabulary used by peers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(rename = "agentName")]
    namespace: Namespace,
    #[serde(rename = "toolName")]
    name: CapabilityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    inputs: InputShape,
}

impl Capability {
    /// Starts building a capability owned by `namespace`.
    #[must_use]
    pub fn builder(namespace: Namespace) -> CapabilityBuilder {
        CapabilityBuilder {
            namespace,
            name: None,
            description: None,
            inputs: InputShape::new(),
        }
    }

    /// Returns the owning namespace.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &CapabilityName {
        &self.name
    }

    /// Optional human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared input shape.
    #[must_use]
    pub fn inputs(&self) -> &InputShape {
        &self.inputs
    }

    /// Returns the qualified `namespace.name` reference.
    #[must_use]
    pub fn reference(&self) -> CapabilityRef {
        CapabilityRef::new(self.namespace.clone(), self.name.clone())
    }
}

/// Builder for [`Capability`].
#[derive(Debug)]
pub struct CapabilityBuilder {
    namespace: Namespace,
    name: Option<CapabilityName>,
    description: Option<String>,
    inputs: InputShape,
}

impl CapabilityBuilder {
    /// Sets the capability name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] if the name fails validation.
    pub fn name(mut self, name: impl Into<String>) -> Result<Self> {
        self.name = Some(CapabilityName::new(name)?);
        Ok(self)
    }

    /// Sets an optional description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapability`] if the description is blank or
    /// exceeds the maximum supported length.
    pub fn description(mut self, description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(Error::InvalidCapability {
                reason: "description cannot be blank".into(),
            });
        }
        if description.len() > MAX_DESCRIPTION_LEN {
            return Err(Error::InvalidCapability {
                reason: format!("description length must be <= {MAX_DESCRIPTION_LEN}"),
            });
        }
        self.description = Some(description);
        Ok(self)
    }

    /// Replaces the declared input shape.
    #[must_use]
    pub fn inputs(mut self, inputs: InputShape) -> Self {
        self.inputs = inputs;
        self
    }

    /// Finalises the capability descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCapability`] if no name was provided.
    pub fn build(self) -> Result<Capability> {
        let name = self.name.ok_or_else(|| Error::InvalidCapability {
            reason: "name must be provided".into(),
        })?;

        Ok(Capability {
            namespace: self.namespace,
            name,
            description: self.description,
            inputs: self.inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldType;
    use serde_json::json;

    fn namespace() -> Namespace {
        Namespace::new("holistic-wellness").expect("namespace")
    }

    #[test]
    fn build_capability_success() {
        let capability = Capability::builder(namespace())
            .name("suggest_meal_plan")
            .and_then(|b| b.description("Three-day meal plan"))
            .map(|b| b.inputs(InputShape::new().field("dietScore", FieldType::Number)))
            .and_then(CapabilityBuilder::build)
            .expect("build");

        assert_eq!(capability.name().as_str(), "suggest_meal_plan");
        assert_eq!(capability.inputs().len(), 1);
        assert_eq!(
            capability.reference().to_string(),
            "holistic-wellness.suggest_meal_plan"
        );
    }

    #[test]
    fn capability_requires_name() {
        let err = Capability::builder(namespace())
            .build()
            .expect_err("should fail");

        assert!(matches!(err, Error::InvalidCapability { .. }));
    }

    #[test]
    fn blank_description_is_rejected() {
        let err = Capability::builder(namespace())
            .description("   ")
            .expect_err("blank description");
        assert!(matches!(err, Error::InvalidCapability { .. }));
    }

    #[test]
    fn serializes_with_catalog_keys() {
        let capability = Capability::builder(namespace())
            .name("chat_agents")
            .map(|b| b.inputs(InputShape::message()))
            .and_then(CapabilityBuilder::build)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&capability).unwrap(),
            json!({
                "agentName": "holistic-wellness",
                "toolName": "chat_agents",
                "inputs": { "message": "string" }
            })
        );
    }
}
