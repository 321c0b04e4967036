//! Identifier types for namespaces, capabilities, and invocations.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

const MAX_ID_LEN: usize = 64;

/// Logical owner of a group of capabilities (an "agent" on the wire).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

/// Name of a single capability within its namespace.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityName(String);

macro_rules! identifier {
    ($ty:ident) => {
        impl $ty {
            /// Creates a new identifier after validating its format.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidIdentifier`] if the supplied value is empty,
            /// too long, or contains unsupported characters.
            pub fn new(id: impl Into<String>) -> Result<Self> {
                let id = id.into();
                validate_identifier(&id)?;
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl PartialEq<str> for $ty {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

identifier!(Namespace);
identifier!(CapabilityName);

fn validate_identifier(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidIdentifier {
            id: String::new(),
            reason: "identifier cannot be empty".into(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(Error::InvalidIdentifier {
            id: id.into(),
            reason: format!("identifier length must be <= {MAX_ID_LEN}"),
        });
    }

    // `.` is reserved as the separator in qualified references.
    if !id
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_'))
    {
        return Err(Error::InvalidIdentifier {
            id: id.into(),
            reason: "identifier must contain lowercase alphanumeric, dash, or underscore".into(),
        });
    }

    Ok(())
}

/// Fully qualified `namespace.name` reference to a capability.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityRef {
    namespace: Namespace,
    name: CapabilityName,
}

impl CapabilityRef {
    /// Creates a reference from its parts.
    #[must_use]
    pub const fn new(namespace: Namespace, name: CapabilityName) -> Self {
        Self { namespace, name }
    }

    /// Returns the owning namespace.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Returns the capability name.
    #[must_use]
    pub const fn name(&self) -> &CapabilityName {
        &self.name
    }
}

impl Display for CapabilityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for CapabilityRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidReference {
            reference: s.to_owned(),
        };
        let (namespace, name) = s.split_once('.').ok_or_else(invalid)?;
        let namespace = Namespace::new(namespace).map_err(|_| invalid())?;
        let name = CapabilityName::new(name).map_err(|_| invalid())?;
        Ok(Self::new(namespace, name))
    }
}

impl TryFrom<String> for CapabilityRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CapabilityRef> for String {
    fn from(value: CapabilityRef) -> Self {
        value.to_string()
    }
}

/// Correlation identifier attached to each dispatch for tracing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a random invocation identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::random()
    }
}

impl Display for InvocationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_reject_bad_input() {
        assert!(Namespace::new("holistic-wellness").is_ok());
        assert!(CapabilityName::new("process_datastream").is_ok());

        for bad in ["", "Upper", "with space", "dotted.name"] {
            let err = Namespace::new(bad).expect_err("should reject");
            assert!(matches!(err, Error::InvalidIdentifier { .. }), "{bad}");
        }

        let long = "a".repeat(MAX_ID_LEN + 1);
        assert!(CapabilityName::new(long).is_err());
    }

    #[test]
    fn reference_parses_qualified_name() {
        let reference: CapabilityRef = "holistic-wellness.process_datastream".parse().unwrap();
        assert_eq!(reference.namespace().as_str(), "holistic-wellness");
        assert_eq!(reference.name().as_str(), "process_datastream");
        assert_eq!(reference.to_string(), "holistic-wellness.process_datastream");
    }

    #[test]
    fn reference_without_separator_is_invalid() {
        let err = "process_datastream".parse::<CapabilityRef>().unwrap_err();
        assert_eq!(
            err,
            Error::InvalidReference {
                reference: "process_datastream".into()
            }
        );
    }

    #[test]
    fn namespace_deserialization_validates() {
        let ok: Namespace = serde_json::from_str("\"weather\"").unwrap();
        assert_eq!(ok.as_str(), "weather");
        assert!(serde_json::from_str::<Namespace>("\"Bad Name\"").is_err());
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::random(), InvocationId::random());
    }
}
