//! Declared input shapes for capabilities.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Primitive type name declared for a single input field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A nested JSON object.
    Object,
    /// A JSON array.
    Array,
}

impl FieldType {
    /// Returns the lowercase wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Returns `true` when the JSON value is an instance of this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "integer" => Ok(Self::Integer),
            "boolean" => Ok(Self::Boolean),
            "object" => Ok(Self::Object),
            "array" => Ok(Self::Array),
            other => Err(Error::UnknownFieldType(other.to_owned())),
        }
    }
}

/// Mapping from field name to declared type.
///
/// Two shapes are equal only when they declare exactly the same field names with
/// exactly the same types; there is no subset or superset compatibility.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputShape(BTreeMap<String, FieldType>);

impl InputShape {
    /// Creates an empty shape (a capability that takes no arguments).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The fan-out contract: a single `message` field of type string.
    #[must_use]
    pub fn message() -> Self {
        Self::new().field("message", FieldType::String)
    }

    /// Adds or replaces a field declaration.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.0.insert(name.into(), ty);
        self
    }

    /// Returns the declared type of `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.0.get(name).copied()
    }

    /// Iterates over the declared fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that `arguments` is an object whose present fields are all
    /// declared and carry values of the declared type. Missing fields are
    /// allowed; capabilities apply their own defaults.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first mismatch.
    pub fn conforms(&self, arguments: &Value) -> Result<(), String> {
        let object = match arguments {
            Value::Object(object) => object,
            Value::Null if self.is_empty() => return Ok(()),
            other => return Err(format!("expected an object, got {}", json_kind(other))),
        };

        for (name, value) in object {
            let Some(ty) = self.get(name) else {
                return Err(format!("unexpected field `{name}`"));
            };
            if !value.is_null() && !ty.accepts(value) {
                return Err(format!(
                    "field `{name}` expected {ty}, got {}",
                    json_kind(value)
                ));
            }
        }

        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, FieldType)> for InputShape {
    fn from_iter<I: IntoIterator<Item = (K, FieldType)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, ty)| (k.into(), ty)).collect())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn equality_is_exact() {
        let message = InputShape::message();
        assert_eq!(message, InputShape::new().field("message", FieldType::String));

        let superset = InputShape::message().field("extra", FieldType::Number);
        assert_ne!(message, superset);

        let retyped = InputShape::new().field("message", FieldType::Number);
        assert_ne!(message, retyped);

        assert_ne!(message, InputShape::new());
    }

    #[test]
    fn serializes_as_plain_object() {
        let shape = InputShape::message();
        assert_eq!(serde_json::to_value(&shape).unwrap(), json!({ "message": "string" }));

        let parsed: InputShape =
            serde_json::from_value(json!({ "message": "string", "extra": "number" })).unwrap();
        assert_eq!(parsed, InputShape::message().field("extra", FieldType::Number));
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        assert!(serde_json::from_value::<InputShape>(json!({ "a": "float" })).is_err());
        assert_eq!(
            "float".parse::<FieldType>().unwrap_err(),
            Error::UnknownFieldType("float".into())
        );
    }

    #[test]
    fn conforms_reports_mismatches() {
        let shape = InputShape::new()
            .field("dietScore", FieldType::Number)
            .field("stressLevel", FieldType::Integer);

        assert!(shape.conforms(&json!({ "dietScore": 0.4 })).is_ok());
        assert!(shape.conforms(&json!({})).is_ok());

        let err = shape.conforms(&json!({ "dietScore": "high" })).unwrap_err();
        assert!(err.contains("dietScore"));

        let err = shape.conforms(&json!({ "stressLevel": 2.5 })).unwrap_err();
        assert!(err.contains("integer"));

        let err = shape.conforms(&json!({ "other": 1 })).unwrap_err();
        assert!(err.contains("unexpected"));

        assert!(shape.conforms(&json!("bare")).is_err());
        assert!(InputShape::new().conforms(&Value::Null).is_ok());
    }
}
