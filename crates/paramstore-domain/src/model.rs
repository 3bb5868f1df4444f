//! Parameter value object.

use std::fmt;

use paramstore_storage::{StoredParameter, WriteRequest};
use serde::{Deserialize, Serialize};

pub use paramstore_storage::ParameterType;

/// A named, typed string value held in the remote store.
///
/// `name` is the identity. `overwrite` is a write-time intent flag and is
/// never populated by reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    #[serde(default)]
    pub overwrite: bool,
}

impl Parameter {
    /// Creates a plain `String` parameter.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Sets the parameter type.
    pub fn with_type(mut self, parameter_type: ParameterType) -> Self {
        self.parameter_type = parameter_type;
        self
    }

    /// Marks the parameter to replace an existing value on write.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Builds the single-item write for this parameter.
    pub fn to_write_request(&self, key_id: Option<&str>) -> WriteRequest {
        WriteRequest {
            name: self.name.clone(),
            value: self.value.clone(),
            parameter_type: self.parameter_type,
            overwrite: self.overwrite,
            key_id: key_id.map(str::to_string),
        }
    }
}

impl From<StoredParameter> for Parameter {
    /// An absent value is a gap in the wire format, not a missing parameter,
    /// so it becomes the empty string.
    fn from(stored: StoredParameter) -> Self {
        Self {
            name: stored.name,
            value: stored.value.unwrap_or_default(),
            parameter_type: stored.parameter_type,
            overwrite: false,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.parameter_type {
            ParameterType::SecureString => "***",
            _ => self.value.as_str(),
        };
        write!(f, "{}\t{}\t{}", self.name, value, self.parameter_type)
    }
}

/// Names of the given parameters, in order.
pub fn parameter_names(parameters: &[Parameter]) -> Vec<String> {
    parameters.iter().map(|p| p.name.clone()).collect()
}
