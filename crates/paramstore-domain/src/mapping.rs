//! Explicit bindings between struct fields and parameter names.
//!
//! A [`ParameterMapping`] is a table of `field path -> parameter name` under a
//! common prefix. Field paths are dot-separated (`database.host`) and address
//! the serde representation of the target type, so any `Serialize` /
//! `Deserialize` type can be bound without per-type code in the engine.
//!
//! ```ignore
//! let mapping = ParameterMapping::new("/myapp")
//!     .bind("database.host", "/db/host")
//!     .bind_secure("database.password", "/db/password");
//!
//! let config: AppConfig = mapping.from_parameters(&fetched)?;
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::BatchError;
use crate::model::{Parameter, ParameterType};

/// Errors converting between a struct and its parameters.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Fetching or writing the mapped parameters failed.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// A mapped field is absent from the serialized value.
    #[error("field {field} is not present")]
    MissingField { field: String },

    /// A mapped field is not a string.
    #[error("field {field} must be a string")]
    NotAString { field: String },

    /// A mapped parameter was not among the fetched parameters.
    #[error("parameter {name} bound to {field} was not fetched")]
    MissingParameter { field: String, name: String },

    /// Two bindings address conflicting field paths.
    #[error("field path {field} conflicts with another binding")]
    ConflictingField { field: String },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One row of a mapping table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    /// Dot-separated path into the serialized struct.
    pub field: String,
    /// Parameter name relative to the mapping prefix.
    pub name: String,
    pub parameter_type: ParameterType,
}

/// A table of field bindings sharing a name prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMapping {
    prefix: String,
    bindings: Vec<FieldBinding>,
}

impl ParameterMapping {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            bindings: Vec::new(),
        }
    }

    /// Binds a field to a plain `String` parameter.
    pub fn bind(self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.bind_as(field, name, ParameterType::String)
    }

    /// Binds a field to a `SecureString` parameter.
    pub fn bind_secure(self, field: impl Into<String>, name: impl Into<String>) -> Self {
        self.bind_as(field, name, ParameterType::SecureString)
    }

    pub fn bind_as(
        mut self,
        field: impl Into<String>,
        name: impl Into<String>,
        parameter_type: ParameterType,
    ) -> Self {
        self.bindings.push(FieldBinding {
            field: field.into(),
            name: name.into(),
            parameter_type,
        });
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    /// Fully qualified parameter name of a binding.
    pub fn full_name(&self, binding: &FieldBinding) -> String {
        format!("{}{}", self.prefix, binding.name)
    }

    /// Fully qualified names of every binding, in table order.
    pub fn names(&self) -> Vec<String> {
        self.bindings.iter().map(|b| self.full_name(b)).collect()
    }

    /// Builds a value of `T` from fetched parameters.
    pub fn from_parameters<T: DeserializeOwned>(
        &self,
        parameters: &[Parameter],
    ) -> Result<T, MappingError> {
        let by_name: HashMap<&str, &str> = parameters
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();

        let mut root = Value::Object(Map::new());
        for binding in &self.bindings {
            let name = self.full_name(binding);
            let value = by_name
                .get(name.as_str())
                .ok_or_else(|| MappingError::MissingParameter {
                    field: binding.field.clone(),
                    name: name.clone(),
                })?;
            insert_path(&mut root, &binding.field, Value::String(value.to_string()))?;
        }

        Ok(serde_json::from_value(root)?)
    }

    /// Serializes `value` into one parameter per binding, all marked for
    /// overwrite. Bindings whose field is `null` are skipped.
    pub fn to_parameters<T: Serialize>(&self, value: &T) -> Result<Vec<Parameter>, MappingError> {
        let root = serde_json::to_value(value)?;

        let mut parameters = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let field = lookup_path(&root, &binding.field).ok_or_else(|| {
                MappingError::MissingField {
                    field: binding.field.clone(),
                }
            })?;
            match field {
                Value::Null => continue,
                Value::String(s) => parameters.push(
                    Parameter::new(self.full_name(binding), s.clone())
                        .with_type(binding.parameter_type)
                        .with_overwrite(true),
                ),
                _ => {
                    return Err(MappingError::NotAString {
                        field: binding.field.clone(),
                    })
                }
            }
        }
        Ok(parameters)
    }
}

fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| node.get(segment))
}

fn insert_path(root: &mut Value, path: &str, value: Value) -> Result<(), MappingError> {
    let conflict = || MappingError::ConflictingField {
        field: path.to_string(),
    };

    let mut segments = path.split('.').peekable();
    let mut node = root;
    while let Some(segment) = segments.next() {
        let object = node.as_object_mut().ok_or_else(conflict)?;
        if segments.peek().is_none() {
            if object.contains_key(segment) {
                return Err(conflict());
            }
            object.insert(segment.to_string(), value);
            return Ok(());
        }
        node = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Ok(())
}
