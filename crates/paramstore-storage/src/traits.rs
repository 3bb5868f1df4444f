//! ParameterStore trait definition.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

/// Maximum number of names accepted by a single fetch or delete call.
/// The backing service rejects larger requests.
pub const MAX_NAMES_PER_CALL: usize = 10;

/// Maximum length of a fully qualified parameter name.
const MAX_NAME_LENGTH: usize = 2048;

/// Type tag of a stored parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    /// Plain text value.
    #[default]
    String,
    /// Comma-separated list of values.
    StringList,
    /// Value encrypted at rest with a KMS key.
    SecureString,
}

impl ParameterType {
    /// Returns the service's name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "String",
            ParameterType::StringList => "StringList",
            ParameterType::SecureString => "SecureString",
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParameterType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(ParameterType::String),
            "StringList" => Ok(ParameterType::StringList),
            "SecureString" => Ok(ParameterType::SecureString),
            other => Err(StorageError::InvalidInput {
                message: format!("unknown parameter type: {other}"),
            }),
        }
    }
}

/// A parameter as returned by the store.
///
/// `value` is optional because the wire representation may omit it; callers
/// above this layer treat an absent value as the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub name: String,
    pub value: Option<String>,
    pub parameter_type: ParameterType,
}

impl StoredParameter {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        parameter_type: ParameterType,
    ) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            parameter_type,
        }
    }
}

/// Response of a fetch-by-names call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    /// Resolved parameters, in the order the store returned them.
    pub parameters: Vec<StoredParameter>,
    /// Requested names the store could not resolve.
    pub invalid_names: Vec<String>,
}

/// Response of a delete-by-names call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteResult {
    pub deleted_names: Vec<String>,
    pub invalid_names: Vec<String>,
}

/// A single-parameter write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub name: String,
    pub value: String,
    pub parameter_type: ParameterType,
    pub overwrite: bool,
    /// KMS key for encryption; `None` uses the store default.
    pub key_id: Option<String>,
}

/// Query for all parameters below a hierarchy path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathQuery {
    pub path: String,
    pub recursive: bool,
    pub with_decryption: bool,
    /// Continuation token from the previous page.
    pub next_token: Option<String>,
}

/// One page of a path query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPage {
    pub parameters: Vec<StoredParameter>,
    /// Present when more pages remain.
    pub next_token: Option<String>,
}

/// Abstract interface to the remote parameter service.
///
/// Implementations must be thread-safe (Send + Sync). Names the store cannot
/// resolve are reported in-band, not as errors.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetches up to [`MAX_NAMES_PER_CALL`] parameters by name.
    async fn fetch_by_names(
        &self,
        names: &[String],
        with_decryption: bool,
    ) -> StorageResult<FetchResult>;

    /// Writes exactly one parameter.
    async fn write_one(&self, request: &WriteRequest) -> StorageResult<()>;

    /// Deletes up to [`MAX_NAMES_PER_CALL`] parameters by name.
    async fn delete_by_names(&self, names: &[String]) -> StorageResult<DeleteResult>;

    /// Fetches one page of parameters below a path.
    async fn fetch_by_path(&self, query: &PathQuery) -> StorageResult<PathPage>;
}

/// Validates a parameter name.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidInput {
            message: "parameter name cannot be empty".to_string(),
        });
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(StorageError::InvalidInput {
            message: format!("parameter name exceeds {MAX_NAME_LENGTH} characters"),
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(StorageError::InvalidInput {
            message: format!("parameter name cannot contain whitespace: {name:?}"),
        });
    }
    Ok(())
}

/// Validates the size of a names batch for a single call.
pub(crate) fn validate_batch(names: &[String]) -> StorageResult<()> {
    if names.is_empty() {
        return Err(StorageError::InvalidInput {
            message: "at least one parameter name is required".to_string(),
        });
    }
    if names.len() > MAX_NAMES_PER_CALL {
        return Err(StorageError::InvalidInput {
            message: format!(
                "{} names exceeds the per-call limit of {MAX_NAMES_PER_CALL}",
                names.len()
            ),
        });
    }
    Ok(())
}
