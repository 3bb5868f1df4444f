//! In-memory storage implementation for testing and local use.
//!
//! Mirrors the service's observable behavior closely enough for the batch
//! engine: per-call name limits, in-band invalid names, overwrite checks and
//! paginated path queries.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::instrument;

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    validate_batch, validate_name, DeleteResult, FetchResult, ParameterStore, ParameterType,
    PathPage, PathQuery, StoredParameter, WriteRequest,
};

/// Value returned for a `SecureString` fetched without decryption.
pub const ENCRYPTED_PLACEHOLDER: &str = "<encrypted>";

/// Page size for path queries, matching the service maximum.
const PATH_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
struct StoredEntry {
    parameter: StoredParameter,
    key_id: Option<String>,
    version: u64,
}

/// In-memory implementation of ParameterStore.
///
/// Uses DashMap for thread-safe concurrent access. Path queries sort by name
/// so pagination is stable.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    entries: DashMap<String, StoredEntry>,
}

impl MemoryParameterStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Creates a store seeded with the given parameters.
    pub fn with_parameters(parameters: impl IntoIterator<Item = StoredParameter>) -> Self {
        let store = Self::new();
        for parameter in parameters {
            store.insert(parameter);
        }
        store
    }

    /// Inserts or replaces a parameter directly, bypassing write checks.
    ///
    /// Allows seeding entries the service API would not produce, such as a
    /// parameter with an absent value.
    pub fn insert(&self, parameter: StoredParameter) {
        let name = parameter.name.clone();
        match self.entries.entry(name) {
            Entry::Occupied(mut entry) => {
                let entry = entry.get_mut();
                entry.parameter = parameter;
                entry.version += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredEntry {
                    parameter,
                    key_id: None,
                    version: 1,
                });
            }
        }
    }

    /// Number of stored parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if a parameter with this name is stored.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Version of a stored parameter; starts at 1 and increments per write.
    pub fn version_of(&self, name: &str) -> Option<u64> {
        self.entries.get(name).map(|e| e.version)
    }

    /// KMS key id recorded by the last write of a parameter.
    pub fn key_id_of(&self, name: &str) -> Option<String> {
        self.entries.get(name).and_then(|e| e.key_id.clone())
    }

    fn present(entry: &StoredEntry, with_decryption: bool) -> StoredParameter {
        let mut parameter = entry.parameter.clone();
        if parameter.parameter_type == ParameterType::SecureString && !with_decryption {
            parameter.value = Some(ENCRYPTED_PLACEHOLDER.to_string());
        }
        parameter
    }
}

fn parse_next_token(token: &Option<String>) -> StorageResult<usize> {
    match token {
        None => Ok(0),
        Some(t) => t.parse::<usize>().map_err(|_| StorageError::InvalidInput {
            message: format!("invalid next token: {t}"),
        }),
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    #[instrument(skip(self), fields(count = names.len()))]
    async fn fetch_by_names(
        &self,
        names: &[String],
        with_decryption: bool,
    ) -> StorageResult<FetchResult> {
        validate_batch(names)?;

        let mut result = FetchResult::default();
        for name in names {
            match self.entries.get(name) {
                Some(entry) => result
                    .parameters
                    .push(Self::present(entry.value(), with_decryption)),
                None => result.invalid_names.push(name.clone()),
            }
        }
        Ok(result)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn write_one(&self, request: &WriteRequest) -> StorageResult<()> {
        validate_name(&request.name)?;

        let parameter = StoredParameter::new(
            request.name.clone(),
            request.value.clone(),
            request.parameter_type,
        );

        // Entry API keeps the existence check and the write atomic
        match self.entries.entry(request.name.clone()) {
            Entry::Occupied(mut entry) => {
                if !request.overwrite {
                    return Err(StorageError::ParameterAlreadyExists {
                        name: request.name.clone(),
                    });
                }
                let entry = entry.get_mut();
                entry.parameter = parameter;
                entry.key_id = request.key_id.clone();
                entry.version += 1;
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredEntry {
                    parameter,
                    key_id: request.key_id.clone(),
                    version: 1,
                });
            }
        }
        Ok(())
    }

    #[instrument(skip(self), fields(count = names.len()))]
    async fn delete_by_names(&self, names: &[String]) -> StorageResult<DeleteResult> {
        validate_batch(names)?;

        let mut result = DeleteResult::default();
        for name in names {
            if self.entries.remove(name).is_some() {
                result.deleted_names.push(name.clone());
            } else {
                result.invalid_names.push(name.clone());
            }
        }
        Ok(result)
    }

    #[instrument(skip(self, query), fields(path = %query.path, recursive = query.recursive))]
    async fn fetch_by_path(&self, query: &PathQuery) -> StorageResult<PathPage> {
        if !query.path.starts_with('/') {
            return Err(StorageError::InvalidInput {
                message: format!("path must start with '/': {:?}", query.path),
            });
        }
        let prefix = if query.path.ends_with('/') {
            query.path.clone()
        } else {
            format!("{}/", query.path)
        };

        let mut matched: Vec<StoredParameter> = self
            .entries
            .iter()
            .filter(|e| {
                let name = e.key();
                match name.strip_prefix(&prefix) {
                    Some(rest) if !rest.is_empty() => query.recursive || !rest.contains('/'),
                    _ => false,
                }
            })
            .map(|e| Self::present(e.value(), query.with_decryption))
            .collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));

        let offset = parse_next_token(&query.next_token)?;
        let parameters: Vec<StoredParameter> = matched
            .iter()
            .skip(offset)
            .take(PATH_PAGE_SIZE)
            .cloned()
            .collect();

        let next_offset = offset + parameters.len();
        let next_token = if next_offset < matched.len() {
            Some(next_offset.to_string())
        } else {
            None
        };

        Ok(PathPage {
            parameters,
            next_token,
        })
    }
}
