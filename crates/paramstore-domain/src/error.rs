//! Per-item and aggregate error types for batched operations.
//!
//! A multi-item operation never stops at the first failure. Every failure is
//! folded into a [`BatchError`] in the order it was discovered: window order,
//! and within a window the call error before any invalid names.

use std::fmt;

use paramstore_storage::StorageError;
use thiserror::Error;

/// Discriminator for [`ParameterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A remote call failed.
    Transport,
    /// The store answered, but could not resolve a name.
    InvalidItem,
    /// An option value was rejected.
    Config,
}

/// A single failure inside a batched operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A remote call for a window (or a single write) failed.
    #[error("{source}")]
    Transport {
        /// Names covered by the failed call.
        names: Vec<String>,
        #[source]
        source: StorageError,
    },

    /// The store reported this name as unresolvable.
    #[error("{name:?} is an invalid parameter")]
    InvalidParameter { name: String },

    /// Invalid configuration value.
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl ParameterError {
    pub fn transport(names: &[String], source: StorageError) -> Self {
        ParameterError::Transport {
            names: names.to_vec(),
            source,
        }
    }

    pub fn invalid(name: impl Into<String>) -> Self {
        ParameterError::InvalidParameter { name: name.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ParameterError::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParameterError::Transport { .. } => ErrorKind::Transport,
            ParameterError::InvalidParameter { .. } => ErrorKind::InvalidItem,
            ParameterError::Config { .. } => ErrorKind::Config,
        }
    }

    /// Names this error is attributed to.
    pub fn names(&self) -> &[String] {
        match self {
            ParameterError::Transport { names, .. } => names,
            ParameterError::InvalidParameter { name } => std::slice::from_ref(name),
            ParameterError::Config { .. } => &[],
        }
    }

    /// Returns true if the caller cancelled the call or its deadline passed.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ParameterError::Transport { source, .. } if source.is_interrupted())
    }
}

/// Aggregate of every failure in a batched operation.
///
/// Appending never replaces earlier entries. An empty aggregate means the
/// operation fully succeeded; [`BatchError::into_result`] turns it into `Ok`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", render(.errors))]
pub struct BatchError {
    errors: Vec<ParameterError>,
}

fn render(errors: &[ParameterError]) -> String {
    struct Listing<'a>(&'a [ParameterError]);

    impl fmt::Display for Listing<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.0.len() == 1 {
                return write!(f, "1 error occurred: {}", self.0[0]);
            }
            write!(f, "{} errors occurred:", self.0.len())?;
            for err in self.0 {
                write!(f, "\n\t* {err}")?;
            }
            Ok(())
        }
    }

    Listing(errors).to_string()
}

impl BatchError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ParameterError) {
        self.errors.push(error);
    }

    /// Folds in one invalid-parameter error per name, in order.
    pub fn extend_invalid<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.errors
            .extend(names.into_iter().map(|name| ParameterError::invalid(name)));
    }

    /// Moves every entry of `other` to the end of this aggregate.
    pub fn append(&mut self, mut other: BatchError) {
        self.errors.append(&mut other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[ParameterError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParameterError> {
        self.errors
    }

    /// Number of entries of the given kind.
    pub fn count_of(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind() == kind).count()
    }

    /// Names reported invalid, in discovery order.
    pub fn invalid_names(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().filter_map(|e| match e {
            ParameterError::InvalidParameter { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Returns true if an entry records caller cancellation.
    pub fn is_interrupted(&self) -> bool {
        self.errors.iter().any(ParameterError::is_interrupted)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), BatchError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ParameterError> for BatchError {
    fn from(error: ParameterError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<ParameterError> for BatchError {
    fn from_iter<T: IntoIterator<Item = ParameterError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for BatchError {
    type Item = ParameterError;
    type IntoIter = std::vec::IntoIter<ParameterError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a BatchError {
    type Item = &'a ParameterError;
    type IntoIter = std::slice::Iter<'a, ParameterError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Items produced by a batched operation plus everything that went wrong.
///
/// Partial success is normal: `items` holds what succeeded even when
/// `errors` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub errors: BatchError,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            errors: BatchError::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The aggregate error, if anything failed.
    pub fn error(&self) -> Option<&BatchError> {
        (!self.errors.is_empty()).then_some(&self.errors)
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Splits into the items and the aggregate error, if any.
    pub fn into_parts(self) -> (Vec<T>, Option<BatchError>) {
        let error = (!self.errors.is_empty()).then_some(self.errors);
        (self.items, error)
    }

    /// Discards partial items when anything failed.
    pub fn into_result(self) -> Result<Vec<T>, BatchError> {
        match self.into_parts() {
            (items, None) => Ok(items),
            (_, Some(errors)) => Err(errors),
        }
    }
}
