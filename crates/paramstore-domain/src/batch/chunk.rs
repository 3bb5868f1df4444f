//! Splitting a sequence into service-sized windows.

use std::fmt;
use std::ops::Range;

use crate::error::ParameterError;

/// Maximum names per fetch or delete call imposed by the service.
pub const MAX_BATCH_SIZE: usize = paramstore_storage::MAX_NAMES_PER_CALL;

/// A validated batch size in `1..=MAX_BATCH_SIZE`.
///
/// Validity is checked once, at construction, so chunking itself has no
/// error cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchSize(usize);

impl BatchSize {
    /// Creates a batch size, rejecting values outside `1..=MAX_BATCH_SIZE`.
    pub fn new(size: usize) -> Result<Self, ParameterError> {
        if size == 0 {
            return Err(ParameterError::config("batch size must be greater than 0"));
        }
        if size > MAX_BATCH_SIZE {
            return Err(ParameterError::config(format!(
                "batch size must be less than or equal to {MAX_BATCH_SIZE}, got {size}"
            )));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(MAX_BATCH_SIZE)
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<usize> for BatchSize {
    type Error = ParameterError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

/// Lazy iterator over the windows of a sequence.
#[derive(Debug, Clone)]
pub struct Windows {
    next: usize,
    len: usize,
    size: usize,
}

impl Iterator for Windows {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.len {
            return None;
        }
        let start = self.next;
        let end = start.saturating_add(self.size).min(self.len);
        self.next = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.len - self.next.min(self.len)).div_ceil(self.size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows {}

/// Windows `[0,b), [b,2b), …` covering `[0, len)`; the last is truncated.
/// Yields nothing when `len == 0`.
pub fn windows(len: usize, size: BatchSize) -> Windows {
    Windows {
        next: 0,
        len,
        size: size.get(),
    }
}

/// The sub-slices of `items` for each window.
pub fn chunks<T>(items: &[T], size: BatchSize) -> impl Iterator<Item = &[T]> + '_ {
    windows(items.len(), size).map(move |range| &items[range])
}
