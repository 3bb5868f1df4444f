//! Batch engine for multi-parameter operations.
//!
//! Requests of any size are split into windows no larger than the service's
//! per-call limit. Each window is one remote call; the results of every
//! window are merged and every failure is kept:
//!
//! 1. **Chunking**: [`windows`] partitions `[0, len)` into contiguous ranges
//! 2. **Execution**: [`BatchExecutor`] issues one call per window (or per item
//!    for writes) and continues past failures
//! 3. **Aggregation**: failures land in a [`BatchError`](crate::BatchError)
//!
//! Execution is strictly sequential. Cancellation through [`CallContext`]
//! interrupts the in-flight call and stops before the next window.

mod chunk;
mod context;
mod executor;

pub use chunk::{chunks, windows, BatchSize, Windows, MAX_BATCH_SIZE};
pub use context::CallContext;
pub use executor::BatchExecutor;

#[cfg(test)]
mod tests;
