//! paramstore-domain: Batched parameter operation engine
//!
//! This crate contains the logic that turns arbitrary-size parameter requests
//! into service-sized remote calls:
//! - Parameter model
//! - Chunker and batch executor for fetch, write and delete
//! - Error aggregation across windows
//! - Path globbing and explicit struct-to-parameter mapping
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              paramstore-domain               │
//! ├─────────────────────────────────────────────┤
//! │  model.rs   - Parameter value object        │
//! │  batch/     - Chunker, executor, context    │
//! │  error.rs   - Per-item and aggregate errors │
//! │  pattern.rs - Name globbing                 │
//! │  mapping.rs - Field path to name bindings   │
//! └─────────────────────────────────────────────┘
//! ```

pub mod batch;
pub mod error;
pub mod mapping;
pub mod model;
pub mod pattern;

// Re-export commonly used types at the crate root
pub use batch::{BatchExecutor, BatchSize, CallContext, MAX_BATCH_SIZE};
pub use error::{BatchError, BatchOutcome, ErrorKind, ParameterError};
pub use mapping::{FieldBinding, MappingError, ParameterMapping};
pub use model::{parameter_names, Parameter, ParameterType};
pub use pattern::{PathPattern, PatternError};
