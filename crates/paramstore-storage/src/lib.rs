//! paramstore-storage: Remote parameter store abstraction
//!
//! This crate provides the boundary to the backing parameter service:
//! - `ParameterStore` trait, the port the batch engine drives
//! - In-memory implementation for testing and local use
//! - AWS Systems Manager Parameter Store implementation (feature `ssm`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             paramstore-storage               │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs  - ParameterStore trait & types  │
//! │  error.rs   - Transport/service errors      │
//! │  memory.rs  - In-memory implementation      │
//! │  ssm.rs     - AWS SSM implementation        │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod memory;
#[cfg(feature = "ssm")]
pub mod ssm;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryParameterStore;
#[cfg(feature = "ssm")]
pub use ssm::{SsmConfig, SsmParameterStore};
pub use traits::{
    validate_name, DeleteResult, FetchResult, ParameterStore, ParameterType, PathPage, PathQuery,
    StoredParameter, WriteRequest, MAX_NAMES_PER_CALL,
};
