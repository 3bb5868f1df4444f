//! paramstore-client: Client facade over the batch engine
//!
//! This crate is the entry point for applications:
//! - `ParameterClient` with get, get_multiple, put and delete
//! - Path listing, globbing and struct mapping helpers
//! - Configuration management
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             paramstore-client                │
//! ├─────────────────────────────────────────────┤
//! │  client.rs  - ParameterClient facade        │
//! │  config.rs  - Configuration management      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;

// Re-exports for convenience
pub use client::{ParameterClient, ParameterClientBuilder};
pub use config::{ClientConfig, ConfigLoadError};
