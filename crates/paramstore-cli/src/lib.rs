//! paramstore-cli: Command line front end
//!
//! The `paramstore` binary loads a [`ClientConfig`](paramstore_client::ClientConfig),
//! opens the configured backend and runs one subcommand against it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               paramstore-cli                 │
//! ├─────────────────────────────────────────────┤
//! │  main.rs        - Argument parsing, startup │
//! │  commands.rs    - Subcommand execution      │
//! │  observability/ - Logging setup             │
//! └─────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod observability;

pub use commands::{run, Command};
