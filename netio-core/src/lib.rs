//! NETIO Core Library
//!
//! Shared types, wire-protocol models, and error taxonomy for NETIO
//! networked power sockets. This crate is used by the `netioctl` CLI and
//! is usable on its own by programs embedding the client.

pub mod api;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::*;
pub use types::*;
