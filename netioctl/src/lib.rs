//! NETIO CLI Library
//!
//! This library provides the core functionality for the `netioctl` tool.
//!
//! # Public API
//!
//! The primary public API is the [`client::NetioClient`] which provides
//! programmatic access to a NETIO power socket device. Configuration
//! resolution is available via [`config::ResolvedConfig`].
//!
//! ```no_run
//! use netioctl::client::NetioClient;
//! use netioctl::config::ResolvedConfig;
//! use netio_core::Action;
//!
//! # fn example() -> netio_core::Result<()> {
//! let config = ResolvedConfig::builder("http://netio.local/netio.json")?
//!     .credentials("admin", "secret")
//!     .build()?;
//!
//! let client = NetioClient::new(&config)?;
//! let _outputs = client.get_outputs()?;
//! client.set_output(1, Action::Toggle)?;
//! # Ok(())
//! # }
//! ```

// Internal CLI implementation - not part of public API
#[doc(hidden)]
pub mod cli;

/// HTTP client speaking the NETIO M2M JSON protocol.
pub mod client;

/// Layered parameter resolution and configuration types.
pub mod config;

// Internal formatting functions - not part of public API
#[doc(hidden)]
pub mod format;
