//! Domain layer for qzprint-client.
//!
//! Holds the runtime configuration struct.  Job, envelope, and error types
//! live in `qzprint-core` because the test doubles and the binary share them.
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, `WebSocket`, or HTTP client types
//! - File I/O or environment variable reading

pub mod config;

pub use config::ClientConfig;
