//! qzprint-client library crate.
//!
//! Sends rendered documents to a print agent running on the same machine,
//! over a WebSocket the agent only opens to clients with a signed certificate.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Host application (button handler, receipt screen, CLI)
//!         ↓
//! [qzprint-client]
//!   ├── domain/           ClientConfig
//!   ├── application/      PrintService and the workflow behind it:
//!   │                     locate → secure → connect → resolve printer → print
//!   └── infrastructure/
//!         ├── probe/        TCP reachability check on the agent ports
//!         ├── credentials/  certificate + signature from the trusted backend
//!         ├── ws_transport/ signed WebSocket channel (tokio-tungstenite)
//!         └── config_file/  TOML config loading
//!         ↓
//! Print agent (JSON over WebSocket, ports 8182/8283/8384/8485)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` depends on `domain` and `qzprint-core`; it reaches the
//!   network only through the traits it defines.
//! - `infrastructure` implements those traits with `tokio`, `reqwest` and
//!   `tokio-tungstenite`.
//!
//! # Quick start
//!
//! ```no_run
//! use qzprint_client::domain::ClientConfig;
//! use qzprint_client::infrastructure::build_service;
//! use qzprint_core::{PrintKind, PrintOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = build_service(&ClientConfig::default())?;
//! service
//!     .print_to_default("<h1>Receipt</h1>", PrintKind::Pixel, &PrintOptions::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: connection lifecycle, printer resolution, dispatch.
pub mod application;

/// Infrastructure layer: TCP probe, HTTP signing client, WebSocket transport.
pub mod infrastructure;
