//! Infrastructure layer for the print client.
//!
//! Contains the adapters that touch the outside world: the TCP agent probe,
//! the HTTP signing-backend client, the WebSocket agent transport, and TOML
//! config loading.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `qzprint_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod config_file;
pub mod credentials;
pub mod probe;
pub mod ws_transport;

use std::sync::Arc;

use anyhow::Context;

use crate::application::PrintService;
use crate::domain::ClientConfig;

use credentials::HttpCredentialProvider;
use probe::TcpAgentProbe;
use ws_transport::WsAgentTransport;

/// Wires a [`PrintService`] with the production adapters.
///
/// # Errors
///
/// Fails only if the HTTP client for the signing backend cannot be built.
pub fn build_service(config: &ClientConfig) -> anyhow::Result<PrintService> {
    let credentials = HttpCredentialProvider::new(config.backend_base(), config.request_timeout())
        .context("failed to build HTTP client for the signing backend")?;

    Ok(PrintService::new(
        config,
        Arc::new(TcpAgentProbe::from_config(config)),
        Arc::new(credentials),
        Arc::new(WsAgentTransport::from_config(config)),
    ))
}
