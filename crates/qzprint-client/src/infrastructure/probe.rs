//! TCP reachability probe for the print agent.
//!
//! The agent binds the first free port of a fixed list, so a probe walks the
//! configured ports in order and reports the first one that accepts a TCP
//! connection.  The connection is dropped immediately; the WebSocket
//! handshake happens later in the transport.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::application::locator::{AgentHandle, AgentProbe};
use crate::domain::ClientConfig;

pub struct TcpAgentProbe {
    host: String,
    ports: Vec<u16>,
    connect_timeout: Duration,
}

impl TcpAgentProbe {
    pub fn new(host: impl Into<String>, ports: Vec<u16>, connect_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            ports,
            connect_timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.agent_host.clone(),
            config.agent_ports.clone(),
            config.probe_timeout(),
        )
    }
}

#[async_trait]
impl AgentProbe for TcpAgentProbe {
    async fn probe(&self) -> Option<AgentHandle> {
        for &port in &self.ports {
            match timeout(
                self.connect_timeout,
                TcpStream::connect((self.host.as_str(), port)),
            )
            .await
            {
                Ok(Ok(_stream)) => return Some(AgentHandle::new(self.host.clone(), port)),
                Ok(Err(e)) => debug!(port, "agent probe failed: {e}"),
                Err(_) => debug!(port, "agent probe timed out"),
            }
        }
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
