//! Client configuration.
//!
//! [`ClientConfig`] is the single source of truth for all runtime settings.
//! It can be read from a TOML file (see `infrastructure::config_file`),
//! overridden by CLI flags, or built from defaults in tests.
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "...")]`, so a config file only
//! needs the keys it wants to change:
//!
//! ```toml
//! backend_url = "https://pos.example.com"
//! agent_ports = [8182]
//! ```

use std::time::Duration;

use qzprint_core::SignAlgorithm;
use serde::{Deserialize, Serialize};

/// All runtime configuration for the print client.
///
/// # Example
///
/// ```rust
/// use qzprint_client::domain::ClientConfig;
///
/// let cfg = ClientConfig::default();
/// assert_eq!(cfg.agent_ports[0], 8182);
/// assert_eq!(cfg.locate_timeout().as_millis(), 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host the print agent listens on.  The agent is local, so this is
    /// almost always `localhost`.
    #[serde(default = "default_agent_host")]
    pub agent_host: String,

    /// WebSocket ports to probe, in order.  The agent binds the first free
    /// port of its list, so a client has to try all of them.
    #[serde(default = "default_agent_ports")]
    pub agent_ports: Vec<u16>,

    /// Base URL of the trusted backend serving `/qz/certificate` and `/qz/sign`.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// How long the locator waits for the agent before reporting it unavailable.
    #[serde(default = "default_locate_timeout_ms")]
    pub locate_timeout_ms: u64,

    /// Delay between two locator probes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// TCP connect timeout for a single port probe.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Maximum wait for the agent's reply to one call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Algorithm the backend signs with, announced to the agent.
    #[serde(default)]
    pub sign_algorithm: SignAlgorithm,
}

fn default_agent_host() -> String {
    "localhost".to_string()
}
fn default_agent_ports() -> Vec<u16> {
    vec![8182, 8283, 8384, 8485]
}
fn default_backend_url() -> String {
    "http://localhost:8069".to_string()
}
fn default_locate_timeout_ms() -> u64 {
    5000
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_probe_timeout_ms() -> u64 {
    250
}
fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            agent_host: default_agent_host(),
            agent_ports: default_agent_ports(),
            backend_url: default_backend_url(),
            locate_timeout_ms: default_locate_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            sign_algorithm: SignAlgorithm::default(),
        }
    }
}

impl ClientConfig {
    pub fn locate_timeout(&self) -> Duration {
        Duration::from_millis(self.locate_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the backend URL without a trailing slash, so endpoint paths can
    /// be appended directly.
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
