//! ConnectionManager: owns the single logical connection to the print agent.
//!
//! # State machine
//!
//! ```text
//!                 ensure_connected()
//!   Disconnected ───────────────────▶ Connecting ──open ok──▶ Connected
//!        ▲                                │                      │
//!        └──────── locate / sign / open ──┘                      │
//!        │              failed                                   │
//!        └─────────────── liveness check failed ─────────────────┘
//! ```
//!
//! The channel slot's async mutex is held for the whole connect sequence.  A
//! second caller that arrives while a handshake is in flight waits on that
//! lock and then finds the freshly opened channel, so concurrent callers never
//! trigger two handshakes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qzprint_core::{AgentCall, PrintError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::locator::{AgentHandle, AgentLocator};
use crate::application::security::{CredentialProvider, SecurityNegotiator};
use crate::application::state::{ClientState, ConnectionState};

/// Failure of a single call on an open channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The channel was closed before or while waiting for the reply.
    #[error("agent channel closed")]
    Closed,

    /// No reply arrived within the per-call timeout.
    #[error("no reply from agent within {0:?}")]
    TimedOut(Duration),

    /// The agent answered with an error.
    #[error("{0}")]
    Agent(String),

    /// The request could not be serialised.
    #[error("could not encode request: {0}")]
    Encode(String),
}

/// An open, handshaken channel to the agent.
#[async_trait]
pub trait AgentChannel: Send + Sync {
    /// Liveness check.  `false` once the socket closed or the reader stopped.
    fn is_active(&self) -> bool;

    /// Sends one request and waits for the reply with the same uid.
    async fn call(&self, call: AgentCall, params: Value) -> Result<Value, CallError>;

    /// Closes the channel.  Pending calls fail with [`CallError::Closed`].
    async fn close(&self);
}

/// Opens channels.  One transport lives as long as its `PrintService`.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Registers the provider used to authenticate every future handshake.
    fn install_security(&self, credentials: Arc<dyn CredentialProvider>);

    /// Connects to `handle` and performs the signed handshake.
    ///
    /// # Errors
    ///
    /// `CertificateFailed` / `SigningFailed` from the provider, or
    /// `ConnectionRejected` when the socket cannot be opened or the agent
    /// refuses the handshake.
    async fn open(&self, handle: &AgentHandle) -> Result<Arc<dyn AgentChannel>, PrintError>;
}

/// Holds the state at `Connecting` for the length of one attempt.
///
/// Dropping it without [`complete`](Self::complete), on error or because the
/// caller stopped awaiting, puts the state back to `Disconnected`.
struct ConnectingGuard<'a> {
    state: &'a ClientState,
    done: bool,
}

impl<'a> ConnectingGuard<'a> {
    fn enter(state: &'a ClientState) -> Self {
        state.set_connection_state(ConnectionState::Connecting);
        Self { state, done: false }
    }

    fn complete(mut self) {
        self.done = true;
        self.state.set_connection_state(ConnectionState::Connected);
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.state.set_connection_state(ConnectionState::Disconnected);
        }
    }
}

pub struct ConnectionManager {
    locator: AgentLocator,
    negotiator: SecurityNegotiator,
    transport: Arc<dyn AgentTransport>,
    state: Arc<ClientState>,
    locate_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(
        locator: AgentLocator,
        negotiator: SecurityNegotiator,
        transport: Arc<dyn AgentTransport>,
        state: Arc<ClientState>,
        locate_timeout: Duration,
    ) -> Self {
        Self {
            locator,
            negotiator,
            transport,
            state,
            locate_timeout,
        }
    }

    /// Returns a live channel, connecting first if necessary.
    ///
    /// While `Connected` with a live channel this is a cheap check that never
    /// re-handshakes.
    ///
    /// # Errors
    ///
    /// `Unavailable`, `CertificateFailed`, `SigningFailed` or
    /// `ConnectionRejected`.  The state is `Disconnected` afterwards, so the
    /// next call tries again from scratch.
    pub async fn ensure_connected(&self) -> Result<Arc<dyn AgentChannel>, PrintError> {
        let mut slot = self.state.channel_slot().lock().await;

        if let Some(channel) = slot.as_ref() {
            if channel.is_active() {
                return Ok(Arc::clone(channel));
            }
            warn!("agent channel no longer active; reconnecting");
            channel.close().await;
            *slot = None;
            self.state.set_connection_state(ConnectionState::Disconnected);
        }

        let attempt = ConnectingGuard::enter(&self.state);
        match self.connect().await {
            Ok(channel) => {
                *slot = Some(Arc::clone(&channel));
                attempt.complete();
                Ok(channel)
            }
            Err(e) => {
                drop(attempt);
                warn!(kind = e.kind(), "connecting to print agent failed: {e}");
                Err(e)
            }
        }
    }

    async fn connect(&self) -> Result<Arc<dyn AgentChannel>, PrintError> {
        let handle = self.locator.locate(self.locate_timeout).await?;
        self.negotiator.configure(self.transport.as_ref());
        debug!("opening agent channel to {handle}");
        let channel = self.transport.open(&handle).await?;
        info!("connected to print agent at {handle}");
        Ok(channel)
    }

    /// Closes the live channel, if any, and returns to `Disconnected`.
    pub async fn disconnect(&self) {
        let channel = self.state.channel_slot().lock().await.take();
        if let Some(channel) = channel {
            channel.close().await;
            info!("disconnected from print agent");
        }
        self.state.set_connection_state(ConnectionState::Disconnected);
    }

    pub fn state(&self) -> ConnectionState {
        self.state.connection_state()
    }

    pub fn locator(&self) -> &AgentLocator {
        &self.locator
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
