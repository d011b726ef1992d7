//! ClientState: the one owned object holding every piece of mutable state.
//!
//! | Piece             | Type                                   | Mutated by          |
//! |-------------------|----------------------------------------|---------------------|
//! | connection phase  | `AtomicU8` ([`ConnectionState`])       | `ConnectionManager` |
//! | live channel      | `tokio::sync::Mutex<Option<Arc<..>>>`  | `ConnectionManager` |
//! | security once-flag| `OnceLock<()>`                         | `SecurityNegotiator`|
//! | printer cache     | `tokio::sync::RwLock<Option<String>>`  | `PrinterResolver`   |
//!
//! The components share one `Arc<ClientState>`, so there is exactly one
//! connection, one security registration and one cached printer per service
//! instance.  The runtime is multi-threaded, so each piece carries its own
//! synchronisation.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::application::connection::AgentChannel;

/// Lifecycle of the logical connection to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Shared mutable state of one print service.
pub struct ClientState {
    phase: AtomicU8,
    channel: Mutex<Option<Arc<dyn AgentChannel>>>,
    security: OnceLock<()>,
    printer: RwLock<Option<String>>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientState {
    /// Creates a disconnected state with no security registration and an
    /// empty printer cache.
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(ConnectionState::Disconnected as u8),
            channel: Mutex::new(None),
            security: OnceLock::new(),
            printer: RwLock::new(None),
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_connection_state(&self, state: ConnectionState) {
        self.phase.store(state as u8, Ordering::Release);
    }

    /// The slot holding the live channel.  Holding its lock is what makes a
    /// connect attempt exclusive.
    pub(crate) fn channel_slot(&self) -> &Mutex<Option<Arc<dyn AgentChannel>>> {
        &self.channel
    }

    pub fn is_security_configured(&self) -> bool {
        self.security.get().is_some()
    }

    pub(crate) fn security_once(&self) -> &OnceLock<()> {
        &self.security
    }

    pub async fn cached_printer(&self) -> Option<String> {
        self.printer.read().await.clone()
    }

    pub(crate) async fn cache_printer(&self, name: String) {
        *self.printer.write().await = Some(name);
    }

    /// Forgets the cached default printer.  Returns the name that was cached.
    pub async fn clear_printer(&self) -> Option<String> {
        self.printer.write().await.take()
    }

    /// Closes the live channel, returns to `Disconnected` and clears the
    /// printer cache.
    ///
    /// The security registration survives: it was made on the transport,
    /// which outlives this reset.
    pub async fn reset(&self) {
        let channel = self.channel.lock().await.take();
        if let Some(channel) = channel {
            channel.close().await;
        }
        self.set_connection_state(ConnectionState::Disconnected);
        self.clear_printer().await;
        debug!("client state reset");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_disconnected_and_unconfigured() {
        let state = ClientState::new();
        assert_eq!(state.connection_state(), ConnectionState::Disconnected);
        assert!(!state.is_security_configured());
    }

    #[test]
    fn test_connection_state_round_trips_through_atomic() {
        let state = ClientState::new();
        for s in [
            ConnectionState::Connecting,
            ConnectionState::Connected,
            ConnectionState::Disconnected,
        ] {
            state.set_connection_state(s);
            assert_eq!(state.connection_state(), s);
        }
    }

    #[tokio::test]
    async fn test_printer_cache_set_and_clear() {
        // Arrange
        let state = ClientState::new();
        assert_eq!(state.cached_printer().await, None);

        // Act
        state.cache_printer("XP-80C".to_string()).await;

        // Assert
        assert_eq!(state.cached_printer().await.as_deref(), Some("XP-80C"));
        assert_eq!(state.clear_printer().await.as_deref(), Some("XP-80C"));
        assert_eq!(state.cached_printer().await, None);
    }

    #[test]
    fn test_clear_on_empty_cache_returns_none() {
        let state = ClientState::default();
        assert_eq!(tokio_test::block_on(state.clear_printer()), None);
    }

    #[tokio::test]
    async fn test_reset_keeps_security_registration() {
        // Arrange
        let state = ClientState::new();
        state.security_once().get_or_init(|| ());
        state.set_connection_state(ConnectionState::Connected);
        state.cache_printer("XP-80C".to_string()).await;

        // Act
        state.reset().await;

        // Assert
        assert_eq!(state.connection_state(), ConnectionState::Disconnected);
        assert_eq!(state.cached_printer().await, None);
        assert!(state.is_security_configured());
    }
}
