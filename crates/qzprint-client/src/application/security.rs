//! SecurityNegotiator: installs the certificate and signing providers on the
//! agent transport, once.
//!
//! # How the handshake works (for beginners)
//!
//! The agent only accepts commands from origins it trusts.  On every new
//! connection the transport:
//!
//! 1. asks the [`CredentialProvider`] for the certificate (public part),
//! 2. computes a challenge over the handshake request,
//! 3. asks the provider to sign the challenge with the private key, which
//!    never leaves the trusted backend,
//! 4. sends certificate + signature to the agent.
//!
//! Installing the provider on the transport is a one-time registration.
//! Doing it twice is not idempotent on the transport side, so the negotiator
//! guards it with the `OnceLock` in [`ClientState`].

use std::sync::Arc;

use async_trait::async_trait;
use qzprint_core::PrintError;
use tracing::{debug, info};

use crate::application::connection::AgentTransport;
use crate::application::state::ClientState;

/// Source of the certificate and of challenge signatures.
///
/// The infrastructure implementation calls the backend's `/qz/certificate`
/// and `/qz/sign` endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the PEM certificate the agent verifies signatures against.
    ///
    /// # Errors
    ///
    /// [`PrintError::CertificateFailed`] when the certificate cannot be fetched.
    async fn certificate(&self) -> Result<String, PrintError>;

    /// Signs `challenge` and returns the base64 signature.
    ///
    /// # Errors
    ///
    /// [`PrintError::SigningFailed`] when the backend refuses or fails.
    async fn sign(&self, challenge: &str) -> Result<String, PrintError>;
}

/// Performs the one-time credential registration.
pub struct SecurityNegotiator {
    credentials: Arc<dyn CredentialProvider>,
    state: Arc<ClientState>,
}

impl SecurityNegotiator {
    pub fn new(credentials: Arc<dyn CredentialProvider>, state: Arc<ClientState>) -> Self {
        Self { credentials, state }
    }

    /// Installs the credential provider on `transport` unless that already
    /// happened for this state.
    ///
    /// Concurrent callers block on the `OnceLock` until the first registration
    /// has finished, so nobody can open a connection before the provider is in
    /// place.  Returns `true` only for the call that did the registration.
    pub fn configure(&self, transport: &dyn AgentTransport) -> bool {
        let mut registered = false;
        self.state.security_once().get_or_init(|| {
            transport.install_security(Arc::clone(&self.credentials));
            registered = true;
        });

        if registered {
            info!("certificate and signature providers installed on agent transport");
        } else {
            debug!("security already configured; skipping registration");
        }
        registered
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_security_configured()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::connection::AgentChannel;
    use crate::application::locator::AgentHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that only counts registrations.
    #[derive(Default)]
    struct CountingTransport {
        installs: AtomicUsize,
    }

    #[async_trait]
    impl AgentTransport for CountingTransport {
        fn install_security(&self, _credentials: Arc<dyn CredentialProvider>) {
            self.installs.fetch_add(1, Ordering::SeqCst);
        }

        async fn open(&self, _handle: &AgentHandle) -> Result<Arc<dyn AgentChannel>, PrintError> {
            Err(PrintError::ConnectionRejected("not used".to_string()))
        }
    }

    fn negotiator(state: Arc<ClientState>) -> SecurityNegotiator {
        // Registration never calls the provider, so no expectations are set.
        SecurityNegotiator::new(Arc::new(MockCredentialProvider::new()), state)
    }

    #[test]
    fn test_first_configure_registers() {
        // Arrange
        let state = Arc::new(ClientState::new());
        let transport = CountingTransport::default();
        let negotiator = negotiator(Arc::clone(&state));

        // Act
        let registered = negotiator.configure(&transport);

        // Assert
        assert!(registered);
        assert!(negotiator.is_configured());
        assert_eq!(transport.installs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_configure_is_a_no_op() {
        let state = Arc::new(ClientState::new());
        let transport = CountingTransport::default();
        let negotiator = negotiator(state);

        for _ in 0..5 {
            negotiator.configure(&transport);
        }

        assert_eq!(transport.installs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_configure_registers_once() {
        // Arrange: eight threads race to configure the same state
        let state = Arc::new(ClientState::new());
        let transport = Arc::new(CountingTransport::default());
        let negotiator = Arc::new(negotiator(state));

        // Act
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let n = Arc::clone(&negotiator);
                let t = Arc::clone(&transport);
                std::thread::spawn(move || n.configure(t.as_ref()))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|registered| *registered)
            .count();

        // Assert
        assert_eq!(winners, 1);
        assert_eq!(transport.installs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_separate_states_register_independently() {
        let transport = CountingTransport::default();
        negotiator(Arc::new(ClientState::new())).configure(&transport);
        negotiator(Arc::new(ClientState::new())).configure(&transport);
        assert_eq!(transport.installs.load(Ordering::SeqCst), 2);
    }
}
