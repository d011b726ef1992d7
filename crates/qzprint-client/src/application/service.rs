//! PrintService: the facade host applications call.
//!
//! It owns one [`ClientState`] and wires the five components around it:
//!
//! ```text
//!   PrintService
//!     ├── ConnectionManager ── AgentLocator ── AgentProbe
//!     │                    └── SecurityNegotiator ── CredentialProvider
//!     ├── PrinterResolver
//!     └── PrintDispatcher
//! ```
//!
//! Every component receives its collaborators through the constructor, so a
//! test can swap the probe, the credential provider or the transport for an
//! in-memory double.

use std::sync::Arc;

use qzprint_core::{PrintError, PrintKind, PrintOptions, PrintOutcome};
use tracing::info;

use crate::application::connection::{AgentTransport, ConnectionManager};
use crate::application::dispatcher::PrintDispatcher;
use crate::application::locator::{AgentHandle, AgentLocator, AgentProbe};
use crate::application::printers::PrinterResolver;
use crate::application::security::{CredentialProvider, SecurityNegotiator};
use crate::application::state::{ClientState, ConnectionState};
use crate::domain::ClientConfig;

pub struct PrintService {
    state: Arc<ClientState>,
    connection: Arc<ConnectionManager>,
    printers: PrinterResolver,
    dispatcher: PrintDispatcher,
}

impl PrintService {
    pub fn new(
        config: &ClientConfig,
        probe: Arc<dyn AgentProbe>,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn AgentTransport>,
    ) -> Self {
        let state = Arc::new(ClientState::new());
        let connection = Arc::new(ConnectionManager::new(
            AgentLocator::new(probe, config.poll_interval()),
            SecurityNegotiator::new(credentials, Arc::clone(&state)),
            transport,
            Arc::clone(&state),
            config.locate_timeout(),
        ));
        Self {
            printers: PrinterResolver::new(Arc::clone(&connection), Arc::clone(&state)),
            dispatcher: PrintDispatcher::new(Arc::clone(&connection)),
            connection,
            state,
        }
    }

    /// Connects to the agent now instead of on the first print.
    pub async fn connect(&self) -> Result<(), PrintError> {
        self.connection.ensure_connected().await.map(|_| ())
    }

    /// Prints `content` on the named printer.
    pub async fn print(
        &self,
        printer: &str,
        content: &str,
        kind: PrintKind,
        options: &PrintOptions,
    ) -> Result<PrintOutcome, PrintError> {
        self.dispatcher.print(printer, content, kind, options).await
    }

    /// Prints `content` on the default printer (cached after the first lookup).
    pub async fn print_to_default(
        &self,
        content: &str,
        kind: PrintKind,
        options: &PrintOptions,
    ) -> Result<PrintOutcome, PrintError> {
        let printer = self.printers.resolve_default().await?;
        self.dispatcher.print(&printer, content, kind, options).await
    }

    pub async fn get_printers(&self) -> Result<Vec<String>, PrintError> {
        self.printers.list_printers().await
    }

    pub async fn default_printer(&self) -> Result<String, PrintError> {
        self.printers.resolve_default().await
    }

    pub async fn invalidate_printer(&self) {
        self.printers.invalidate().await;
    }

    /// Probes for the agent once, without waiting and without connecting.
    pub async fn get_agent_handle(&self) -> Option<AgentHandle> {
        self.connection.locator().lookup().await
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Drops the connection and the cached printer.  The next call starts
    /// from a clean `Disconnected` state.
    pub async fn reset(&self) {
        self.state.reset().await;
        info!("print service reset");
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }
}
