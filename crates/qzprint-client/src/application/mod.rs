//! Application layer of the print client.
//!
//! # What lives here (for beginners)
//!
//! The application layer holds the print workflow itself.  It talks to the
//! outside world only through traits ([`locator::AgentProbe`],
//! [`security::CredentialProvider`], [`connection::AgentTransport`]) so the
//! infrastructure adapters can be replaced by in-memory doubles in tests.
//!
//! # Sub-modules
//!
//! - **`locator`**    – Polls for the agent with a bounded timeout.
//! - **`security`**   – One-time installation of the certificate/signing
//!   provider on the transport.
//! - **`connection`** – The connection state machine and the channel traits.
//! - **`printers`**   – Default printer lookup with caching, printer listing.
//! - **`dispatcher`** – Builds and submits one print job.
//! - **`service`**    – The [`service::PrintService`] facade.
//! - **`state`**      – [`state::ClientState`], the shared mutable state.
//! - **`fallback`**   – Agent-or-native print policy for callers.

pub mod connection;
pub mod dispatcher;
pub mod fallback;
pub mod locator;
pub mod printers;
pub mod security;
pub mod service;
pub mod state;

pub use connection::{AgentChannel, AgentTransport, CallError, ConnectionManager};
pub use fallback::{print_or_fallback, NativePrinter, PrintRoute};
pub use locator::{poll_until, AgentHandle, AgentLocator, AgentProbe};
pub use security::{CredentialProvider, SecurityNegotiator};
pub use service::PrintService;
pub use state::{ClientState, ConnectionState};
