//! The error taxonomy shared by every qzprint component.
//!
//! Each variant names one failure mode of the print path.  None of them is
//! retried inside the library: every failure is surfaced to the immediate
//! caller, which decides whether to fall back to the host's native printing.
//!
//! # Which component produces which error?
//!
//! ```text
//! AgentLocator        → Unavailable
//! credential provider → CertificateFailed, SigningFailed
//! ConnectionManager   → ConnectionRejected (plus the three above, passed through)
//! PrinterResolver     → NoPrinter, QueryFailed
//! PrintDispatcher     → PrintRejected
//! ```

use std::time::Duration;

use thiserror::Error;

/// A typed failure of the print path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintError {
    /// No print agent answered within the locate timeout.
    ///
    /// Treat this as "agent not installed or not running".
    #[error("print agent not reachable after {waited:?}")]
    Unavailable {
        /// How long the locator waited before giving up.
        waited: Duration,
    },

    /// The certificate could not be fetched from the trusted backend.
    #[error("certificate retrieval failed: {0}")]
    CertificateFailed(String),

    /// The trusted backend refused or failed to sign the handshake challenge.
    #[error("challenge signing failed: {0}")]
    SigningFailed(String),

    /// The WebSocket transport could not be opened, or the agent refused the
    /// handshake.
    #[error("agent connection rejected: {0}")]
    ConnectionRejected(String),

    /// The agent reported no default printer.
    #[error("no default printer: {0}")]
    NoPrinter(String),

    /// A live printer query failed.
    #[error("printer query failed: {0}")]
    QueryFailed(String),

    /// The agent declined the print job.
    ///
    /// Carries the agent's own error detail (unknown printer, malformed job,
    /// agent busy, ...).
    #[error("print job rejected: {0}")]
    PrintRejected(String),
}

impl PrintError {
    /// Returns a short, stable name for the variant.
    ///
    /// Used in log fields where the full message (which may contain backend
    /// response bodies) is too noisy.
    pub fn kind(&self) -> &'static str {
        match self {
            PrintError::Unavailable { .. } => "unavailable",
            PrintError::CertificateFailed(_) => "certificate_failed",
            PrintError::SigningFailed(_) => "signing_failed",
            PrintError::ConnectionRejected(_) => "connection_rejected",
            PrintError::NoPrinter(_) => "no_printer",
            PrintError::QueryFailed(_) => "query_failed",
            PrintError::PrintRejected(_) => "print_rejected",
        }
    }

    /// Returns `true` for failures that happened before a channel to the agent
    /// existed.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            PrintError::Unavailable { .. }
                | PrintError::CertificateFailed(_)
                | PrintError::SigningFailed(_)
                | PrintError::ConnectionRejected(_)
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
