//! # qzprint-core
//!
//! Shared library for qzprint containing the print job model, the JSON wire
//! envelope spoken with the local print agent, the handshake signing digest,
//! and the error taxonomy every layer reports in.
//!
//! This crate has no dependencies on async runtimes, sockets, or HTTP clients.
//!
//! # Architecture overview (for beginners)
//!
//! qzprint sends rendered documents (usually an HTML sales receipt) to a print
//! agent running on the same machine.  The agent listens on a WebSocket port,
//! only trusts clients that present a certificate and a signature, and then
//! forwards jobs to the physical printer.
//!
//! This crate is the shared foundation.  It defines:
//!
//! - **`domain`** – What a print job *is*: its kind (`pixel` or `raw`), the
//!   format/flavor pair derived from the kind, the target printer, and the
//!   option map the agent understands.  Also the [`PrintError`] taxonomy.
//!
//! - **`protocol`** – How requests and replies travel over the WebSocket as
//!   JSON text frames, and how the handshake challenge is computed before it
//!   is sent to the signing backend.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `qzprint_core::PrintJob` instead of `qzprint_core::domain::job::PrintJob`.
pub use domain::error::PrintError;
pub use domain::job::{PrintFlavor, PrintFormat, PrintJob, PrintKind, PrintOptions, PrintOutcome};
pub use protocol::envelope::{AgentCall, AgentReply, AgentRequest};
pub use protocol::signing::{handshake_challenge, SignAlgorithm};
