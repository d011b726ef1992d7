//! Agent wire protocol.
//!
//! - [`envelope`] – JSON request/reply frames exchanged over the WebSocket.
//! - [`signing`] – The handshake challenge digest and signature algorithms.

pub mod envelope;
pub mod signing;

pub use envelope::{AgentCall, AgentReply, AgentRequest};
pub use signing::{handshake_challenge, SignAlgorithm};
