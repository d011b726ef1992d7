//! JSON request/reply envelopes for the agent WebSocket.
//!
//! Every frame is a JSON text frame.  Requests carry a random `uid`; the agent
//! echoes it in the reply so that replies can be matched to requests even when
//! several calls are in flight on the same socket.
//!
//! ```json
//! → {"uid":"6f1c..","call":"printers.getDefault","params":{},"timestamp":1700000000000}
//! ← {"uid":"6f1c..","result":"XP-80C"}
//! ← {"uid":"6f1c..","error":"printer not found"}
//! ```
//!
//! Only the handshake request carries `signature` and `signAlgorithm`.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::protocol::signing::{handshake_challenge, SignAlgorithm};

/// The agent calls this client issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentCall {
    /// Presents the certificate and the signed challenge.
    Handshake,
    /// Asks for the system default printer.
    GetDefaultPrinter,
    /// Lists every printer the agent can see.
    FindPrinters,
    /// Submits a job.
    Print,
}

impl AgentCall {
    /// Returns the wire name of the call.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentCall::Handshake => "websocket.handshake",
            AgentCall::GetDefaultPrinter => "printers.getDefault",
            AgentCall::FindPrinters => "printers.find",
            AgentCall::Print => "print",
        }
    }

    /// Parses a wire name back into a call.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "websocket.handshake" => Some(AgentCall::Handshake),
            "printers.getDefault" => Some(AgentCall::GetDefaultPrinter),
            "printers.find" => Some(AgentCall::FindPrinters),
            "print" => Some(AgentCall::Print),
            _ => None,
        }
    }
}

impl fmt::Display for AgentCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request frame sent to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub uid: String,
    pub call: String,
    #[serde(default)]
    pub params: Value,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(
        default,
        rename = "signAlgorithm",
        skip_serializing_if = "Option::is_none"
    )]
    pub sign_algorithm: Option<SignAlgorithm>,
}

impl AgentRequest {
    /// Builds an unsigned request with a fresh uid and the current timestamp.
    pub fn new(call: AgentCall, params: Value) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            call: call.as_str().to_string(),
            params,
            timestamp: current_timestamp_ms(),
            signature: None,
            sign_algorithm: None,
        }
    }

    /// Returns the string the signing backend must sign for this request.
    pub fn challenge(&self) -> String {
        handshake_challenge(&self.call, &self.params, self.timestamp)
    }

    /// Attaches a signature produced over [`AgentRequest::challenge`].
    pub fn with_signature(mut self, signature: String, algorithm: SignAlgorithm) -> Self {
        self.signature = Some(signature);
        self.sign_algorithm = Some(algorithm);
        self
    }

    /// Returns the parsed call, or `None` for a call name this crate does not know.
    pub fn agent_call(&self) -> Option<AgentCall> {
        AgentCall::from_wire(&self.call)
    }

    /// Serialises the request to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the params contain a value JSON cannot
    /// represent (never the case for params built with `serde_json::json!`).
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A reply frame received from the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    /// A successful reply carrying `result`.
    pub fn ok(uid: impl Into<String>, result: Value) -> Self {
        Self {
            uid: uid.into(),
            result: Some(result),
            error: None,
        }
    }

    /// A failed reply carrying the agent's error detail.
    pub fn err(uid: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            result: None,
            error: Some(error.into()),
        }
    }

    /// Parses a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the frame is not a reply envelope.
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Converts the reply into the call's outcome.
    ///
    /// An `error` field wins over a `result` field.  A reply with neither is a
    /// successful call that returned JSON `null`.
    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before 1970.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
