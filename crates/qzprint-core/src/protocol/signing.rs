//! Handshake challenge computation.
//!
//! The agent only trusts a connection after it has seen a request signed by
//! the private key matching the presented certificate.  The private key never
//! leaves the trusted backend, so the client computes a *challenge* string,
//! sends it to the backend's signing endpoint, and attaches the returned
//! signature to the handshake request.
//!
//! # Challenge format
//!
//! ```text
//! challenge = lowercase_hex( SHA-256( call + compact_json(params) + timestamp ) )
//! ```
//!
//! The agent recomputes the same digest from the request it received and
//! verifies the signature over it with the certificate's public key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// The hash algorithm the backend signs with.
///
/// Announced to the agent in the `signAlgorithm` field of the handshake.  The
/// backend defaults to SHA1 with PKCS#1 v1.5 padding, which is also the
/// agent's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignAlgorithm {
    #[default]
    #[serde(rename = "SHA1")]
    Sha1,
    #[serde(rename = "SHA256")]
    Sha256,
    #[serde(rename = "SHA512")]
    Sha512,
}

impl SignAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            SignAlgorithm::Sha1 => "SHA1",
            SignAlgorithm::Sha256 => "SHA256",
            SignAlgorithm::Sha512 => "SHA512",
        }
    }
}

impl fmt::Display for SignAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(SignAlgorithm::Sha1),
            "SHA256" => Ok(SignAlgorithm::Sha256),
            "SHA512" => Ok(SignAlgorithm::Sha512),
            other => Err(format!("unsupported signature algorithm '{other}'")),
        }
    }
}

/// Computes the challenge string for a request.
///
/// # Examples
///
/// ```rust
/// use qzprint_core::handshake_challenge;
/// use serde_json::json;
///
/// let a = handshake_challenge("websocket.handshake", &json!({"certificate": "x"}), 1);
/// let b = handshake_challenge("websocket.handshake", &json!({"certificate": "x"}), 2);
/// assert_eq!(a.len(), 64);
/// assert_ne!(a, b);
/// ```
pub fn handshake_challenge(call: &str, params: &Value, timestamp: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(call.as_bytes());
    // `Value`'s Display impl is the compact JSON form.
    hasher.update(params.to_string().as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
