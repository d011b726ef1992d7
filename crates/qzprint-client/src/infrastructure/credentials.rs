//! HTTP client for the trusted signing backend.
//!
//! The backend holds the private key whose certificate the agent trusts.  It
//! exposes two plaintext endpoints:
//!
//! | Method | Path              | Body            | Response           |
//! |--------|-------------------|-----------------|--------------------|
//! | GET    | `/qz/certificate` | none            | PEM certificate    |
//! | POST   | `/qz/sign`        | challenge text  | base64 signature   |
//!
//! Any transport failure or non-2xx status is reported with the status and
//! the response body, which is where backends put their explanation.

use std::time::Duration;

use async_trait::async_trait;
use qzprint_core::PrintError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::application::security::CredentialProvider;

pub struct HttpCredentialProvider {
    client: Client,
    certificate_url: String,
    sign_url: String,
}

impl HttpCredentialProvider {
    /// Builds a provider for the backend at `backend_base` (no trailing `/`).
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the TLS backend cannot be initialised.
    pub fn new(backend_base: &str, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            certificate_url: format!("{backend_base}/qz/certificate"),
            sign_url: format!("{backend_base}/qz/sign"),
        })
    }
}

/// Sends `request` and returns the body of a 2xx response.
async fn fetch_text(request: RequestBuilder) -> Result<String, String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    let body = response.text().await.map_err(|e| e.to_string())?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(format!("HTTP {status}: {}", body.trim()))
    }
}

#[async_trait]
impl CredentialProvider for HttpCredentialProvider {
    async fn certificate(&self) -> Result<String, PrintError> {
        debug!(url = %self.certificate_url, "fetching agent certificate");
        fetch_text(self.client.get(&self.certificate_url))
            .await
            .map_err(PrintError::CertificateFailed)
    }

    async fn sign(&self, challenge: &str) -> Result<String, PrintError> {
        debug!(url = %self.sign_url, "requesting challenge signature");
        let request = self
            .client
            .post(&self.sign_url)
            .header(CONTENT_TYPE, "text/plain")
            .body(challenge.to_string());
        fetch_text(request)
            .await
            .map(|signature| signature.trim().to_string())
            .map_err(PrintError::SigningFailed)
    }
}
