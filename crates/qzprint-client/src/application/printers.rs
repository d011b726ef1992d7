//! PrinterResolver: finds out which printer a job goes to.
//!
//! The default printer rarely changes while a till is open, so the first name
//! the agent reports is cached in [`ClientState`] and reused for every later
//! job.  Nothing invalidates the cache automatically; call
//! [`PrinterResolver::invalidate`] (or reset the service) after the operator
//! switches printers.

use std::sync::Arc;

use qzprint_core::{AgentCall, PrintError};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::application::connection::ConnectionManager;
use crate::application::state::ClientState;

pub struct PrinterResolver {
    connection: Arc<ConnectionManager>,
    state: Arc<ClientState>,
}

impl PrinterResolver {
    pub fn new(connection: Arc<ConnectionManager>, state: Arc<ClientState>) -> Self {
        Self { connection, state }
    }

    /// Returns the default printer's name, asking the agent at most once.
    ///
    /// # Errors
    ///
    /// Connection failures pass through unchanged.  A null or empty answer, or
    /// a failed `printers.getDefault` call, is [`PrintError::NoPrinter`].
    pub async fn resolve_default(&self) -> Result<String, PrintError> {
        let channel = self.connection.ensure_connected().await?;

        if let Some(name) = self.state.cached_printer().await {
            debug!("using cached default printer {name:?}");
            return Ok(name);
        }

        let reply = channel
            .call(AgentCall::GetDefaultPrinter, json!({}))
            .await
            .map_err(|e| PrintError::NoPrinter(e.to_string()))?;

        match reply {
            Value::String(name) if !name.trim().is_empty() => {
                info!("default printer is {name:?}");
                self.state.cache_printer(name.clone()).await;
                Ok(name)
            }
            Value::String(_) | Value::Null => Err(PrintError::NoPrinter(
                "agent reports no default printer".to_string(),
            )),
            other => Err(PrintError::NoPrinter(format!(
                "unexpected printers.getDefault result: {other}"
            ))),
        }
    }

    /// Lists every printer the agent can see.  Always a live query.
    ///
    /// # Errors
    ///
    /// Connection failures pass through; a failed or malformed
    /// `printers.find` reply is [`PrintError::QueryFailed`].
    pub async fn list_printers(&self) -> Result<Vec<String>, PrintError> {
        let channel = self.connection.ensure_connected().await?;
        let reply = channel
            .call(AgentCall::FindPrinters, json!({}))
            .await
            .map_err(|e| PrintError::QueryFailed(e.to_string()))?;

        match reply {
            // A single match comes back as a bare string.
            Value::String(name) => Ok(vec![name]),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(PrintError::QueryFailed(format!(
                        "printer name is not a string: {other}"
                    ))),
                })
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(PrintError::QueryFailed(format!(
                "unexpected printers.find result: {other}"
            ))),
        }
    }

    /// Forgets the cached default printer.
    pub async fn invalidate(&self) {
        if let Some(name) = self.state.clear_printer().await {
            debug!("forgot cached default printer {name:?}");
        }
    }

    pub async fn cached(&self) -> Option<String> {
        self.state.cached_printer().await
    }
}
