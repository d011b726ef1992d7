//! PrintDispatcher: turns rendered content into one agent print job.
//!
//! The dispatcher owns no state.  For each request it makes sure a channel is
//! up, builds a [`PrintJob`] (one entry, kind-derived format), merges the
//! caller's options over the defaults and sends a single `print` call.  It
//! never retries and never queues: a rejected job is reported straight back
//! to the caller, who decides whether to fall back.

use std::sync::Arc;

use qzprint_core::{AgentCall, PrintError, PrintJob, PrintKind, PrintOptions, PrintOutcome};
use tracing::{info, warn};

use crate::application::connection::ConnectionManager;

pub struct PrintDispatcher {
    connection: Arc<ConnectionManager>,
}

impl PrintDispatcher {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    /// Prints `content` on `printer`.
    ///
    /// # Errors
    ///
    /// Connection failures pass through unchanged.  An empty printer name, an
    /// agent-side rejection, a closed channel or a reply timeout is
    /// [`PrintError::PrintRejected`].
    pub async fn print(
        &self,
        printer: &str,
        content: &str,
        kind: PrintKind,
        options: &PrintOptions,
    ) -> Result<PrintOutcome, PrintError> {
        if printer.trim().is_empty() {
            return Err(PrintError::PrintRejected(
                "printer name must not be empty".to_string(),
            ));
        }
        self.submit(&PrintJob::new(printer, content, kind), options).await
    }

    /// Sends an already built job.
    pub async fn submit(
        &self,
        job: &PrintJob,
        options: &PrintOptions,
    ) -> Result<PrintOutcome, PrintError> {
        let channel = self.connection.ensure_connected().await?;

        info!(
            printer = job.target(),
            kind = %job.kind(),
            bytes = job.data().len(),
            "submitting print job"
        );

        match channel.call(AgentCall::Print, job.to_params(options)).await {
            Ok(_) => Ok(PrintOutcome::success()),
            Err(e) => {
                warn!(printer = job.target(), "print job rejected: {e}");
                Err(PrintError::PrintRejected(e.to_string()))
            }
        }
    }
}
