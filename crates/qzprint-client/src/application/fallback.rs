//! Caller-side policy: try the agent once, fall back to native printing.
//!
//! Host applications keep a native print path (the browser's print dialog,
//! a PDF viewer, ...) for machines without the agent.  [`print_or_fallback`]
//! encodes the usual policy around the service: one agent attempt, and on any
//! failure a `warn!` with the reason followed by the native path.

use anyhow::Context;
use async_trait::async_trait;
use qzprint_core::{PrintKind, PrintOptions, PrintOutcome};
use tracing::warn;

use crate::application::service::PrintService;

/// The host's own print path.
#[async_trait]
pub trait NativePrinter: Send + Sync {
    async fn print_native(&self, content: &str) -> anyhow::Result<()>;
}

/// Which path ended up printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintRoute {
    Agent(PrintOutcome),
    /// The agent failed with `reason`; the native path printed instead.
    Native { reason: String },
}

/// Prints through the agent, or through `native` if the agent path fails.
///
/// With `printer == None` the default printer is used.
///
/// # Errors
///
/// Only when the native path fails too.  The error carries the agent failure
/// as context.
pub async fn print_or_fallback(
    service: &PrintService,
    printer: Option<&str>,
    content: &str,
    kind: PrintKind,
    options: &PrintOptions,
    native: &dyn NativePrinter,
) -> anyhow::Result<PrintRoute> {
    let attempt = match printer {
        Some(name) => service.print(name, content, kind, options).await,
        None => service.print_to_default(content, kind, options).await,
    };

    match attempt {
        Ok(outcome) => Ok(PrintRoute::Agent(outcome)),
        Err(e) => {
            warn!(kind = e.kind(), "agent print failed, using native print: {e}");
            native
                .print_native(content)
                .await
                .with_context(|| format!("native print failed after agent error: {e}"))?;
            Ok(PrintRoute::Native {
                reason: e.to_string(),
            })
        }
    }
}
