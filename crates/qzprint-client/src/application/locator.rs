//! AgentLocator: finds a running print agent, waiting a bounded time for it.
//!
//! The agent is a separate desktop process.  Right after login, or when the
//! host application starts before the agent does, the first probe usually
//! fails.  The locator therefore polls at a fixed interval until the agent
//! answers or the timeout elapses.
//!
//! # Why not a plain loop with `std::thread::sleep`?
//!
//! Blocking sleeps would stall a Tokio worker thread and every other task
//! scheduled on it.  [`poll_until`] uses `tokio::time::sleep`, which suspends
//! only the waiting task.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qzprint_core::PrintError;
use tokio::time::{self, sleep, Instant};
use tracing::{debug, info};

/// Address at which a live agent answered a probe.
///
/// This is a lookup result only.  Holding a handle does not keep the agent
/// alive or reserve anything on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentHandle {
    pub host: String,
    pub port: u16,
}

impl AgentHandle {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the WebSocket URL of the agent.
    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One availability check.
///
/// The infrastructure implementation tries a TCP connect on each agent port;
/// test implementations return whatever the scenario needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AgentProbe: Send + Sync {
    /// Returns the agent's handle if it is reachable right now.
    async fn probe(&self) -> Option<AgentHandle>;
}

/// Repeats `attempt` every `interval` until it yields a value or `timeout`
/// elapses.
///
/// Each attempt is cut off at the deadline and the last sleep is clamped to the
/// remaining time, so an `Err` is returned no earlier than `timeout` and no
/// later than `timeout + interval`, however slow a single attempt is.  The
/// `Err` carries the time actually waited.
pub async fn poll_until<T, F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut attempt: F,
) -> Result<T, Duration>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let started = Instant::now();
    loop {
        let remaining = timeout.saturating_sub(started.elapsed());
        if let Ok(Some(value)) = time::timeout(remaining, attempt()).await {
            return Ok(value);
        }
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            return Err(elapsed);
        }
        sleep(interval.min(timeout - elapsed)).await;
    }
}

/// Finds the agent.  Stateless: it never caches a handle.
pub struct AgentLocator {
    probe: Arc<dyn AgentProbe>,
    interval: Duration,
}

impl AgentLocator {
    pub fn new(probe: Arc<dyn AgentProbe>, interval: Duration) -> Self {
        Self { probe, interval }
    }

    /// Waits up to `timeout` for the agent.
    ///
    /// # Errors
    ///
    /// Returns [`PrintError::Unavailable`] when no probe succeeded in time.
    pub async fn locate(&self, timeout: Duration) -> Result<AgentHandle, PrintError> {
        let probe = &self.probe;
        match poll_until(self.interval, timeout, || probe.probe()).await {
            Ok(handle) => {
                debug!("print agent found at {handle}");
                Ok(handle)
            }
            Err(waited) => {
                info!("print agent not reachable after {waited:?}");
                Err(PrintError::Unavailable { waited })
            }
        }
    }

    /// Probes once without waiting.
    pub async fn lookup(&self) -> Option<AgentHandle> {
        self.probe.probe().await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
