//! Shared test doubles for the qzprint-client integration tests.
//!
//! - [`FakeAgent`] plays the print agent in memory.  It implements
//!   `AgentTransport`, hands out channels, and records every call and every
//!   submitted job so tests can assert on exactly what was sent.
//! - [`CountingCredentials`] counts certificate and signature requests.
//! - [`SwitchProbe`] reports the agent up or down on demand.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use qzprint_client::application::{
    AgentChannel, AgentHandle, AgentProbe, AgentTransport, CallError, CredentialProvider,
    PrintService,
};
use qzprint_client::domain::ClientConfig;
use qzprint_core::{AgentCall, PrintError};
use serde_json::{json, Value};

// ── Fake agent ────────────────────────────────────────────────────────────────

/// What the fake agent answers, plus everything it was sent.  Shared between
/// the transport and the channels it opens.
#[derive(Default)]
struct AgentScript {
    default_printer: Mutex<Option<String>>,
    printers: Mutex<Vec<String>>,
    reject_print: Mutex<Option<String>>,
    calls: Mutex<Vec<AgentCall>>,
    jobs: Mutex<Vec<Value>>,
    sockets: Mutex<Vec<Arc<AtomicBool>>>,
}

impl AgentScript {
    fn answer(&self, call: AgentCall, params: Value) -> Result<Value, CallError> {
        self.calls.lock().unwrap().push(call);
        match call {
            AgentCall::Handshake => Ok(Value::Bool(true)),
            AgentCall::GetDefaultPrinter => Ok(self
                .default_printer
                .lock()
                .unwrap()
                .clone()
                .map_or(Value::Null, Value::String)),
            AgentCall::FindPrinters => Ok(json!(*self.printers.lock().unwrap())),
            AgentCall::Print => {
                if let Some(reason) = self.reject_print.lock().unwrap().clone() {
                    return Err(CallError::Agent(reason));
                }
                self.jobs.lock().unwrap().push(params);
                Ok(Value::Null)
            }
        }
    }
}

#[derive(Default)]
pub struct FakeAgent {
    pub reject_handshake: AtomicBool,
    pub opens: AtomicUsize,
    pub installs: AtomicUsize,
    script: Arc<AgentScript>,
    credentials: OnceLock<Arc<dyn CredentialProvider>>,
}

impl FakeAgent {
    pub fn with_default_printer(name: &str) -> Arc<Self> {
        let agent = Self::default();
        agent.set_default_printer(Some(name));
        *agent.script.printers.lock().unwrap() = vec![name.to_string(), "Kitchen".to_string()];
        Arc::new(agent)
    }

    pub fn set_default_printer(&self, name: Option<&str>) {
        *self.script.default_printer.lock().unwrap() = name.map(str::to_string);
    }

    pub fn set_printers(&self, names: &[&str]) {
        *self.script.printers.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
    }

    /// Makes every following `print` call fail with `reason`.
    pub fn reject_prints(&self, reason: &str) {
        *self.script.reject_print.lock().unwrap() = Some(reason.to_string());
    }

    /// Params of every accepted `print` call, in order.
    pub fn jobs(&self) -> Vec<Value> {
        self.script.jobs.lock().unwrap().clone()
    }

    pub fn count_calls(&self, call: AgentCall) -> usize {
        self.script
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    /// Simulates the agent dropping every open socket.
    pub fn drop_connections(&self) {
        for socket in self.script.sockets.lock().unwrap().iter() {
            socket.store(false, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl AgentTransport for FakeAgent {
    fn install_security(&self, credentials: Arc<dyn CredentialProvider>) {
        self.installs.fetch_add(1, Ordering::SeqCst);
        let _ = self.credentials.set(credentials);
    }

    async fn open(&self, _handle: &AgentHandle) -> Result<Arc<dyn AgentChannel>, PrintError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let credentials = self.credentials.get().cloned().ok_or_else(|| {
            PrintError::ConnectionRejected("no credential provider installed".to_string())
        })?;
        // One certificate fetch and one signature per attempt, as on the wire.
        credentials.certificate().await?;
        credentials.sign("challenge").await?;

        if self.reject_handshake.load(Ordering::SeqCst) {
            return Err(PrintError::ConnectionRejected(
                "agent refused the certificate".to_string(),
            ));
        }
        let active = Arc::new(AtomicBool::new(true));
        self.script.sockets.lock().unwrap().push(Arc::clone(&active));
        Ok(Arc::new(FakeChannel {
            script: Arc::clone(&self.script),
            active,
        }))
    }
}

/// Channel handed out by [`FakeAgent`].
struct FakeChannel {
    script: Arc<AgentScript>,
    active: Arc<AtomicBool>,
}

#[async_trait]
impl AgentChannel for FakeChannel {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    async fn call(&self, call: AgentCall, params: Value) -> Result<Value, CallError> {
        if !self.is_active() {
            return Err(CallError::Closed);
        }
        self.script.answer(call, params)
    }

    async fn close(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

// ── Credentials ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct CountingCredentials {
    pub certificate_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
    pub fail_certificate: AtomicBool,
    pub fail_signing: AtomicBool,
}

#[async_trait]
impl CredentialProvider for CountingCredentials {
    async fn certificate(&self) -> Result<String, PrintError> {
        self.certificate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_certificate.load(Ordering::SeqCst) {
            return Err(PrintError::CertificateFailed("HTTP 500: key store offline".to_string()));
        }
        Ok("-----BEGIN CERTIFICATE-----\nTEST\n-----END CERTIFICATE-----".to_string())
    }

    async fn sign(&self, _challenge: &str) -> Result<String, PrintError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(PrintError::SigningFailed("HTTP 403: origin not allowed".to_string()));
        }
        Ok("c2lnbmF0dXJl".to_string())
    }
}

// ── Probe ─────────────────────────────────────────────────────────────────────

pub struct SwitchProbe {
    pub up: AtomicBool,
    pub probes: AtomicUsize,
}

impl SwitchProbe {
    pub fn new(up: bool) -> Arc<Self> {
        Arc::new(Self {
            up: AtomicBool::new(up),
            probes: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl AgentProbe for SwitchProbe {
    async fn probe(&self) -> Option<AgentHandle> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.up
            .load(Ordering::SeqCst)
            .then(|| AgentHandle::new("localhost", 8182))
    }
}

// ── Wiring ────────────────────────────────────────────────────────────────────

pub fn test_config() -> ClientConfig {
    ClientConfig {
        locate_timeout_ms: 300,
        poll_interval_ms: 50,
        ..ClientConfig::default()
    }
}

pub struct Harness {
    pub agent: Arc<FakeAgent>,
    pub credentials: Arc<CountingCredentials>,
    pub probe: Arc<SwitchProbe>,
    pub service: PrintService,
}

impl Harness {
    pub fn new(agent: Arc<FakeAgent>) -> Self {
        let credentials = Arc::new(CountingCredentials::default());
        let probe = SwitchProbe::new(true);
        let service = PrintService::new(
            &test_config(),
            Arc::clone(&probe) as Arc<dyn AgentProbe>,
            Arc::clone(&credentials) as Arc<dyn CredentialProvider>,
            Arc::clone(&agent) as Arc<dyn AgentTransport>,
        );
        Self {
            agent,
            credentials,
            probe,
            service,
        }
    }

    pub fn handshakes(&self) -> usize {
        self.credentials.certificate_calls.load(Ordering::SeqCst)
    }
}
