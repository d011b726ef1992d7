//! WebSocket transport to the print agent.
//!
//! # Request/reply over one socket (for beginners)
//!
//! The agent speaks JSON text frames.  Every request carries a `uid` and the
//! agent echoes that uid in its reply, so several calls can be in flight on
//! one socket.  [`WsAgentChannel`] splits the socket in two:
//!
//! - the **write half** sits behind an async mutex and is used by `call`;
//! - the **read half** is owned by a background reader task that decodes each
//!   reply and hands it to the waiting caller through a `oneshot` channel
//!   looked up by uid.
//!
//! ```text
//!   call() ──insert uid──▶ pending map ◀──remove uid── reader task ◀── agent
//!     │                                                   │
//!     └── Text frame ──▶ sink ──▶ agent        oneshot::send(reply)
//! ```
//!
//! When the socket closes the reader clears the pending map.  Dropping the
//! senders wakes every waiter with [`CallError::Closed`].
//!
//! # Handshake
//!
//! [`WsAgentTransport::open`] fetches the certificate, signs the handshake
//! challenge, connects, and sends the signed `websocket.handshake` request as
//! the first frame.  Credentials are obtained before the socket is opened, so
//! a failing backend never leaves a half-open connection behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use qzprint_core::{AgentCall, AgentReply, AgentRequest, PrintError, SignAlgorithm};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::application::connection::{AgentChannel, AgentTransport, CallError};
use crate::application::locator::AgentHandle;
use crate::application::security::CredentialProvider;
use crate::domain::ClientConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type PendingReplies = Arc<Mutex<HashMap<String, oneshot::Sender<AgentReply>>>>;

// ── Transport ─────────────────────────────────────────────────────────────────

pub struct WsAgentTransport {
    credentials: OnceLock<Arc<dyn CredentialProvider>>,
    request_timeout: Duration,
    sign_algorithm: SignAlgorithm,
}

impl WsAgentTransport {
    pub fn new(request_timeout: Duration, sign_algorithm: SignAlgorithm) -> Self {
        Self {
            credentials: OnceLock::new(),
            request_timeout,
            sign_algorithm,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.request_timeout(), config.sign_algorithm)
    }

    /// Builds the signed handshake request.
    async fn signed_handshake(
        &self,
        credentials: &dyn CredentialProvider,
    ) -> Result<AgentRequest, PrintError> {
        let certificate = credentials.certificate().await?;
        let request = AgentRequest::new(AgentCall::Handshake, json!({ "certificate": certificate }));
        let signature = credentials.sign(&request.challenge()).await?;
        Ok(request.with_signature(signature, self.sign_algorithm))
    }
}

#[async_trait]
impl AgentTransport for WsAgentTransport {
    fn install_security(&self, credentials: Arc<dyn CredentialProvider>) {
        if self.credentials.set(credentials).is_err() {
            warn!("credential provider already installed; keeping the first one");
        }
    }

    async fn open(&self, handle: &AgentHandle) -> Result<Arc<dyn AgentChannel>, PrintError> {
        let credentials = self.credentials.get().cloned().ok_or_else(|| {
            PrintError::ConnectionRejected("no credential provider installed".to_string())
        })?;
        let handshake = self.signed_handshake(credentials.as_ref()).await?;

        let url = handle.ws_url();
        let stream = match timeout(self.request_timeout, connect_async(url.as_str())).await {
            Ok(Ok((stream, _response))) => stream,
            Ok(Err(e)) => {
                return Err(PrintError::ConnectionRejected(format!(
                    "cannot open {url}: {e}"
                )))
            }
            Err(_) => {
                return Err(PrintError::ConnectionRejected(format!(
                    "opening {url} timed out"
                )))
            }
        };
        debug!("WebSocket open to {url}; sending handshake");

        let channel = WsAgentChannel::start(stream, self.request_timeout);
        match channel.request(handshake).await {
            Ok(Value::Bool(false)) => {
                channel.close().await;
                Err(PrintError::ConnectionRejected(
                    "agent refused the certificate".to_string(),
                ))
            }
            Ok(_) => {
                info!("handshake with print agent at {handle} accepted");
                Ok(Arc::new(channel))
            }
            Err(e) => {
                channel.close().await;
                Err(PrintError::ConnectionRejected(format!(
                    "handshake failed: {e}"
                )))
            }
        }
    }
}

// ── Channel ───────────────────────────────────────────────────────────────────

pub struct WsAgentChannel {
    sink: Mutex<SplitSink<WsStream, WsMessage>>,
    pending: PendingReplies,
    active: Arc<AtomicBool>,
    reader: JoinHandle<()>,
    request_timeout: Duration,
}

impl WsAgentChannel {
    /// Takes ownership of an open socket and starts the reader task.
    pub fn start(stream: WsStream, request_timeout: Duration) -> Self {
        let (sink, source) = stream.split();
        let pending: PendingReplies = Arc::new(Mutex::new(HashMap::new()));
        let active = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_replies(
            source,
            Arc::clone(&pending),
            Arc::clone(&active),
        ));
        Self {
            sink: Mutex::new(sink),
            pending,
            active,
            reader,
            request_timeout,
        }
    }

    /// Sends `request` and waits for the reply carrying the same uid.
    pub async fn request(&self, request: AgentRequest) -> Result<Value, CallError> {
        if !self.is_active() {
            return Err(CallError::Closed);
        }
        let frame = request
            .encode()
            .map_err(|e| CallError::Encode(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(request.uid.clone(), tx);
        // The reader may have shut down between the check above and the insert.
        if !self.is_active() {
            self.pending.lock().await.remove(&request.uid);
            return Err(CallError::Closed);
        }

        debug!(call = %request.call, uid = %request.uid, "sending agent request");
        if let Err(e) = self.sink.lock().await.send(WsMessage::Text(frame)).await {
            warn!("writing to agent failed: {e}");
            self.pending.lock().await.remove(&request.uid);
            self.active.store(false, Ordering::SeqCst);
            return Err(CallError::Closed);
        }

        match timeout(self.request_timeout, rx).await {
            Ok(Ok(reply)) => reply.into_result().map_err(CallError::Agent),
            Ok(Err(_)) => Err(CallError::Closed),
            Err(_) => {
                self.pending.lock().await.remove(&request.uid);
                Err(CallError::TimedOut(self.request_timeout))
            }
        }
    }
}

#[async_trait]
impl AgentChannel for WsAgentChannel {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && !self.reader.is_finished()
    }

    async fn call(&self, call: AgentCall, params: Value) -> Result<Value, CallError> {
        self.request(AgentRequest::new(call, params)).await
    }

    async fn close(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.sink.lock().await.close().await {
            debug!("closing agent socket: {e}");
        }
        self.reader.abort();
        self.pending.lock().await.clear();
    }
}

impl Drop for WsAgentChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Reader task: routes replies to their waiters until the socket closes.
async fn read_replies(
    mut source: SplitStream<WsStream>,
    pending: PendingReplies,
    active: Arc<AtomicBool>,
) {
    while let Some(frame) = source.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => match AgentReply::decode(&text) {
                Ok(reply) => {
                    let waiter = pending.lock().await.remove(&reply.uid);
                    match waiter {
                        Some(tx) => {
                            // The caller may have timed out and gone away.
                            let _ = tx.send(reply);
                        }
                        None => debug!(uid = %reply.uid, "ignoring reply with unknown uid"),
                    }
                }
                Err(e) => debug!("ignoring frame that is not a reply: {e}"),
            },
            Ok(WsMessage::Close(_)) => {
                info!("print agent closed the channel");
                break;
            }
            // Ping/pong is answered by tungstenite itself.
            Ok(_) => {}
            Err(e) => {
                error!("agent channel read failed: {e}");
                break;
            }
        }
    }

    active.store(false, Ordering::SeqCst);
    pending.lock().await.clear();
}
