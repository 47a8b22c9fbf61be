use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::call::Call;
use crate::envelope::Outcome;
use crate::envelope::RequestEnvelope;
use crate::envelope::ResponseEnvelope;
use crate::error::RpcError;
use crate::frame::read_frame;
use crate::frame::write_frame;
use crate::frame::DEFAULT_MAX_FRAME_BYTES;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host:port` of the server.
    pub address: String,
    /// Upper bound on waiting for a response once the request is written.
    pub request_timeout: Duration,
    /// Upper bound on establishing a connection.
    pub connect_timeout: Duration,
    pub max_frame_bytes: usize,
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Multiplexing RPC client.
///
/// Holds at most one connection, opened on first use and replaced on the next call after it
/// is lost. Each call makes exactly one attempt: there are no retries.
pub struct RpcClient {
    config: ClientConfig,
    connection: Mutex<Option<Arc<Connection>>>,
    next_correlation_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(None),
            next_correlation_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a typed request and decode its typed response.
    ///
    /// # Arguments
    /// * `request` - Payload; its `Call::PATTERN` selects the server handler
    ///
    /// # Returns
    /// Decoded `Call::Response`
    ///
    /// # Errors
    /// * `Remote` - Server handler reported a domain error
    /// * `Timeout` - No response within `request_timeout`
    /// * `ServiceUnavailable` - Connection could not be opened or was lost mid-call
    /// * `Encode` / `Decode` - Payload or response did not match the expected shape
    pub async fn call<C: Call>(&self, request: &C) -> Result<C::Response, RpcError> {
        let payload =
            serde_json::to_value(request).map_err(|e| RpcError::Encode(e.to_string()))?;
        let value = self.send(C::PATTERN, payload).await?;
        serde_json::from_value(value).map_err(|e| RpcError::Decode(e.to_string()))
    }

    /// Send a raw pattern + payload and wait for the matching response.
    ///
    /// # Errors
    /// Same as [`RpcClient::call`], minus response decoding.
    pub async fn send(&self, pattern: &str, payload: Value) -> Result<Value, RpcError> {
        let correlation_id = self.next_correlation_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RequestEnvelope {
            correlation_id,
            pattern: pattern.to_string(),
            payload,
        };
        let bytes = envelope
            .to_bytes()
            .map_err(|e| RpcError::Encode(e.to_string()))?;
        if bytes.len() > self.config.max_frame_bytes {
            return Err(RpcError::Encode(format!(
                "request of {} bytes exceeds limit of {} bytes",
                bytes.len(),
                self.config.max_frame_bytes
            )));
        }

        let connection = self.connection().await?;
        let receiver = connection.register(correlation_id).await?;

        if let Err(e) = connection.write(&bytes).await {
            tracing::error!(
                address = %self.config.address,
                pattern,
                correlation_id,
                error = %e,
                "Failed to write request"
            );
            connection.close().await;
            return Err(RpcError::ServiceUnavailable(e.to_string()));
        }

        tracing::debug!(pattern, correlation_id, "Request sent");

        match tokio::time::timeout(self.config.request_timeout, receiver).await {
            Ok(Ok(Outcome::Ok(value))) => Ok(value),
            Ok(Ok(Outcome::Err(error))) => Err(RpcError::Remote(error)),
            Ok(Err(_)) => Err(RpcError::ServiceUnavailable(
                "connection lost before response".to_string(),
            )),
            Err(_) => {
                connection.forget(correlation_id).await;
                tracing::warn!(
                    pattern,
                    correlation_id,
                    timeout_ms = self.config.request_timeout.as_millis(),
                    "Request timed out"
                );
                Err(RpcError::Timeout(self.config.request_timeout))
            }
        }
    }

    async fn connection(&self) -> Result<Arc<Connection>, RpcError> {
        let mut current = self.connection.lock().await;
        if let Some(connection) = current.as_ref() {
            if !connection.is_closed() {
                return Ok(Arc::clone(connection));
            }
        }

        let connection = Arc::new(Connection::open(&self.config).await?);
        *current = Some(Arc::clone(&connection));
        Ok(connection)
    }
}

#[derive(Default)]
struct PendingRequests {
    closed: bool,
    slots: HashMap<u64, oneshot::Sender<Outcome>>,
}

struct Connection {
    writer: Mutex<OwnedWriteHalf>,
    pending: Arc<Mutex<PendingRequests>>,
    closed: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl Connection {
    async fn open(config: &ClientConfig) -> Result<Self, RpcError> {
        let stream =
            tokio::time::timeout(config.connect_timeout, TcpStream::connect(&config.address))
                .await
                .map_err(|_| {
                    RpcError::ServiceUnavailable(format!(
                        "connecting to {} timed out",
                        config.address
                    ))
                })?
                .map_err(|e| {
                    RpcError::ServiceUnavailable(format!(
                        "connecting to {} failed: {}",
                        config.address, e
                    ))
                })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Could not disable Nagle's algorithm");
        }

        tracing::info!(address = %config.address, "Connected to RPC server");

        let (read_half, write_half) = stream.into_split();
        let pending = Arc::new(Mutex::new(PendingRequests::default()));
        let closed = Arc::new(AtomicBool::new(false));

        let reader = tokio::spawn(read_responses(
            read_half,
            Arc::clone(&pending),
            Arc::clone(&closed),
            config.max_frame_bytes,
            config.address.clone(),
        ));

        Ok(Self {
            writer: Mutex::new(write_half),
            pending,
            closed,
            reader,
        })
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn register(
        &self,
        correlation_id: u64,
    ) -> Result<oneshot::Receiver<Outcome>, RpcError> {
        let mut pending = self.pending.lock().await;
        if pending.closed {
            return Err(RpcError::ServiceUnavailable(
                "connection closed".to_string(),
            ));
        }

        let (sender, receiver) = oneshot::channel();
        pending.slots.insert(correlation_id, sender);
        Ok(receiver)
    }

    async fn forget(&self, correlation_id: u64) {
        self.pending.lock().await.slots.remove(&correlation_id);
    }

    async fn write(&self, bytes: &[u8]) -> Result<(), crate::frame::FrameError> {
        let mut writer = self.writer.lock().await;
        write_frame(&mut *writer, bytes).await
    }

    async fn close(&self) {
        self.reader.abort();
        fail_pending(&self.pending, &self.closed).await;
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_responses(
    mut reader: OwnedReadHalf,
    pending: Arc<Mutex<PendingRequests>>,
    closed: Arc<AtomicBool>,
    max_frame_bytes: usize,
    address: String,
) {
    loop {
        let frame = match read_frame(&mut reader, max_frame_bytes).await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::warn!(address = %address, "Connection closed by server");
                break;
            }
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Failed to read response frame");
                break;
            }
        };

        let response = match ResponseEnvelope::from_bytes(&frame) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Undecodable response envelope");
                break;
            }
        };

        let slot = pending.lock().await.slots.remove(&response.correlation_id);
        match slot {
            Some(sender) => {
                if sender.send(response.outcome).is_err() {
                    tracing::debug!(
                        correlation_id = response.correlation_id,
                        "Caller went away before response arrived"
                    );
                }
            }
            None => tracing::debug!(
                correlation_id = response.correlation_id,
                "Discarding response with no pending request"
            ),
        }
    }

    fail_pending(&pending, &closed).await;
}

/// Mark the connection closed and drop every pending sender so waiters fail immediately.
async fn fail_pending(pending: &Mutex<PendingRequests>, closed: &AtomicBool) {
    let mut pending = pending.lock().await;
    pending.closed = true;
    closed.store(true, Ordering::SeqCst);

    let dropped = pending.slots.len();
    pending.slots.clear();
    if dropped > 0 {
        tracing::warn!(dropped, "Failing pending requests after connection loss");
    }
}
