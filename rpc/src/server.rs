use std::future::Future;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::envelope::Outcome;
use crate::envelope::RequestEnvelope;
use crate::envelope::ResponseEnvelope;
use crate::error::ErrorKind;
use crate::error::RemoteError;
use crate::frame::read_frame;
use crate::frame::write_frame;
use crate::frame::DEFAULT_MAX_FRAME_BYTES;

const RESPONSE_QUEUE_DEPTH: usize = 256;

pub const RESPONSE_TOO_LARGE_MESSAGE: &str = "Response too large";

/// Server-side request handler.
///
/// Receives the pattern name and raw payload of each request; the returned value or error is
/// sent back under the request's correlation id.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handle one request.
    ///
    /// # Arguments
    /// * `pattern` - Pattern name from the request envelope
    /// * `payload` - Request payload (`null` when omitted)
    ///
    /// # Returns
    /// Result value to send back
    ///
    /// # Errors
    /// Structured error to send back; the connection stays open
    async fn handle(&self, pattern: &str, payload: Value) -> Result<Value, RemoteError>;
}

pub struct RpcServer<H: Handler> {
    handler: Arc<H>,
    max_frame_bytes: usize,
}

impl<H: Handler> RpcServer<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            handler,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    /// Accept connections until the process stops.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        self.serve_with_shutdown(listener, std::future::pending())
            .await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already accepted keep running until their peer disconnects.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("RPC server shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    tokio::spawn(serve_connection(
                        stream,
                        peer,
                        Arc::clone(&self.handler),
                        self.max_frame_bytes,
                    ));
                }
            }
        }
    }
}

async fn serve_connection<H: Handler>(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<H>,
    max_frame_bytes: usize,
) {
    tracing::info!(peer = %peer, "Connection accepted");

    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(peer = %peer, error = %e, "Could not disable Nagle's algorithm");
    }

    let (mut reader, writer) = stream.into_split();
    let (responses, queued) = mpsc::channel(RESPONSE_QUEUE_DEPTH);
    let writer_task = tokio::spawn(write_responses(writer, queued, peer, max_frame_bytes));

    loop {
        let frame = match read_frame(&mut reader, max_frame_bytes).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(peer = %peer, error = %e, "Failed to read request frame");
                break;
            }
        };

        let request = match RequestEnvelope::from_bytes(&frame) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(
                    peer = %peer,
                    error = %e,
                    "Undecodable request envelope, closing connection"
                );
                break;
            }
        };

        // One task per request so a slow handler never delays later responses.
        tokio::spawn(dispatch(Arc::clone(&handler), request, responses.clone()));
    }

    // The writer drains once every in-flight request has answered.
    drop(responses);
    if let Err(e) = writer_task.await {
        tracing::error!(peer = %peer, error = %e, "Response writer task failed");
    }

    tracing::info!(peer = %peer, "Connection closed");
}

async fn dispatch<H: Handler>(
    handler: Arc<H>,
    request: RequestEnvelope,
    responses: mpsc::Sender<ResponseEnvelope>,
) {
    let started = Instant::now();
    let RequestEnvelope {
        correlation_id,
        pattern,
        payload,
    } = request;

    let outcome = match AssertUnwindSafe(handler.handle(&pattern, payload))
        .catch_unwind()
        .await
    {
        Ok(Ok(value)) => Outcome::Ok(value),
        Ok(Err(error)) => Outcome::Err(error),
        Err(_) => {
            tracing::error!(pattern = %pattern, correlation_id, "Handler panicked");
            Outcome::Err(RemoteError::internal())
        }
    };

    tracing::debug!(
        pattern = %pattern,
        correlation_id,
        ok = matches!(outcome, Outcome::Ok(_)),
        latency_ms = started.elapsed().as_millis(),
        "Request handled"
    );

    let response = ResponseEnvelope {
        correlation_id,
        outcome,
    };
    if responses.send(response).await.is_err() {
        tracing::debug!(correlation_id, "Connection closed before response was sent");
    }
}

async fn write_responses(
    mut writer: OwnedWriteHalf,
    mut queued: mpsc::Receiver<ResponseEnvelope>,
    peer: SocketAddr,
    max_frame_bytes: usize,
) {
    while let Some(response) = queued.recv().await {
        let Some(bytes) = encode_response(&response, max_frame_bytes, peer) else {
            continue;
        };

        if let Err(e) = write_frame(&mut writer, &bytes).await {
            tracing::warn!(peer = %peer, error = %e, "Failed to write response");
            break;
        }
    }
}

/// Encode a response, replacing it with an error outcome when it cannot be sent as is.
///
/// A frame over the peer's limit would make the peer drop the whole connection, so oversized
/// results go back as an `Internal` error under the same correlation id.
fn encode_response(
    response: &ResponseEnvelope,
    max_frame_bytes: usize,
    peer: SocketAddr,
) -> Option<Vec<u8>> {
    let correlation_id = response.correlation_id;
    let fallback = match response.to_bytes() {
        Ok(bytes) if bytes.len() <= max_frame_bytes => return Some(bytes),
        Ok(bytes) => {
            tracing::error!(
                peer = %peer,
                correlation_id,
                length = bytes.len(),
                max = max_frame_bytes,
                "Response exceeds frame limit"
            );
            RemoteError::new(ErrorKind::Internal, RESPONSE_TOO_LARGE_MESSAGE)
        }
        Err(e) => {
            tracing::error!(
                peer = %peer,
                correlation_id,
                error = %e,
                "Failed to encode response"
            );
            RemoteError::internal()
        }
    };

    ResponseEnvelope {
        correlation_id,
        outcome: Outcome::Err(fallback),
    }
    .to_bytes()
    .ok()
}
