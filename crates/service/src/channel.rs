//! Request/reply channel over ZeroMQ REQ/REP sockets.
//!
//! The REP socket only accepts the next request after the previous reply
//! has been sent, which is exactly the one-at-a-time discipline the
//! dispatcher requires — no correlation ids or identity routing needed.
//!
//! Payloads are single-frame UTF-8 JSON text in both directions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use zeromq::prelude::*;
use zeromq::{RepSocket, ReqSocket, ZmqMessage};

use crate::error::ServiceError;
use crate::transport::Transport;

/// Server side of the request/reply channel.
#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Receive the next request payload. Blocks until one arrives.
    async fn recv_request(&self) -> Result<String, ServiceError>;

    /// Send the reply to the request most recently received.
    async fn send_reply(&self, payload: String) -> Result<(), ServiceError>;
}

/// Blanket implementation so `Arc<impl ReplyChannel>` can be used directly.
#[async_trait]
impl<T: ReplyChannel + ?Sized> ReplyChannel for Arc<T> {
    async fn recv_request(&self) -> Result<String, ServiceError> {
        (**self).recv_request().await
    }

    async fn send_reply(&self, payload: String) -> Result<(), ServiceError> {
        (**self).send_reply(payload).await
    }
}

/// Client side of the request/reply channel.
#[async_trait]
pub trait RequestChannel: Send + Sync {
    /// Send a request and wait for the matching reply.
    async fn request(&self, payload: String, timeout: Duration) -> Result<String, ServiceError>;
}

/// ZeroMQ REP server bound to a [`Transport`] endpoint.
pub struct ZmqReplyServer {
    socket: Mutex<RepSocket>,
}

impl ZmqReplyServer {
    /// Bind a REP socket on the given endpoint.
    #[instrument(skip_all, fields(endpoint = %transport))]
    pub async fn bind(transport: &Transport) -> Result<Self, ServiceError> {
        transport
            .ensure_ipc_dir()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        transport
            .remove_stale_socket()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let mut socket = RepSocket::new();
        let endpoint = transport.endpoint();
        info!(endpoint = %endpoint, "binding REP socket");
        socket.bind(&endpoint).await?;

        Ok(Self {
            socket: Mutex::new(socket),
        })
    }
}

#[async_trait]
impl ReplyChannel for ZmqReplyServer {
    async fn recv_request(&self) -> Result<String, ServiceError> {
        let mut socket = self.socket.lock().await;
        let zmq_msg = socket.recv().await?;
        let payload = utf8_frame(&zmq_msg)?;
        debug!(payload_len = payload.len(), "received request");
        Ok(payload)
    }

    async fn send_reply(&self, payload: String) -> Result<(), ServiceError> {
        let mut socket = self.socket.lock().await;
        debug!(payload_len = payload.len(), "sending reply");
        socket.send(ZmqMessage::from(payload)).await?;
        Ok(())
    }
}

/// ZeroMQ REQ client for the scheduling endpoint.
///
/// REQ enforces send/recv alternation on the socket itself; the mutex
/// serializes concurrent callers onto that alternation. A timed-out
/// socket is left mid-transaction — reconnect before reusing it.
pub struct ZmqRequestClient {
    socket: Mutex<ReqSocket>,
}

impl ZmqRequestClient {
    /// Connect a REQ socket to the given endpoint.
    #[instrument(skip_all, fields(endpoint = %transport))]
    pub async fn connect(transport: &Transport) -> Result<Self, ServiceError> {
        let mut socket = ReqSocket::new();
        let endpoint = transport.endpoint();
        info!(endpoint = %endpoint, "connecting REQ socket");
        socket.connect(&endpoint).await?;

        Ok(Self {
            socket: Mutex::new(socket),
        })
    }
}

#[async_trait]
impl RequestChannel for ZmqRequestClient {
    async fn request(&self, payload: String, timeout: Duration) -> Result<String, ServiceError> {
        let mut socket = self.socket.lock().await;
        debug!(payload_len = payload.len(), "sending request");
        socket.send(ZmqMessage::from(payload)).await?;

        match tokio::time::timeout(timeout, socket.recv()).await {
            Ok(Ok(zmq_msg)) => {
                let reply = utf8_frame(&zmq_msg)?;
                debug!(payload_len = reply.len(), "received reply");
                Ok(reply)
            }
            Ok(Err(e)) => Err(ServiceError::Zmq(e)),
            Err(_) => Err(ServiceError::Timeout(timeout)),
        }
    }
}

/// Extract the single UTF-8 text frame of a request or reply.
fn utf8_frame(msg: &ZmqMessage) -> Result<String, ServiceError> {
    let frame = msg
        .get(0)
        .ok_or_else(|| ServiceError::Transport("empty message".into()))?;
    String::from_utf8(frame.to_vec())
        .map_err(|e| ServiceError::Transport(format!("payload is not UTF-8: {e}")))
}
