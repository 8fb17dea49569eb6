//! Frame connection seam.
//!
//! One reader and one writer, never concurrent: every call takes `&mut self`,
//! so the borrow checker enforces the sequential handshake → start → read order.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use subwire_core::error::{Result, SubwireError};

use crate::transport::codec::{classify, Inbound};

/// A bidirectional stream of text frames.
#[async_trait]
pub trait FrameConnection: Send {
    /// Send one text frame.
    async fn send(&mut self, text: String) -> Result<()>;
    /// Receive the next frame's bytes, blocking until one arrives.
    async fn recv(&mut self) -> Result<Bytes>;
    /// Close the connection. Closing twice is not an error.
    async fn close(&mut self) -> Result<()>;
}

/// WebSocket-backed connection.
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WsConnection {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self {
            stream,
            closed: false,
        }
    }
}

#[async_trait]
impl FrameConnection for WsConnection {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|e| SubwireError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Bytes> {
        loop {
            let Some(incoming) = self.stream.next().await else {
                return Err(SubwireError::Read("connection closed".into()));
            };
            let msg = incoming.map_err(|e| SubwireError::Read(e.to_string()))?;
            match classify(msg) {
                Inbound::Frame(bytes) => return Ok(bytes),
                Inbound::Control => continue,
                Inbound::Close => {
                    return Err(SubwireError::Read("connection closed by peer".into()))
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(SubwireError::Send(format!("close: {e}"))),
        }
    }
}
