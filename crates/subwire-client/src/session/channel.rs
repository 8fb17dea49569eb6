//! Operation channel: one `start` write, then a pull-based read loop.

use std::time::Duration;

use serde::de::DeserializeOwned;

use subwire_core::error::{Result, Stage, SubwireError};
use subwire_core::protocol::frame::{decode_raw, Frame, FrameType, RawFrame};
use subwire_core::protocol::{Request, Response};
use subwire_core::remote::RemoteError;

use crate::config::KeepaliveMode;
use crate::transport::FrameConnection;

#[derive(Debug, Clone)]
pub struct OperationChannel {
    id: String,
    keepalive: KeepaliveMode,
    read_timeout: Option<Duration>,
}

impl OperationChannel {
    pub fn new(id: impl Into<String>, keepalive: KeepaliveMode) -> Self {
        Self {
            id: id.into(),
            keepalive,
            read_timeout: None,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Send the `start` frame. The only write after the handshake.
    pub async fn start(&self, conn: &mut dyn FrameConnection, request: &Request) -> Result<()> {
        let frame = Frame::new(FrameType::Start)
            .with_id(self.id.clone())
            .with_payload(Some(request.to_payload()?))
            .encode()?;
        conn.send(frame).await?;
        tracing::debug!(id = %self.id, "start sent");
        Ok(())
    }

    /// Read the next result into `dest`.
    pub async fn read_next<T>(&self, conn: &mut dyn FrameConnection, dest: &mut T) -> Result<()>
    where
        T: DeserializeOwned,
    {
        loop {
            let frame = self.recv_frame(conn).await?;
            match frame.frame_type() {
                Some(FrameType::Data) => {
                    if frame.id.as_deref().is_some_and(|id| id != self.id) {
                        tracing::debug!(
                            expected = %self.id,
                            got = ?frame.id,
                            "data frame for another id"
                        );
                    }
                    let response = Response::from_payload(frame.payload.as_deref())?;
                    return response.deliver_into(dest);
                }
                Some(FrameType::KeepAlive) if self.keepalive == KeepaliveMode::Tolerant => {
                    tracing::trace!("keepalive skipped");
                }
                Some(FrameType::Error) => {
                    let remote = RemoteError::from_error_frame(frame.payload.as_deref());
                    tracing::debug!(id = %self.id, error = %remote, "error frame");
                    return Err(SubwireError::Remote(remote));
                }
                _ => {
                    tracing::warn!(got = %frame.kind, "unexpected frame while streaming");
                    return Err(SubwireError::ProtocolViolation { got: frame.kind });
                }
            }
        }
    }

    async fn recv_frame(&self, conn: &mut dyn FrameConnection) -> Result<RawFrame> {
        let bytes = match self.read_timeout {
            Some(limit) => tokio::time::timeout(limit, conn.recv())
                .await
                .map_err(|_| SubwireError::Timeout { stage: Stage::Read })??,
            None => conn.recv().await?,
        };
        decode_raw(&bytes)
    }
}
