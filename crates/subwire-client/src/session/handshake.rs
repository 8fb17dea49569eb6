//! Connection handshake: `connection_init` → `connection_ack` → `ka`.
//!
//! Strict mode reads exactly two frames in that order. Tolerant mode reads
//! until `connection_ack`, skipping keepalives, and does not wait for one
//! afterwards. Either way no `start` goes out before this returns `Ok`.

use serde_json::value::RawValue;

use subwire_core::error::{HandshakeStage, Result, SubwireError};
use subwire_core::protocol::frame::{decode_raw, Frame, FrameType};

use crate::config::KeepaliveMode;
use crate::transport::FrameConnection;

/// `got` value reported for a handshake frame that is not a JSON envelope.
pub const MALFORMED: &str = "<malformed>";

pub async fn perform(
    conn: &mut dyn FrameConnection,
    init_payload: Option<Box<RawValue>>,
    mode: KeepaliveMode,
) -> Result<()> {
    let init = Frame::new(FrameType::ConnectionInit)
        .with_payload(init_payload)
        .encode()?;
    conn.send(init).await?;
    tracing::debug!("connection_init sent");

    match mode {
        KeepaliveMode::Strict => {
            expect(conn, HandshakeStage::Ack, FrameType::ConnectionAck).await?;
            expect(conn, HandshakeStage::Keepalive, FrameType::KeepAlive).await?;
        }
        KeepaliveMode::Tolerant => loop {
            let kind = next_kind(conn, HandshakeStage::Ack).await?;
            match FrameType::from_wire(&kind) {
                Some(FrameType::ConnectionAck) => break,
                Some(FrameType::KeepAlive) => {
                    tracing::debug!("keepalive before ack skipped");
                }
                _ => {
                    return Err(SubwireError::Handshake {
                        stage: HandshakeStage::Ack,
                        got: kind,
                    })
                }
            }
        },
    }

    tracing::debug!(mode = ?mode, "handshake complete");
    Ok(())
}

async fn expect(
    conn: &mut dyn FrameConnection,
    stage: HandshakeStage,
    wanted: FrameType,
) -> Result<()> {
    let kind = next_kind(conn, stage).await?;
    if FrameType::from_wire(&kind) != Some(wanted) {
        tracing::warn!(%stage, got = %kind, "unexpected handshake frame");
        return Err(SubwireError::Handshake { stage, got: kind });
    }
    tracing::debug!(%stage, "handshake frame received");
    Ok(())
}

/// Type of the next frame. Unparseable bytes fail the handshake at `stage`.
async fn next_kind(conn: &mut dyn FrameConnection, stage: HandshakeStage) -> Result<String> {
    let bytes = conn.recv().await?;
    match decode_raw(&bytes) {
        Ok(raw) => Ok(raw.kind),
        Err(e) => {
            tracing::warn!(%stage, error = %e, "unparseable handshake frame");
            Err(SubwireError::Handshake {
                stage,
                got: MALFORMED.to_string(),
            })
        }
    }
}
