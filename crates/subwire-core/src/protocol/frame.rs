//! Wire frame codec (text frames, one JSON envelope per frame).
//!
//! `{ "type": <string>, "id"?: <string>, "payload"?: <arbitrary> }`
//!
//! The payload is kept as `RawValue` and never interpreted here: unknown
//! fields inside it pass through untouched.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{Result, SubwireError};

/// Recognized frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// Client -> Server
    ConnectionInit,
    /// Client -> Server
    Start,
    /// Server -> Client
    ConnectionAck,
    /// Server -> Client
    KeepAlive,
    /// Server -> Client
    Data,
    /// Server -> Client
    Error,
}

impl FrameType {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameType::ConnectionInit => "connection_init",
            FrameType::Start => "start",
            FrameType::ConnectionAck => "connection_ack",
            FrameType::KeepAlive => "ka",
            FrameType::Data => "data",
            FrameType::Error => "error",
        }
    }

    /// Parse a wire `type` value. `None` for anything outside the known set.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "connection_init" => Some(FrameType::ConnectionInit),
            "start" => Some(FrameType::Start),
            "connection_ack" => Some(FrameType::ConnectionAck),
            "ka" => Some(FrameType::KeepAlive),
            "data" => Some(FrameType::Data),
            "error" => Some(FrameType::Error),
            _ => None,
        }
    }
}

/// Envelope as read off the wire, before `type` is checked against the known set.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub payload: Option<Box<RawValue>>,
}

impl RawFrame {
    /// Known frame type, if any.
    pub fn frame_type(&self) -> Option<FrameType> {
        FrameType::from_wire(&self.kind)
    }
}

/// A validated frame. Immutable once received; built fresh for each send.
#[derive(Debug, Clone)]
pub struct Frame {
    pub kind: FrameType,
    pub id: Option<String>,
    pub payload: Option<Box<RawValue>>,
}

#[derive(Serialize)]
struct WireFrame<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a RawValue>,
}

impl Frame {
    pub fn new(kind: FrameType) -> Self {
        Self {
            kind,
            id: None,
            payload: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_payload(mut self, payload: Option<Box<RawValue>>) -> Self {
        self.payload = payload;
        self
    }

    /// Serialize to a text frame, omitting absent optional fields.
    pub fn encode(&self) -> Result<String> {
        let wire = WireFrame {
            kind: self.kind.as_str(),
            id: self.id.as_deref(),
            payload: self.payload.as_deref(),
        };
        serde_json::to_string(&wire).map_err(|e| SubwireError::Encode(format!("frame: {e}")))
    }
}

/// Parse an envelope without validating `type` against the known set.
///
/// Fails with `MalformedFrame` only when the bytes are not a JSON envelope
/// with a string `type`.
pub fn decode_raw(bytes: &[u8]) -> Result<RawFrame> {
    serde_json::from_slice(bytes)
        .map_err(|e| SubwireError::MalformedFrame(format!("invalid envelope json: {e}")))
}

/// Parse an envelope and validate `type`.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame> {
    let raw = decode_raw(bytes)?;
    let kind = raw.frame_type().ok_or_else(|| {
        SubwireError::MalformedFrame(format!("unknown frame type: {}", raw.kind))
    })?;
    Ok(Frame {
        kind,
        id: raw.id,
        payload: raw.payload,
    })
}

/// Serialize any value into a payload.
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Box<RawValue>> {
    serde_json::value::to_raw_value(value).map_err(|e| SubwireError::Encode(e.to_string()))
}
