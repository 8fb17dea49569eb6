//! Shared error type across subwire crates.

use std::fmt;

use thiserror::Error;

use crate::remote::RemoteError;

/// Machine-readable error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Stream could not be established.
    Dial,
    /// `connection_ack` / `ka` mismatch during the handshake.
    Handshake,
    /// Request or init payload could not be serialized.
    Encode,
    /// Incoming frame was not parseable or had no usable `type`.
    MalformedFrame,
    /// Frame type invalid for the current state.
    ProtocolViolation,
    /// Server-reported error.
    Remote,
    /// Payload data did not match the destination shape.
    Decode,
    /// Underlying transport read failure.
    Read,
    /// Underlying transport write failure.
    Send,
    /// A deadline elapsed.
    Timeout,
    /// Operation on a closed or failed subscription.
    Terminal,
    /// Request/response handler answered with an error status.
    Http,
    /// Invalid client configuration.
    BadConfig,
}

impl ErrorCode {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Dial => "DIAL",
            ErrorCode::Handshake => "HANDSHAKE",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::MalformedFrame => "MALFORMED_FRAME",
            ErrorCode::ProtocolViolation => "PROTOCOL_VIOLATION",
            ErrorCode::Remote => "REMOTE",
            ErrorCode::Decode => "DECODE",
            ErrorCode::Read => "READ",
            ErrorCode::Send => "SEND",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Terminal => "TERMINAL",
            ErrorCode::Http => "HTTP",
            ErrorCode::BadConfig => "BAD_CONFIG",
        }
    }
}

/// Handshake step that observed an unexpected frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    /// Waiting for `connection_ack`.
    Ack,
    /// Waiting for the first `ka`.
    Keepalive,
}

impl HandshakeStage {
    /// Frame type the stage expects.
    pub fn expected(self) -> &'static str {
        match self {
            HandshakeStage::Ack => "connection_ack",
            HandshakeStage::Keepalive => "ka",
        }
    }
}

impl fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeStage::Ack => f.write_str("ack"),
            HandshakeStage::Keepalive => f.write_str("keepalive"),
        }
    }
}

/// Blocking step a deadline was attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Dial,
    Handshake,
    Read,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Dial => f.write_str("dial"),
            Stage::Handshake => f.write_str("handshake"),
            Stage::Read => f.write_str("read"),
        }
    }
}

/// Terminal subscription states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Closed,
    Failed,
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalState::Closed => f.write_str("closed"),
            TerminalState::Failed => f.write_str("failed"),
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SubwireError>;

/// Unified error type used by core and client.
#[derive(Debug, Clone, Error)]
pub enum SubwireError {
    #[error("dial: {0}")]
    Dial(String),
    #[error("handshake: expected {} at {stage} stage, got {got}", .stage.expected())]
    Handshake { stage: HandshakeStage, got: String },
    #[error("encode: {0}")]
    Encode(String),
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("protocol violation: unexpected {got} frame")]
    ProtocolViolation { got: String },
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("decode: {0}")]
    Decode(String),
    #[error("read: {0}")]
    Read(String),
    #[error("send: {0}")]
    Send(String),
    #[error("{stage} timed out")]
    Timeout { stage: Stage },
    #[error("subscription {state}: {reason}")]
    Terminal { state: TerminalState, reason: String },
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("config: {0}")]
    Config(String),
}

impl SubwireError {
    /// Map the error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubwireError::Dial(_) => ErrorCode::Dial,
            SubwireError::Handshake { .. } => ErrorCode::Handshake,
            SubwireError::Encode(_) => ErrorCode::Encode,
            SubwireError::MalformedFrame(_) => ErrorCode::MalformedFrame,
            SubwireError::ProtocolViolation { .. } => ErrorCode::ProtocolViolation,
            SubwireError::Remote(_) => ErrorCode::Remote,
            SubwireError::Decode(_) => ErrorCode::Decode,
            SubwireError::Read(_) => ErrorCode::Read,
            SubwireError::Send(_) => ErrorCode::Send,
            SubwireError::Timeout { .. } => ErrorCode::Timeout,
            SubwireError::Terminal { .. } => ErrorCode::Terminal,
            SubwireError::Http { .. } => ErrorCode::Http,
            SubwireError::Config(_) => ErrorCode::BadConfig,
        }
    }

    /// Transport failures end a streaming subscription; everything else is
    /// reported per frame and leaves the stream usable.
    pub fn is_transport(&self) -> bool {
        matches!(self, SubwireError::Read(_) | SubwireError::Send(_))
    }

    /// The remote error, when this is one.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            SubwireError::Remote(remote) => Some(remote),
            _ => None,
        }
    }
}
