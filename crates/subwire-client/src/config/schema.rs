use std::time::Duration;

use serde::Deserialize;
use subwire_core::error::{Result, SubwireError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub transport: TransportSection,

    #[serde(default)]
    pub session: SessionSection,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            transport: TransportSection::default(),
            session: SessionSection::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SubwireError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.transport.validate()?;
        self.session.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportSection {
    #[serde(default = "default_path")]
    pub path: String,

    /// Sent as `Sec-WebSocket-Protocol` when set.
    #[serde(default)]
    pub subprotocol: Option<String>,

    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,

    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Per-frame read deadline; unset means reads wait indefinitely.
    #[serde(default)]
    pub read_timeout_ms: Option<u64>,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            path: default_path(),
            subprotocol: None,
            dial_timeout_ms: default_dial_timeout_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            read_timeout_ms: None,
        }
    }
}

impl TransportSection {
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(SubwireError::Config(
                "transport.path must start with '/'".into(),
            ));
        }
        if !(100..=600000).contains(&self.dial_timeout_ms) {
            return Err(SubwireError::Config(
                "transport.dial_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        if !(100..=600000).contains(&self.handshake_timeout_ms) {
            return Err(SubwireError::Config(
                "transport.handshake_timeout_ms must be between 100 and 600000".into(),
            ));
        }
        if let Some(ms) = self.read_timeout_ms {
            if ms == 0 {
                return Err(SubwireError::Config(
                    "transport.read_timeout_ms must be positive when set".into(),
                ));
            }
        }
        if matches!(self.subprotocol.as_deref(), Some("")) {
            return Err(SubwireError::Config(
                "transport.subprotocol must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

fn default_path() -> String {
    "/".into()
}
fn default_dial_timeout_ms() -> u64 {
    10000
}
fn default_handshake_timeout_ms() -> u64 {
    10000
}

/// How keepalive frames are treated around the handshake and while streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeepaliveMode {
    /// Exactly `connection_ack` then `ka`; a `ka` while streaming is a violation.
    #[default]
    Strict,
    /// `ka` may show up anywhere (or not at all) and is skipped.
    Tolerant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    #[serde(default = "default_correlation_id")]
    pub correlation_id: String,

    #[serde(default)]
    pub keepalive: KeepaliveMode,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            correlation_id: default_correlation_id(),
            keepalive: KeepaliveMode::default(),
        }
    }
}

impl SessionSection {
    pub fn validate(&self) -> Result<()> {
        if self.correlation_id.is_empty() {
            return Err(SubwireError::Config(
                "session.correlation_id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_correlation_id() -> String {
    "1".into()
}
