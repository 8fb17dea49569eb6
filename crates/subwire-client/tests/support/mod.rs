//! Scripted transport shared by the session tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use subwire_client::transport::{DialTarget, Dialer, FrameConnection, Link};
use subwire_core::error::{Result, SubwireError};

/// What the test can observe after the connection is gone.
#[derive(Debug, Default)]
pub struct Probe {
    pub sent: Mutex<Vec<String>>,
    pub closes: AtomicUsize,
    pub dials: AtomicUsize,
    pub target: Mutex<Option<DialTarget>>,
}

impl Probe {
    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Replays canned inbound frames; reports a read error once they run out.
pub struct ScriptedConnection {
    inbound: VecDeque<Bytes>,
    probe: Arc<Probe>,
}

#[async_trait]
impl FrameConnection for ScriptedConnection {
    async fn send(&mut self, text: String) -> Result<()> {
        self.probe.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Bytes> {
        self.inbound
            .pop_front()
            .ok_or_else(|| SubwireError::Read("script exhausted".into()))
    }

    async fn close(&mut self) -> Result<()> {
        self.probe.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one scripted connection.
pub struct ScriptedDialer {
    script: Mutex<Option<Vec<String>>>,
    pub probe: Arc<Probe>,
}

impl ScriptedDialer {
    pub fn new<S: Into<String>>(frames: impl IntoIterator<Item = S>) -> Self {
        Self {
            script: Mutex::new(Some(frames.into_iter().map(Into::into).collect())),
            probe: Arc::new(Probe::default()),
        }
    }

    /// Handshake frames followed by `frames`.
    pub fn streaming<S: Into<String>>(frames: impl IntoIterator<Item = S>) -> Self {
        let mut all: Vec<String> = vec![ACK.into(), KA.into()];
        all.extend(frames.into_iter().map(Into::into));
        Self::new(all)
    }
}

#[async_trait]
impl Dialer for ScriptedDialer {
    async fn dial(&self, target: &DialTarget) -> Result<Link> {
        self.probe.dials.fetch_add(1, Ordering::SeqCst);
        *self.probe.target.lock().unwrap() = Some(target.clone());
        let frames = self
            .script
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| SubwireError::Dial("already dialed".into()))?;
        Ok(Link::new(Box::new(ScriptedConnection {
            inbound: frames.into_iter().map(Bytes::from).collect(),
            probe: self.probe.clone(),
        })))
    }
}

/// Dialer that never connects.
pub struct RefusingDialer;

#[async_trait]
impl Dialer for RefusingDialer {
    async fn dial(&self, _target: &DialTarget) -> Result<Link> {
        Err(SubwireError::Dial("connection refused".into()))
    }
}

pub const ACK: &str = r#"{"type":"connection_ack"}"#;
pub const KA: &str = r#"{"type":"ka"}"#;

pub fn data(payload: &str) -> String {
    format!(r#"{{"type":"data","id":"1","payload":{payload}}}"#)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
