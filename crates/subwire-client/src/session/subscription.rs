//! Consumer-facing subscription handle.
//!
//! State machine:
//! - `Pending` → `HandshakeInFlight` → `Streaming` on success
//! - `Pending`/`HandshakeInFlight` → `Failed` when dial, handshake or start fails
//! - `Streaming` → `Failed` when the transport breaks
//! - `Streaming` → `Closed` on `close()`
//!
//! `Closed` and `Failed` are terminal: `next()` reports the state instead of
//! blocking, and `close()` is a no-op.

use std::net::SocketAddr;

use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use subwire_core::error::{Result, Stage, SubwireError, TerminalState};
use subwire_core::protocol::Request;

use crate::config::ClientConfig;
use crate::session::channel::OperationChannel;
use crate::session::handshake;
use crate::transport::{DialTarget, Dialer, EphemeralServer, Link};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Pending,
    HandshakeInFlight,
    Streaming,
    Closed,
    Failed,
}

/// Owns the link for its whole lifetime; never shared.
pub struct Subscription {
    state: SubscriptionState,
    channel: Option<OperationChannel>,
    link: Option<Link>,
    failure: Option<String>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("state", &self.state)
            .field("channel", &self.channel)
            .field("failure", &self.failure)
            .finish()
    }
}

impl Subscription {
    /// Dial, handshake and start.
    ///
    /// Whatever was opened is released before an error is returned, so the
    /// caller never has to `close()` a subscription it did not get.
    pub async fn establish(
        dialer: &dyn Dialer,
        target: &DialTarget,
        request: &Request,
        init_payload: Option<Box<RawValue>>,
        cfg: &ClientConfig,
    ) -> Result<Self> {
        let mut sub = Self {
            state: SubscriptionState::Pending,
            channel: None,
            link: None,
            failure: None,
        };

        let mut link = tokio::time::timeout(cfg.transport.dial_timeout(), dialer.dial(target))
            .await
            .map_err(|_| SubwireError::Timeout { stage: Stage::Dial })??;

        sub.state = SubscriptionState::HandshakeInFlight;
        let channel = OperationChannel::new(
            cfg.session.correlation_id.clone(),
            cfg.session.keepalive,
        )
        .with_read_timeout(cfg.transport.read_timeout());

        let setup = async {
            tokio::time::timeout(
                cfg.transport.handshake_timeout(),
                handshake::perform(link.conn(), init_payload, cfg.session.keepalive),
            )
            .await
            .map_err(|_| SubwireError::Timeout {
                stage: Stage::Handshake,
            })??;
            channel.start(link.conn(), request).await
        };

        match setup.await {
            Ok(()) => {
                tracing::info!(id = %channel.id(), path = %target.path, "subscription streaming");
                sub.state = SubscriptionState::Streaming;
                sub.channel = Some(channel);
                sub.link = Some(link);
                Ok(sub)
            }
            Err(e) => {
                tracing::warn!(error = %e, "subscription setup failed");
                if let Err(release) = link.release().await {
                    tracing::debug!(error = %release, "release after failed setup");
                }
                Err(e)
            }
        }
    }

    /// A subscription that failed before streaming. `next()` reports `err`.
    pub fn failed(err: &SubwireError) -> Self {
        Self {
            state: SubscriptionState::Failed,
            channel: None,
            link: None,
            failure: Some(err.to_string()),
        }
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    /// Address of the ephemeral loopback server, while one is running.
    pub fn ephemeral_addr(&self) -> Option<SocketAddr> {
        self.link
            .as_ref()
            .and_then(Link::server)
            .map(EphemeralServer::local_addr)
    }

    /// Block until the next result and deliver it into `dest`.
    ///
    /// On a `data` frame with remote errors, `dest` is populated and the
    /// remote error is returned.
    pub async fn next<T>(&mut self, dest: &mut T) -> Result<()>
    where
        T: DeserializeOwned,
    {
        if self.state != SubscriptionState::Streaming {
            return Err(self.terminal_error());
        }
        let (Some(channel), Some(link)) = (self.channel.as_ref(), self.link.as_mut()) else {
            return Err(SubwireError::Terminal {
                state: TerminalState::Failed,
                reason: "streaming without a link".into(),
            });
        };

        let res = channel.read_next(link.conn(), dest).await;
        if let Err(e) = &res {
            if e.is_transport() {
                tracing::warn!(error = %e, "transport failed while streaming");
                self.state = SubscriptionState::Failed;
                self.failure = Some(e.to_string());
                if let Some(mut link) = self.link.take() {
                    if let Err(release) = link.release().await {
                        tracing::debug!(error = %release, "release after transport failure");
                    }
                }
            }
        }
        res
    }

    /// Release the connection and any ephemeral server. Safe to call again.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut link) = self.link.take() else {
            return Ok(());
        };
        if self.state == SubscriptionState::Streaming {
            self.state = SubscriptionState::Closed;
        }
        let res = link.release().await;
        tracing::info!(state = ?self.state, "subscription closed");
        res
    }

    fn terminal_error(&self) -> SubwireError {
        match self.state {
            SubscriptionState::Failed => SubwireError::Terminal {
                state: TerminalState::Failed,
                reason: self
                    .failure
                    .clone()
                    .unwrap_or_else(|| "subscription failed".into()),
            },
            SubscriptionState::Closed => SubwireError::Terminal {
                state: TerminalState::Closed,
                reason: "close() was called".into(),
            },
            other => SubwireError::Terminal {
                state: TerminalState::Failed,
                reason: format!("not streaming ({other:?})"),
            },
        }
    }
}
