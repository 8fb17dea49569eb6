//! subwire client library.
//!
//! Wires the configuration, request options, transport collaborators and the
//! subscription session (handshake, operation channel, handle) into a client
//! that talks to an in-process request handler or a remote endpoint.
//!
//! Everything is pull-driven: frames are read only when the consumer awaits
//! `Subscription::next`. The only spawned task is the ephemeral loopback
//! server, and it lives exactly as long as the subscription that created it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod config;
pub mod options;
pub mod session;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use options::{RequestBuilder, RequestOption};
pub use session::{Subscription, SubscriptionState};
