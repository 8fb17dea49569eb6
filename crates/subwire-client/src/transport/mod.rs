//! Transport layer (WebSocket).
//!
//! Exposes the frame connection seam, the dialers that establish it, and the
//! ephemeral loopback server used to reach an in-process handler.

pub mod codec;
pub mod connection;
pub mod dialer;
pub mod server;

pub use connection::{FrameConnection, WsConnection};
pub use dialer::{DialTarget, Dialer, Link, LoopbackDialer, UrlDialer};
pub use server::EphemeralServer;
