//! subwire core: transport-agnostic protocol primitives for the subscription
//! transport (`connection_init` → `connection_ack` → `ka` → `start` → `data`...).
//!
//! This crate defines the wire frame codec, the request/response payloads, the
//! remote error adapter, the strict decode-into-target helper and the error
//! surface shared by the client. It carries no transport or runtime
//! dependencies so it can be reused by servers and test harnesses alike.
//!
//! # Panics
//! None. `unwrap`, `expect` and `panic!` are denied at compile time; every
//! malformed frame or payload comes back as a `SubwireError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;
pub mod remote;
pub mod strict;

/// Shared result type.
pub use error::{Result, SubwireError};
