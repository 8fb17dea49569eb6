//! subwire: one dependency for the subscription transport client.
//!
//! `subwire::core` holds the frame codec and error types, `subwire::client`
//! the client and its session machinery. The everyday types are re-exported
//! at the root.

pub mod core {
    pub use subwire_core::*;
}

pub mod client {
    pub use subwire_client::*;
}

pub use subwire_client::{Client, ClientConfig, RequestOption, Subscription, SubscriptionState};
pub use subwire_core::{Result, SubwireError};
