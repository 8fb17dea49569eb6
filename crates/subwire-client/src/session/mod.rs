//! Subscription session: handshake, operation channel, and the handle the
//! consumer pulls results from.

pub mod channel;
pub mod handshake;
pub mod subscription;

pub use channel::OperationChannel;
pub use subscription::{Subscription, SubscriptionState};
