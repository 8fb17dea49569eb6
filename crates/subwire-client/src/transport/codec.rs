//! Classifies websocket messages before they reach the session layer.
//!
//! - Text/Binary frames => raw frame bytes (envelope parsing happens later)
//! - Ping/Pong are lifecycle noise
//! - Close ends the stream

use bytes::Bytes;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub enum Inbound {
    Frame(Bytes),
    Control,
    Close,
}

pub fn classify(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Frame(Bytes::copy_from_slice(s.as_bytes())),
        Message::Binary(b) => Inbound::Frame(b),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Control,
        Message::Close(_) => Inbound::Close,
    }
}
