//! Protocol modules.
//!
//! - `frame`: the JSON envelope exchanged over the persistent stream, with the
//!   payload kept as `RawValue` for lazy parsing.
//! - `payload`: the `start` request and `data` response shapes.
//!
//! All parsers are panic-free: malformed input is reported as `SubwireError`.

pub mod frame;
pub mod payload;

pub use frame::{decode_frame, decode_raw, Frame, FrameType, RawFrame};
pub use payload::{Request, Response};
