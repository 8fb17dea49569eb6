//! Remote error adapter.
//!
//! Wraps whatever the server reported (a `data` frame's `errors` value or a
//! standalone `error` frame) without reinterpreting it, and offers a
//! structured view on demand.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{Result, SubwireError};

/// Where the remote error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOrigin {
    /// `errors` field of a `data` payload.
    DataErrors,
    /// Payload of an `error` frame.
    ErrorFrame,
}

/// Server-reported error carrying the raw payload.
#[derive(Debug, Clone)]
pub struct RemoteError {
    origin: RemoteOrigin,
    raw: Option<Box<RawValue>>,
    message: String,
}

impl RemoteError {
    /// Errors reported inside a `data` payload. Displays as the raw JSON.
    pub fn from_errors(raw: &RawValue) -> Self {
        Self {
            origin: RemoteOrigin::DataErrors,
            message: raw.get().to_string(),
            raw: Some(raw.to_owned()),
        }
    }

    /// Payload of an `error` frame. A JSON string displays as its contents,
    /// anything else as its raw text.
    pub fn from_error_frame(payload: Option<&RawValue>) -> Self {
        let message = match payload {
            Some(raw) => match serde_json::from_str::<String>(raw.get()) {
                Ok(text) => text,
                Err(_) => raw.get().to_string(),
            },
            None => String::new(),
        };
        Self {
            origin: RemoteOrigin::ErrorFrame,
            raw: payload.map(ToOwned::to_owned),
            message,
        }
    }

    /// `null` and `[]` carry no errors.
    pub fn is_empty_payload(raw: &RawValue) -> bool {
        match serde_json::from_str::<Value>(raw.get()) {
            Ok(Value::Null) => true,
            Ok(Value::Array(items)) => items.is_empty(),
            _ => false,
        }
    }

    pub fn origin(&self) -> RemoteOrigin {
        self.origin
    }

    /// Raw payload text exactly as received (empty if the frame had none).
    pub fn raw(&self) -> &str {
        self.raw.as_deref().map(RawValue::get).unwrap_or("")
    }

    /// Message text: string contents for `error` frames, raw JSON otherwise.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured view of the payload.
    ///
    /// Accepts a list of error objects, a single error object, or a bare
    /// string (turned into one entry).
    pub fn entries(&self) -> Result<Vec<RemoteErrorEntry>> {
        let Some(raw) = self.raw.as_deref() else {
            return Ok(Vec::new());
        };
        let value: Value = serde_json::from_str(raw.get())
            .map_err(|e| SubwireError::Decode(format!("remote errors: {e}")))?;
        let entries = match value {
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<_>, _>>(),
            Value::String(message) => Ok(vec![RemoteErrorEntry::message(message)]),
            other => serde_json::from_value(other).map(|e| vec![e]),
        };
        entries.map_err(|e| SubwireError::Decode(format!("remote errors: {e}")))
    }

    /// All entry messages joined with `; `, falling back to the raw text.
    pub fn summary(&self) -> String {
        match self.entries() {
            Ok(entries) if !entries.is_empty() => entries
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RemoteError {}

/// One entry of a remote error list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl RemoteErrorEntry {
    fn message(message: String) -> Self {
        Self {
            message,
            locations: Vec::new(),
            path: None,
            extensions: None,
        }
    }
}

/// Position in the query document (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// A segment of an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}
