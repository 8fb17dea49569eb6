//! Request (`start` payload) and response (`data` payload) shapes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::error::{Result, SubwireError};
use crate::remote::RemoteError;
use crate::strict;

/// Outgoing operation. Serialized exactly once into the `start` payload
/// (or the request body for request/response transport).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub query: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(
        rename = "operationName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_name: Option<String>,
}

impl Request {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn to_payload(&self) -> Result<Box<RawValue>> {
        serde_json::value::to_raw_value(self)
            .map_err(|e| SubwireError::Encode(format!("request: {e}")))
    }
}

/// One result produced per `data` frame.
///
/// `data` stays opaque until delivered into a destination; `errors` stays raw
/// until someone asks the adapter for structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
    #[serde(default)]
    pub errors: Option<Box<RawValue>>,
    #[serde(default)]
    pub extensions: Option<Map<String, Value>>,
}

impl Response {
    /// Parse a `data` payload. An absent payload is an empty response.
    pub fn from_payload(payload: Option<&RawValue>) -> Result<Self> {
        match payload {
            Some(raw) => serde_json::from_str(raw.get())
                .map_err(|e| SubwireError::Decode(format!("response payload: {e}"))),
            None => Ok(Self::default()),
        }
    }

    /// Remote errors, if the payload carried a non-empty `errors` value.
    pub fn remote_error(&self) -> Option<RemoteError> {
        self.errors
            .as_deref()
            .filter(|raw| !RemoteError::is_empty_payload(raw))
            .map(RemoteError::from_errors)
    }

    /// Deliver `data` into `dest`, then classify.
    ///
    /// Decoding always happens first so partial data is never withheld:
    /// a decode failure wins over remote errors, remote errors win over success.
    pub fn deliver_into<T>(&self, dest: &mut T) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let decoded = match self.data.as_deref() {
            Some(raw) if raw.get() != "null" => strict::decode_into(raw, dest),
            _ => Ok(()),
        };
        let remote = self.remote_error();

        match (decoded, remote) {
            (Err(e), remote) => {
                if remote.is_some() {
                    tracing::debug!(error = %e, "decode failure shadows remote errors");
                }
                Err(e)
            }
            (Ok(()), Some(remote)) => Err(SubwireError::Remote(remote)),
            (Ok(()), None) => Ok(()),
        }
    }
}
