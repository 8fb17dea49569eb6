//! Request construction: a builder mutated by an ordered list of options.
//!
//! Client-wide options run first, then per-call options, so a per-call option
//! always has the last word.

use base64::Engine;
use http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use subwire_core::error::{Result, SubwireError};
use subwire_core::protocol::Request;

/// Outgoing request plus the transport-level bits options may touch.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub request: Request,
    pub path: String,
    pub headers: HeaderMap,
}

impl RequestBuilder {
    pub fn new(query: impl Into<String>, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            request: Request::new(query),
            path: path.into(),
            headers,
        }
    }

    /// Apply `client` options, then `call` options, in order.
    pub fn apply<'a>(
        mut self,
        client: impl IntoIterator<Item = &'a RequestOption>,
        call: impl IntoIterator<Item = &'a RequestOption>,
    ) -> Result<Self> {
        for option in client.into_iter().chain(call) {
            option.apply(&mut self)?;
        }
        Ok(self)
    }
}

/// A single mutation of the outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOption {
    /// The value, or why it could not be serialized.
    Var(String, std::result::Result<Value, String>),
    OperationName(String),
    Path(String),
    Header(String, String),
    BasicAuth { user: String, password: String },
    Cookie { name: String, value: String },
}

impl RequestOption {
    /// Set a variable. A value that fails to serialize is reported as an
    /// `Encode` error when the option is applied.
    pub fn var(name: impl Into<String>, value: impl Serialize) -> Self {
        RequestOption::Var(
            name.into(),
            serde_json::to_value(value).map_err(|e| e.to_string()),
        )
    }

    pub fn operation_name(name: impl Into<String>) -> Self {
        RequestOption::OperationName(name.into())
    }

    pub fn path(path: impl Into<String>) -> Self {
        RequestOption::Path(path.into())
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Header(name.into(), value.into())
    }

    pub fn basic_auth(user: impl Into<String>, password: impl Into<String>) -> Self {
        RequestOption::BasicAuth {
            user: user.into(),
            password: password.into(),
        }
    }

    pub fn cookie(name: impl Into<String>, value: impl Into<String>) -> Self {
        RequestOption::Cookie {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn apply(&self, builder: &mut RequestBuilder) -> Result<()> {
        match self {
            RequestOption::Var(name, Ok(value)) => {
                builder.request.variables.insert(name.clone(), value.clone());
            }
            RequestOption::Var(name, Err(e)) => {
                return Err(SubwireError::Encode(format!("variable `{name}`: {e}")));
            }
            RequestOption::OperationName(name) => {
                builder.request.operation_name = Some(name.clone());
            }
            RequestOption::Path(path) => {
                builder.path = path.clone();
            }
            RequestOption::Header(name, value) => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| SubwireError::Encode(format!("header name: {e}")))?;
                builder.headers.append(name, header_value(value)?);
            }
            RequestOption::BasicAuth { user, password } => {
                let token = base64::engine::general_purpose::STANDARD
                    .encode(format!("{user}:{password}"));
                builder
                    .headers
                    .insert(AUTHORIZATION, header_value(&format!("Basic {token}"))?);
            }
            RequestOption::Cookie { name, value } => {
                let pair = format!("{name}={value}");
                let joined = match builder.headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                    Some(existing) => format!("{existing}; {pair}"),
                    None => pair,
                };
                builder.headers.insert(COOKIE, header_value(&joined)?);
            }
        }
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| SubwireError::Encode(format!("header value: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn call_options_run_after_client_options() {
        let client = [RequestOption::path("/a"), RequestOption::var("n", 1)];
        let call = [RequestOption::path("/b"), RequestOption::var("n", 2)];

        let b = RequestBuilder::new("{ping}", "/")
            .apply(&client, &call)
            .unwrap();

        assert_eq!(b.path, "/b");
        assert_eq!(b.request.variables["n"], json!(2));
        assert_eq!(b.headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn auth_and_cookies() {
        let call = [
            RequestOption::basic_auth("user", "pass"),
            RequestOption::cookie("a", "1"),
            RequestOption::cookie("b", "2"),
            RequestOption::operation_name("Ping"),
        ];
        let b = RequestBuilder::new("{ping}", "/").apply([], &call).unwrap();

        assert_eq!(b.headers[AUTHORIZATION], "Basic dXNlcjpwYXNz");
        assert_eq!(b.headers[COOKIE], "a=1; b=2");
        assert_eq!(b.request.operation_name.as_deref(), Some("Ping"));
    }

    #[test]
    fn unserializable_variable_is_an_encode_error() {
        use std::collections::HashMap;

        let mut by_pair: HashMap<(i32, i32), i32> = HashMap::new();
        by_pair.insert((1, 2), 3);
        let call = [RequestOption::var("bad", by_pair)];

        let err = RequestBuilder::new("{ping}", "/").apply([], &call).unwrap_err();
        assert_eq!(err.code().as_str(), "ENCODE");
        assert!(err.to_string().contains("`bad`"), "{err}");
    }

    #[test]
    fn invalid_header_is_an_encode_error() {
        let call = [RequestOption::header("bad header", "x")];
        let err = RequestBuilder::new("{ping}", "/").apply([], &call).unwrap_err();
        assert_eq!(err.code().as_str(), "ENCODE");
    }
}
