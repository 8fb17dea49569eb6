//! Client entry point.
//!
//! Wraps a request handler (an axum `Router`, treated as an opaque execution
//! engine) and talks to it either over request/response (`post`) or over the
//! subscription transport on an ephemeral loopback listener (`subscribe`).

use std::sync::Arc;

use axum::body::Body;
use axum::Router;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower::ServiceExt;

use subwire_core::error::{Result, SubwireError};
use subwire_core::protocol::frame::to_payload;
use subwire_core::protocol::Response;

use crate::config::ClientConfig;
use crate::options::{RequestBuilder, RequestOption};
use crate::session::Subscription;
use crate::transport::{DialTarget, Dialer, LoopbackDialer};

#[derive(Clone)]
pub struct Client {
    handler: Router,
    options: Vec<RequestOption>,
    cfg: Arc<ClientConfig>,
}

impl Client {
    /// `options` apply to every request made with this client.
    pub fn new(handler: Router, options: impl IntoIterator<Item = RequestOption>) -> Self {
        Self {
            handler,
            options: options.into_iter().collect(),
            cfg: Arc::new(ClientConfig::default()),
        }
    }

    pub fn with_config(mut self, cfg: ClientConfig) -> Self {
        self.cfg = Arc::new(cfg);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    fn build(&self, query: &str, options: &[RequestOption]) -> Result<RequestBuilder> {
        RequestBuilder::new(query, self.cfg.transport.path.clone()).apply(&self.options, options)
    }

    // --------------------
    // Request / response
    // --------------------

    /// Run `query` through the handler and decode the body without touching
    /// `data`.
    pub async fn raw_post(&self, query: &str, options: &[RequestOption]) -> Result<Response> {
        let b = self.build(query, options)?;
        let body = serde_json::to_vec(&b.request)
            .map_err(|e| SubwireError::Encode(format!("request: {e}")))?;

        let mut req = http::Request::builder()
            .method(Method::POST)
            .uri(b.path.as_str())
            .body(Body::from(body))
            .map_err(|e| SubwireError::Encode(format!("build: {e}")))?;
        *req.headers_mut() = b.headers;

        let resp = match self.handler.clone().oneshot(req).await {
            Ok(resp) => resp,
            Err(never) => match never {},
        };
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .map_err(|e| SubwireError::Read(format!("body: {e}")))?;

        if status.as_u16() >= 400 {
            tracing::debug!(%status, "handler answered with error status");
            return Err(SubwireError::Http {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| SubwireError::Decode(format!("response: {e}")))
    }

    /// Run `query` and deliver `data` into `dest`.
    ///
    /// `dest` is populated even when the response also carries errors.
    pub async fn post<T>(&self, query: &str, dest: &mut T, options: &[RequestOption]) -> Result<()>
    where
        T: DeserializeOwned,
    {
        self.raw_post(query, options).await?.deliver_into(dest)
    }

    // --------------------
    // Subscriptions
    // --------------------

    pub async fn subscribe(&self, query: &str, options: &[RequestOption]) -> Result<Subscription> {
        self.subscribe_with_payload(query, None, options).await
    }

    /// Subscribe with `connection_init` parameters.
    pub async fn subscribe_with_payload(
        &self,
        query: &str,
        init_payload: Option<Map<String, Value>>,
        options: &[RequestOption],
    ) -> Result<Subscription> {
        let dialer = LoopbackDialer::new(self.handler.clone());
        self.subscribe_via(&dialer, query, init_payload, options)
            .await
    }

    /// Subscribe through a caller-supplied dialer.
    pub async fn subscribe_via(
        &self,
        dialer: &dyn Dialer,
        query: &str,
        init_payload: Option<Map<String, Value>>,
        options: &[RequestOption],
    ) -> Result<Subscription> {
        let b = self.build(query, options)?;
        let init = init_payload.as_ref().map(to_payload).transpose()?;
        let target = DialTarget {
            path: b.path,
            headers: b.headers,
            subprotocol: self.cfg.transport.subprotocol.clone(),
        };
        Subscription::establish(dialer, &target, &b.request, init, &self.cfg).await
    }

    /// Like `subscribe`, but never fails here: an establishment error comes
    /// back as a `Failed` subscription whose `next()` reports it.
    pub async fn websocket(&self, query: &str, options: &[RequestOption]) -> Subscription {
        self.websocket_with_payload(query, None, options).await
    }

    pub async fn websocket_with_payload(
        &self,
        query: &str,
        init_payload: Option<Map<String, Value>>,
        options: &[RequestOption],
    ) -> Subscription {
        match self
            .subscribe_with_payload(query, init_payload, options)
            .await
        {
            Ok(sub) => sub,
            Err(e) => Subscription::failed(&e),
        }
    }

    /// Grab a single result, then close.
    pub async fn websocket_once<T>(
        &self,
        query: &str,
        dest: &mut T,
        options: &[RequestOption],
    ) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let mut sub = self.subscribe(query, options).await?;
        let res = sub.next(dest).await;
        if let Err(e) = sub.close().await {
            tracing::debug!(error = %e, "close after single read");
        }
        res
    }
}
