//! Connection-establishing collaborators.
//!
//! A `Dialer` turns a target (path + headers) into a `Link`: the frame
//! connection plus whatever ephemeral resources were opened to reach it. The
//! link owns both for the whole subscription lifetime and releases them
//! together, exactly once.

use async_trait::async_trait;
use axum::Router;
use http::header::{CONNECTION, HOST, SEC_WEBSOCKET_PROTOCOL, UPGRADE};
use http::{HeaderMap, HeaderValue};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

use subwire_core::error::{Result, SubwireError};

use crate::transport::connection::{FrameConnection, WsConnection};
use crate::transport::server::EphemeralServer;

/// Where to connect and with which headers.
#[derive(Debug, Clone, Default)]
pub struct DialTarget {
    pub path: String,
    pub headers: HeaderMap,
    pub subprotocol: Option<String>,
}

/// Connection plus the resources that share its lifetime.
pub struct Link {
    conn: Box<dyn FrameConnection>,
    server: Option<EphemeralServer>,
    released: bool,
}

impl Link {
    pub fn new(conn: Box<dyn FrameConnection>) -> Self {
        Self {
            conn,
            server: None,
            released: false,
        }
    }

    pub fn with_server(mut self, server: EphemeralServer) -> Self {
        self.server = Some(server);
        self
    }

    pub fn conn(&mut self) -> &mut dyn FrameConnection {
        self.conn.as_mut()
    }

    pub fn server(&self) -> Option<&EphemeralServer> {
        self.server.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Stop the server, then close the connection. Second and later calls
    /// are no-ops.
    pub async fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        if let Some(server) = self.server.as_mut() {
            server.shutdown().await;
        }
        self.conn.close().await
    }
}

/// Establishes frame connections.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, target: &DialTarget) -> Result<Link>;
}

/// Serves an in-process handler on an ephemeral loopback port and dials it.
#[derive(Clone)]
pub struct LoopbackDialer {
    handler: Router,
}

impl LoopbackDialer {
    pub fn new(handler: Router) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Dialer for LoopbackDialer {
    async fn dial(&self, target: &DialTarget) -> Result<Link> {
        let mut server = EphemeralServer::spawn(self.handler.clone()).await?;
        let url = format!("ws://{}{}", server.local_addr(), target.path);

        match connect(&url, target).await {
            Ok(conn) => Ok(Link::new(Box::new(conn)).with_server(server)),
            Err(e) => {
                server.shutdown().await;
                Err(e)
            }
        }
    }
}

/// Dials a remote endpoint; the target path is appended to the base URL.
#[derive(Debug, Clone)]
pub struct UrlDialer {
    base: String,
}

impl UrlDialer {
    /// `base` is a `ws://` or `wss://` origin such as `wss://api.example.com`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Dialer for UrlDialer {
    async fn dial(&self, target: &DialTarget) -> Result<Link> {
        let url = format!("{}{}", self.base, target.path);
        let conn = connect(&url, target).await?;
        Ok(Link::new(Box::new(conn)))
    }
}

/// Open a websocket to `url`, forwarding the target's headers.
pub async fn connect(url: &str, target: &DialTarget) -> Result<WsConnection> {
    let mut request = url
        .into_client_request()
        .map_err(|e| SubwireError::Dial(e.to_string()))?;

    // the websocket handshake owns these
    for (name, value) in target.headers.iter() {
        if name == HOST
            || name == CONNECTION
            || name == UPGRADE
            || name.as_str().starts_with("sec-websocket-")
        {
            continue;
        }
        request.headers_mut().append(name.clone(), value.clone());
    }
    if let Some(proto) = target.subprotocol.as_deref() {
        let value = HeaderValue::from_str(proto).map_err(|e| SubwireError::Dial(e.to_string()))?;
        request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
    }

    let (stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| SubwireError::Dial(e.to_string()))?;
    tracing::debug!(%url, "websocket connected");
    Ok(WsConnection::new(stream))
}
