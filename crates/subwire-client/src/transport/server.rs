//! Ephemeral loopback server.
//!
//! Serves an in-process handler on `127.0.0.1:<random>` for the lifetime of
//! one subscription. Shutdown is graceful first, then the serve task is
//! aborted; dropping the server aborts it as well.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use subwire_core::error::{Result, SubwireError};

#[derive(Debug)]
pub struct EphemeralServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl EphemeralServer {
    /// Bind a fresh loopback port and start serving `handler`.
    pub async fn spawn(handler: Router) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| SubwireError::Dial(format!("listen: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| SubwireError::Dial(format!("listen: {e}")))?;

        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, handler)
                .with_graceful_shutdown(async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = served {
                tracing::warn!(error = %e, "ephemeral server stopped with error");
            }
        });

        tracing::debug!(%addr, "ephemeral server listening");
        Ok(Self {
            addr,
            shutdown: Some(tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop serving. Idempotent.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            tracing::debug!(addr = %self.addr, "ephemeral server stopped");
        }
    }
}

impl Drop for EphemeralServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
