use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start server within {0:?}")]
    StartTimeout(Duration),

    #[error("server did not stop within {0:?}")]
    StopTimeout(Duration),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task panicked: {0}")]
    Join(String),
}

/// A server running on a background tokio task.
///
/// Lets a process serve HTTP while doing other work. Dropping the handle
/// asks the server to shut down without waiting for it.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServerHandle {
    /// Bind `host:port` and start serving `app`. Port 0 picks a free port;
    /// read it back with [`ServerHandle::bound_port`].
    pub async fn start(
        app: Router,
        host: &str,
        port: u16,
        start_timeout: Duration,
    ) -> Result<Self, ServerError> {
        let addr = format!("{}:{}", host, port);
        debug!(addr = %addr, "Waiting for server to bind");

        let listener = match tokio::time::timeout(start_timeout, TcpListener::bind(&addr)).await {
            Ok(Ok(listener)) => listener,
            Ok(Err(source)) => return Err(ServerError::Bind { addr, source }),
            Err(_) => return Err(ServerError::StartTimeout(start_timeout)),
        };

        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // sender dropped counts as a shutdown request too
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(addr = %local_addr, "Server listening");

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Port the server actually bound
    pub fn bound_port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Shut down gracefully, waiting up to `wait_timeout` for in-flight
    /// requests. The task is aborted if it has not finished by then.
    pub async fn stop(mut self, wait_timeout: Duration) -> Result<(), ServerError> {
        self.signal_shutdown();

        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(wait_timeout, &mut task).await {
            Ok(Ok(Ok(()))) => {
                info!(addr = %self.local_addr, "Server stopped");
                Ok(())
            }
            Ok(Ok(Err(e))) => Err(ServerError::Serve(e)),
            Ok(Err(join_err)) => Err(ServerError::Join(join_err.to_string())),
            Err(_) => {
                error!(
                    addr = %self.local_addr,
                    wait_timeout_ms = wait_timeout.as_millis() as u64,
                    "Server did not stop in time, aborting"
                );
                task.abort();
                Err(ServerError::StopTimeout(wait_timeout))
            }
        }
    }

    fn signal_shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.signal_shutdown();
    }
}
