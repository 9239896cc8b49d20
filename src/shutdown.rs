//! Ordered process shutdown.
//!
//! An OS signal, a fatal error reported through [`FatalReporter`] or the
//! server task ending on its own triggers the same sequence: log the reason, stop the HTTP server and let
//! in-flight requests finish within the grace period, close storage, then
//! hand the exit status back to `main`.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::database::Storage;

/// Wait for Ctrl-C or SIGTERM.
///
/// If a handler cannot be installed the error is logged and that source
/// simply never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Why the process is going down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    Signal,
    Fatal(String),
}

impl ShutdownReason {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShutdownReason::Fatal(_))
    }

    /// Process exit status: 1 after a fatal error, 0 otherwise
    pub fn exit_status(&self) -> u8 {
        if self.is_fatal() {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownReason::Signal => write!(f, "termination signal"),
            ShutdownReason::Fatal(msg) => write!(f, "fatal error: {}", msg),
        }
    }
}

/// Handle given to tasks that may hit an unrecoverable error
#[derive(Clone)]
pub struct FatalReporter {
    tx: mpsc::UnboundedSender<String>,
}

impl FatalReporter {
    pub fn report(&self, error: impl fmt::Display) {
        let message = error.to_string();
        tracing::error!("Fatal error reported: {}", message);
        // The coordinator owns the receiver for the life of the process
        let _ = self.tx.send(message);
    }
}

pub struct ShutdownCoordinator {
    notify: broadcast::Sender<()>,
    fatal_tx: mpsc::UnboundedSender<String>,
    fatal_rx: mpsc::UnboundedReceiver<String>,
    /// HTTP server task; `None` before `watch_server` or once it has finished
    server: Option<JoinHandle<()>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        Self {
            notify,
            fatal_tx,
            fatal_rx,
            server: None,
        }
    }

    /// Subscribe to the stop notification sent during [`drain`](Self::drain)
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    pub fn fatal_reporter(&self) -> FatalReporter {
        FatalReporter {
            tx: self.fatal_tx.clone(),
        }
    }

    /// Hand over the server task. It exiting before shutdown was requested
    /// is a fatal error.
    pub fn watch_server(&mut self, server: JoinHandle<()>) {
        self.server = Some(server);
    }

    /// Tell subscribers to stop
    pub fn shutdown(&self) {
        let _ = self.notify.send(());
    }

    /// Block until an OS signal arrives, a fatal error is reported or the
    /// server task ends on its own
    pub async fn wait_for_trigger(&mut self) -> ShutdownReason {
        self.wait_for(shutdown_signal()).await
    }

    async fn wait_for(&mut self, signal: impl Future<Output = ()>) -> ShutdownReason {
        let reason = tokio::select! {
            _ = signal => ShutdownReason::Signal,
            Some(message) = self.fatal_rx.recv() => ShutdownReason::Fatal(message),
            message = server_exit(&mut self.server) => ShutdownReason::Fatal(message),
        };

        if reason.is_fatal() {
            tracing::error!("Shutting down after {}", reason);
        } else {
            tracing::info!("Shutting down after {}", reason);
        }
        reason
    }

    /// Stop the server, wait up to `grace` for it to finish, then close storage.
    ///
    /// Returns the exit status for `reason`.
    pub async fn drain(&mut self, reason: &ShutdownReason, storage: &Storage, grace: Duration) -> u8 {
        self.shutdown();

        if let Some(mut server) = self.server.take() {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(Ok(())) => tracing::info!("HTTP server stopped"),
                Ok(Err(e)) => tracing::error!("HTTP server task failed: {}", e),
                Err(_) => {
                    tracing::warn!(
                        "HTTP server did not stop within {}s, aborting in-flight requests",
                        grace.as_secs()
                    );
                    server.abort();
                }
            }
        }

        storage.close().await;

        let status = reason.exit_status();
        tracing::info!("Shutdown complete (exit status {})", status);
        status
    }
}

/// Resolves when the watched server task finishes, describing how it ended.
/// Never resolves while no task is watched.
async fn server_exit(server: &mut Option<JoinHandle<()>>) -> String {
    let result = match server.as_mut() {
        Some(handle) => handle.await,
        None => return std::future::pending().await,
    };
    // A finished JoinHandle must not be polled again
    *server = None;

    match result {
        Ok(()) => "HTTP server stopped unexpectedly".to_string(),
        Err(e) if e.is_panic() => "HTTP server task panicked".to_string(),
        Err(e) => format!("HTTP server task failed: {}", e),
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Route panic messages through `tracing` so they land in the same log stream.
///
/// Handler panics are caught by the router and answered with a 500; the
/// process keeps running.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(location = %location, "panic: {}", payload);
    }));
}
