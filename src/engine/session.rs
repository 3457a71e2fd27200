//! Live session record: listener task, port, and hub.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::error;

use crate::error::Result;
use crate::server::{build_router, BroadcastHub, ServerContext};

/// One running preview session.
///
/// Created by [`Engine::start`](crate::Engine::start), consumed by
/// [`Engine::stop`](crate::Engine::stop).
pub(crate) struct PreviewSession {
    pub(crate) port: u16,
    pub(crate) hub: Arc<BroadcastHub>,
    server: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

impl PreviewSession {
    /// Bind the loopback listener on `port` and spawn the serve task.
    pub(crate) async fn spawn(root: PathBuf, port: u16) -> Result<Self> {
        let hub = Arc::new(BroadcastHub::new());
        let ctx = ServerContext {
            root,
            port,
            hub: Arc::clone(&hub),
        };
        let app = build_router(ctx);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;

        let (shutdown, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = rx.await;
            });
            if let Err(err) = serve.await {
                error!("preview server error: {err}");
            }
        });

        Ok(Self {
            port,
            hub,
            server,
            shutdown,
        })
    }

    /// Close every client connection, stop the listener, and wait for the
    /// serve task to finish. Connections close first so graceful shutdown
    /// has nothing left to wait on.
    pub(crate) async fn teardown(self) {
        self.hub.close();
        let _ = self.shutdown.send(());
        let _ = self.server.await;
    }
}
