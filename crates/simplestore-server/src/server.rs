use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use simplestore_store::{FileStore, StoreRoot};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// simplestore HTTP server.
pub struct StoreServer {
    config: ServerConfig,
}

impl StoreServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the store root and build the router (useful for testing).
    pub async fn router(&self) -> ServerResult<axum::Router> {
        let root = StoreRoot::open(&self.config.store_root).await?;
        Ok(self.router_for(root))
    }

    fn router_for(&self, root: StoreRoot) -> axum::Router {
        let state = Arc::new(AppState::new(FileStore::new(root)));
        build_router(state, &self.config.base_path)
    }

    /// Open the store root, bind the listener and start serving in the
    /// background.
    pub async fn start(self) -> ServerResult<RunningServer> {
        let root = StoreRoot::open(&self.config.store_root).await?;
        let app = self.router_for(root.clone());
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(
            "simplestore listening on {}{} (root: {})",
            local_addr,
            self.config.base_path,
            root.path().display()
        );

        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
        });

        Ok(RunningServer {
            local_addr,
            root,
            shutdown,
            task,
        })
    }
}

/// Start a server for `config`.
pub async fn start(config: ServerConfig) -> ServerResult<RunningServer> {
    StoreServer::new(config).start().await
}

/// Handle to a started server.
pub struct RunningServer {
    local_addr: SocketAddr,
    root: StoreRoot,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn root(&self) -> &StoreRoot {
        &self.root
    }

    /// Stop accepting connections, let in-flight requests finish, and wait
    /// for the server task to exit.
    pub async fn stop(self) -> ServerResult<()> {
        let _ = self.shutdown.send(());
        self.task
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;
        tracing::info!("simplestore on {} stopped", self.local_addr);
        Ok(())
    }
}
