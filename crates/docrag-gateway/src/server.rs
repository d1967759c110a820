use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use docrag_core::AppContext;
use docrag_llm::any::AnyProvider;
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub(crate) context: AppContext<AnyProvider>,
    pub(crate) upload_dir: PathBuf,
    pub(crate) started_at: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(context: AppContext<AnyProvider>, upload_dir: PathBuf) -> Self {
        Self {
            context,
            upload_dir,
            started_at: Instant::now(),
        }
    }
}

pub struct GatewayServer {
    addr: SocketAddr,
    max_body_size: usize,
    state: AppState,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(bind: &str, port: u16, state: AppState, shutdown_rx: watch::Receiver<bool>) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0, reachable from other hosts");
        }

        Self {
            addr,
            max_body_size: 52_428_800,
            state,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Start the HTTP gateway server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let router = build_router(self.state, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use docrag_core::Config;
    use docrag_llm::mock::MockProvider;

    use super::*;

    fn state() -> AppState {
        let context =
            AppContext::build(&Config::default(), AnyProvider::Mock(MockProvider::default()))
                .unwrap();
        AppState::new(context, PathBuf::from("uploads"))
    }

    #[test]
    fn server_builder_chain() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("127.0.0.1", 8000, state(), srx).with_max_body_size(512);
        assert_eq!(server.max_body_size, 512);
        assert_eq!(server.addr.port(), 8000);
    }

    #[test]
    fn server_invalid_bind_fallback() {
        let (_stx, srx) = watch::channel(false);
        let server = GatewayServer::new("not_an_ip", 9999, state(), srx);
        assert_eq!(server.addr, SocketAddr::from(([127, 0, 0, 1], 9999)));
    }
}
