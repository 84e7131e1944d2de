pub mod handler;
pub mod transport;

use crate::{Config, Error, Result};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub use handler::TavilyServerHandler;

pub struct Server {
    config: Arc<Config>,
    cancellation_token: CancellationToken,
}

impl Server {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting MCP server infrastructure");

        let handler = TavilyServerHandler::new(Arc::clone(&self.config))?;

        transport::validate_stdio_transport()
            .map_err(|e| Error::Service(format!("Transport validation failed: {e}")))?;

        info!("MCP server handler initialized successfully");

        let shutdown_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            shutdown_token.cancel();
        });

        info!("Starting MCP server on stdio transport");

        let server_result = tokio::select! {
            result = Self::run_mcp_server(handler) => result,
            () = self.cancellation_token.cancelled() => {
                info!("Shutdown signal received, stopping MCP server");
                Ok(())
            }
        };

        let shutdown_timeout =
            std::time::Duration::from_secs(self.config.server.graceful_shutdown_timeout_secs);
        if tokio::time::timeout(shutdown_timeout, Self::graceful_shutdown())
            .await
            .is_err()
        {
            warn!("Graceful shutdown timeout exceeded, forcing shutdown");
        }

        info!("MCP server shutdown complete");
        server_result
    }

    async fn run_mcp_server(handler: TavilyServerHandler) -> Result<()> {
        let server = handler
            .serve(stdio())
            .await
            .map_err(|e| Error::Service(format!("Failed to start MCP server: {e}")))?;

        let quit_reason = server
            .waiting()
            .await
            .map_err(|e| Error::Service(format!("MCP server error: {e}")))?;

        info!("MCP server completed with reason: {:?}", quit_reason);
        Ok(())
    }

    async fn graceful_shutdown() {
        // Calls are stateless pass-throughs; nothing to flush beyond letting
        // in-flight log lines drain.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        info!("Graceful shutdown completed");
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
        _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, initiating graceful shutdown"),
        Err(e) => {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
