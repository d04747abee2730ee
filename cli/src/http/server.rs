//! HTTP server lifecycle.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::signal;

use crate::http::{
    middleware::{create_middleware_stack, create_trace_layer, request_logger},
    routes::create_router,
    AppState,
};

/// Listen address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Router with the full middleware stack.
pub fn build_app(state: AppState) -> Router {
    create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_trace_layer())
        .layer(create_middleware_stack())
}

/// Binds the listener; split from [`serve`] so callers learn the real port
/// when binding to port 0.
pub async fn bind(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))
}

/// Serves until Ctrl+C, SIGTERM or `POST /api/shutdown`. The monitor is left
/// running; the caller stops it to flush the final snapshot.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let local = listener.local_addr()?;
    tracing::info!(
        target: "proctor.http",
        session_id = %state.session_id,
        "HTTP server listening on http://{local}"
    );

    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let app = build_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    tracing::info!(target: "proctor.http", "received Ctrl+C");
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!(target: "proctor.http", "received shutdown request");
                }
                _ = wait_for_sigterm() => {
                    tracing::info!(target: "proctor.http", "received SIGTERM");
                }
            }
            tracing::info!(target: "proctor.http", "starting graceful shutdown");
        })
        .await?;

    tracing::info!(target: "proctor.http", "HTTP server stopped");
    Ok(())
}

/// Binds and serves in one step.
pub async fn start_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let listener = bind(&config).await?;
    serve(listener, state).await
}

/// Resolves on SIGTERM. Never resolves if the handler cannot be installed.
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(target: "proctor.http", error = %e, "cannot install SIGTERM handler");
            std::future::pending::<()>().await
        }
    }
}

/// No SIGTERM outside Unix; Ctrl+C and the shutdown API still apply.
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
