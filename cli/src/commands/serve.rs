//! `proctor serve`: one monitored session behind the HTTP API.

use std::sync::Arc;

use proctor_core::api::{
    load_or_default, spawn_monitor, start_persistence, AppConfig, Engine, JsonFileSink,
    PersistenceSink, SystemClock,
};
use tokio::sync::broadcast;

use crate::commands::cli::ServeArgs;
use crate::http::server::{start_server, ServerConfig};
use crate::http::AppState;

pub async fn handle_serve(args: ServeArgs, cfg: &AppConfig) -> anyhow::Result<()> {
    let server_config = ServerConfig {
        host: args.host.unwrap_or_else(|| cfg.http_server.host.clone()),
        port: args.port.unwrap_or(cfg.http_server.port),
    };

    let sink: Arc<dyn PersistenceSink> = Arc::new(JsonFileSink::from_config(&cfg.persistence));
    let previous = load_or_default(sink.as_ref()).await;
    let persistence = start_persistence(sink.clone(), &cfg.persistence);

    let mut engine = Engine::restore(
        cfg,
        Arc::new(SystemClock),
        Some(persistence),
        previous.as_ref(),
    );
    if let Some(session_id) = args.session_id {
        engine = engine.with_session_id(session_id);
    }
    engine.log_activity(format!("Session {} started", engine.session_id()));

    let (monitor, monitor_task) = spawn_monitor(engine, cfg.persistence.channel_capacity);
    let (shutdown_tx, _) = broadcast::channel(1);
    let state = AppState::new(monitor.clone(), sink, shutdown_tx);

    let served = start_server(server_config, state).await;

    // Flush the final snapshot even when the server failed to start.
    let final_snapshot = monitor.stop().await?;
    monitor_task.await?;
    tracing::info!(
        target: "proctor.engine",
        score = final_snapshot.score,
        label = %final_snapshot.label,
        "final trust snapshot written"
    );
    served
}
