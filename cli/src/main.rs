use std::path::Path;

use clap::Parser;
use proctor_core::api::{load_default, load_from_path, AppConfig, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod http;

use commands::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let cfg = match &args.config {
        Some(path) => load_from_path(path)?,
        None => load_default()?,
    };
    let _log_guard = init_logging(&cfg.logging);

    dispatch(args.command, &cfg).await
}

async fn dispatch(cmd: cli::Commands, cfg: &AppConfig) -> anyhow::Result<()> {
    match cmd {
        cli::Commands::Serve(serve_args) => commands::serve::handle_serve(serve_args, cfg).await,
        cli::Commands::Replay(replay_args) => commands::replay::handle_replay(replay_args, cfg),
        cli::Commands::Show(show_args) => commands::show::handle_show(show_args, cfg).await,
    }
}

/// `RUST_LOG` wins over `logging.level`. Logs go to stderr, and also to a
/// daily-rolling file when `logging.file` is set. The returned guard must
/// live until exit so buffered file lines are flushed.
fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    let (file_layer, guard) = if cfg.file.trim().is_empty() {
        (None, None)
    } else {
        let path = Path::new(&cfg.file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "proctor.log".to_string());
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}
