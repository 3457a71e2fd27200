//! live-preview binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use live_preview::config::Config;
use live_preview::watch::FileChange;
use live_preview::{cli, logging, watched_kind, Engine, FileWatcher};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!("try 'live-preview --help'");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    logging::init_with_filter(config.log_filter());
    info!("live-preview v{}", env!("CARGO_PKG_VERSION"));

    let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let engine = Engine::new(config.engine_config());

    let port = match engine.start(root.clone()).await {
        Ok(port) => port,
        Err(err) => {
            error!("failed to start preview session: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!("serving {} at http://127.0.0.1:{port}/", root.display());

    // Watcher events feed edits the same way an editor host would.
    let (watcher, mut changes) = match FileWatcher::new(root.clone()) {
        Ok(pair) => pair,
        Err(err) => {
            error!("failed to watch {}: {err}", root.display());
            let _ = engine.stop().await;
            return ExitCode::FAILURE;
        }
    };

    let watch_engine = engine.clone();
    tokio::spawn(async move {
        while let Some(change) = changes.recv().await {
            match change {
                FileChange::Modified(path) | FileChange::Created(path) => {
                    if !watched_kind(&path) {
                        continue;
                    }
                    match tokio::fs::read_to_string(&path).await {
                        Ok(content) => watch_engine.notify_edit(&path, content),
                        Err(err) => warn!("failed to read {}: {err}", path.display()),
                    }
                }
                // The protocol has no delete frame; a removed document
                // simply stops updating.
                FileChange::Removed(_) => {}
            }
        }
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");

    if let Err(err) = engine.stop().await {
        warn!("shutdown error: {err}");
    }
    drop(watcher);

    ExitCode::SUCCESS
}
