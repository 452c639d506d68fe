use crate::events::AppEvent;
use anyhow::Context;
use async_channel::Sender;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use tokio::runtime::{Handle, Runtime};

/// Starts the tokio runtime that hosts the config watcher and the resize debouncer, and
/// returns a handle for spawning onto it from the GTK thread.
pub fn start_background_services(
    config_path: PathBuf,
    tx: Sender<AppEvent>,
) -> anyhow::Result<Handle> {
    let (handle_tx, handle_rx) = mpsc::sync_channel(1);

    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };
        let _ = handle_tx.send(rt.handle().clone());

        rt.block_on(async {
            tokio::spawn(crate::config::run_async_watcher(config_path, tx));

            std::future::pending::<()>().await;
        });
    });

    handle_rx
        .recv()
        .context("Background runtime exited before starting")
}
