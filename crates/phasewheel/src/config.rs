use crate::events::AppEvent;
use async_channel::{Receiver, Sender};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Editors save in several steps. Changes closer together than this become one reload.
pub const RELOAD_SETTLE: Duration = Duration::from_millis(200);

/// Sends [`AppEvent::ConfigReload`] whenever the file at `config_path` changes on disk.
pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        log::error!("Config path {} has no parent directory", config_path.display());
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    );
    let mut watcher = match watcher {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    // saves may replace the file instead of writing it
    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch {}: {}", config_dir.display(), e);
        return;
    }
    log::debug!("Watching {}", config_path.display());

    forward_changes(bridge_rx, &config_path, tx).await;
}

/// Turns raw watcher events into reload requests, one per burst of changes to `config_path`.
pub async fn forward_changes(
    events: Receiver<notify::Result<notify::Event>>,
    config_path: &Path,
    tx: Sender<AppEvent>,
) {
    while let Ok(res) = events.recv().await {
        match res {
            Ok(event) if is_config_change(&event, config_path) => {}
            Ok(_) => continue,
            Err(e) => {
                log::error!("Watch error: {}", e);
                continue;
            }
        }

        let mut coalesced = 0;
        while let Ok(Ok(_)) = tokio::time::timeout(RELOAD_SETTLE, events.recv()).await {
            coalesced += 1;
        }
        log::debug!("Config changed ({} follow-up events coalesced)", coalesced);

        if tx.send(AppEvent::ConfigReload).await.is_err() {
            break;
        }
    }
}

fn is_config_change(event: &notify::Event, config_path: &Path) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| p == config_path)
}
