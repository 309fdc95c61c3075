//! Theme file watcher for hot-reload support

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::theme::ThemeDocument;

/// Theme watcher that monitors file changes and sends reloaded documents
pub struct ThemeWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<ThemeDocument>,
}

impl ThemeWatcher {
    /// Load the theme at `theme_path` and start watching it
    pub async fn new(theme_path: PathBuf) -> Result<(Self, ThemeDocument)> {
        let (tx, rx) = mpsc::channel(10);

        let initial = ThemeDocument::load(&theme_path)
            .await
            .context("Failed to load initial theme")?;

        let theme_path_clone = theme_path.clone();

        // notify callbacks run on their own OS thread, outside the runtime
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Modify(_)) {
                        debug!("Theme file modified: {:?}", event.paths);

                        let theme_path = theme_path_clone.clone();
                        let tx = tx.clone();

                        runtime_handle.spawn(async move {
                            // Debounce: wait a bit for file writes to complete
                            tokio::time::sleep(Duration::from_millis(100)).await;

                            match ThemeDocument::load(&theme_path).await {
                                Ok(document) => {
                                    info!("Theme reloaded successfully");
                                    if let Err(e) = tx.send(document).await {
                                        error!("Failed to send theme update: {}", e);
                                    }
                                }
                                Err(e) => {
                                    warn!("Failed to reload theme (keeping old theme): {}", e);
                                }
                            }
                        });
                    }
                }
                Err(e) => {
                    error!("Watch error: {}", e);
                }
            }
        })?;

        watcher
            .watch(Path::new(&theme_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch theme file: {}", theme_path.display()))?;

        info!("Theme file watcher started for: {}", theme_path.display());

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial,
        ))
    }

    /// Wait for the next theme update
    /// Returns None if the watcher has been closed
    pub async fn next_theme(&mut self) -> Option<ThemeDocument> {
        self.rx.recv().await
    }
}
