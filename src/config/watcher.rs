//! Hot reload of the configuration file.
//!
//! A change runs the startup pipeline again (file, environment, validation),
//! so a reload never yields a config that startup would refuse. Saves that
//! leave the effective config unchanged are not forwarded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_with_env;
use crate::config::schema::GatewayConfig;

/// Watches one config file and sends every new effective config.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GatewayConfig,
    updates: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// `current` is the config the server is running with.
    pub fn new(path: &Path, current: GatewayConfig) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            current,
            updates,
        };
        (watcher, rx)
    }

    /// Start watching on notify's background thread.
    ///
    /// The returned watcher must be kept alive for as long as updates are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, mut current, updates } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    if let Some(config) = reload(&path, &current, |key| std::env::var(key).ok()) {
                        current = config.clone();
                        let _ = updates.send(config);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Re-read `path` the way startup does. `None` when the result is invalid or
/// identical to `current`.
fn reload<F>(path: &Path, current: &GatewayConfig, lookup: F) -> Option<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    match load_with_env(Some(path), lookup) {
        Ok(config) if &config == current => {
            tracing::debug!(path = ?path, "Config file touched, nothing changed");
            None
        }
        Ok(config) => {
            tracing::info!(path = ?path, "Config reloaded");
            Some(config)
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Config reload failed, keeping current configuration");
            None
        }
    }
}
