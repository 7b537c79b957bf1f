//! Configuration file watcher for hot reload.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RouterConfig;

/// A watcher that monitors the configuration file for changes.
///
/// The parent directory is watched so that editors which save by replacing
/// the file still produce events.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The returned watcher must be kept alive for events to be delivered.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx;
        let path = self.path.clone();
        let file_name: Option<OsString> = self.path.file_name().map(|n| n.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !is_config_change(&event, file_name.as_deref()) {
                        return;
                    }

                    tracing::info!(path = ?path, "Config file change detected, reloading");
                    match load_config(&path) {
                        Ok(new_config) => {
                            let _ = tx.send(new_config);
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Failed to reload config. Keeping current configuration."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_root(&self.path), RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// True for modify/create events on the watched file.
fn is_config_change(event: &Event, file_name: Option<&OsStr>) -> bool {
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == file_name)
}

/// Directory containing the config file.
fn watch_root(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use notify::EventKind;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_config_change_filter() {
        let name = Some(OsStr::new("router.toml"));

        assert!(is_config_change(&event(EventKind::Modify(ModifyKind::Any), "/etc/router.toml"), name));
        assert!(is_config_change(&event(EventKind::Create(CreateKind::File), "./router.toml"), name));
        assert!(!is_config_change(&event(EventKind::Remove(RemoveKind::File), "/etc/router.toml"), name));
        assert!(!is_config_change(&event(EventKind::Modify(ModifyKind::Any), "/etc/other.toml"), name));
        assert!(!is_config_change(&event(EventKind::Modify(ModifyKind::Any), "/etc/.router.toml.swp"), name));
    }

    #[test]
    fn test_watch_root() {
        assert_eq!(watch_root(Path::new("domain-router.toml")), PathBuf::from("."));
        assert_eq!(watch_root(Path::new("/etc/router/config.toml")), PathBuf::from("/etc/router"));
        assert_eq!(watch_root(Path::new("conf/router.toml")), PathBuf::from("conf"));
    }
}
