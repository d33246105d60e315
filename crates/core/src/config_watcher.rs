use crate::config::AppConfig;
use crate::config_loader::ConfigLoader;
use anyhow::Result;
use notify::{Event, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tokio::sync::watch;

// Also bounds how long shutdown waits once every receiver is gone
const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct ConfigWatcher {
    tx: watch::Sender<AppConfig>,
    profile: Option<String>,
}

impl ConfigWatcher {
    /// Creates a new configuration watcher with an initial configuration.
    ///
    /// Returns a tuple of the watcher and a receiver for configuration updates.
    #[must_use]
    pub fn new(initial_config: AppConfig) -> (Self, watch::Receiver<AppConfig>) {
        let (tx, rx) = watch::channel(initial_config);
        (Self { tx, profile: None }, rx)
    }

    /// Reloads through `Config.{profile}.toml` as well, and watches that file too.
    #[must_use]
    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }

    fn load(&self, config_path: &Path) -> Result<AppConfig> {
        match &self.profile {
            Some(profile) => ConfigLoader::load_with_profile(config_path, profile),
            None => ConfigLoader::load_from(config_path),
        }
    }

    /// Reloads `config_path`, plus the profile overlay if one is set, and
    /// broadcasts it if it differs from the current config.
    ///
    /// Returns whether a new configuration was published. Invalid files are
    /// logged and ignored so the last good configuration stays active.
    pub fn reload(&self, config_path: &Path) -> bool {
        match self.load(config_path) {
            Ok(new_config) => {
                let changed = self.tx.send_if_modified(|current| {
                    if *current == new_config {
                        false
                    } else {
                        *current = new_config;
                        true
                    }
                });
                if changed {
                    tracing::info!("Config reloaded successfully");
                }
                changed
            }
            Err(e) => {
                tracing::error!("Failed to reload config: {}", e);
                false
            }
        }
    }

    /// Watches the configuration file for changes and broadcasts updates.
    ///
    /// # Errors
    ///
    /// Returns an error if file watching cannot be initiated or if the watcher task fails.
    pub async fn watch(self, config_path: impl Into<PathBuf>) -> Result<()> {
        let config_path = config_path.into();

        tokio::task::spawn_blocking(move || {
            let (notify_tx, notify_rx) = std::sync::mpsc::channel();

            let mut watcher = notify::recommended_watcher(move |res: Result<Event, _>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            })?;

            watcher.watch(&config_path, RecursiveMode::NonRecursive)?;
            tracing::info!(path = %config_path.display(), "Watching config file");

            if let Some(profile) = &self.profile {
                let profile_path = ConfigLoader::profile_path(&config_path, profile);
                if profile_path.exists() {
                    watcher.watch(&profile_path, RecursiveMode::NonRecursive)?;
                    tracing::info!(path = %profile_path.display(), "Watching profile file");
                }
            }

            while !self.tx.is_closed() {
                match notify_rx.recv_timeout(POLL_INTERVAL) {
                    Ok(event) if event.kind.is_modify() => {
                        tracing::info!("Config file changed, reloading...");
                        self.reload(&config_path);
                    }
                    Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::debug!("Config watcher stopped");

            Ok::<_, anyhow::Error>(())
        })
        .await??;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rust_decimal_macros::dec;

    #[test]
    fn publishes_changed_config() {
        Jail::expect_with(|jail| {
            let (watcher, mut rx) = ConfigWatcher::new(AppConfig::default());
            jail.create_file("calc.toml", "[fees]\nfee_percent = 0.25\n")?;

            assert!(watcher.reload(Path::new("calc.toml")));
            assert!(rx.has_changed().unwrap_or(false));
            assert_eq!(rx.borrow_and_update().fees.fee_percent, dec!(0.25));

            // Same contents again: nothing new to publish
            assert!(!watcher.reload(Path::new("calc.toml")));
            assert!(!rx.has_changed().unwrap_or(true));
            Ok(())
        });
    }

    #[test]
    fn reload_keeps_profile_overlay() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Config.toml", "[fees]\nfee_percent = 1.0\n")?;
            jail.create_file("config/Config.broker.toml", "[fees]\nfee_percent = 0.15\n")?;
            let base = Path::new("config/Config.toml");

            let initial = ConfigLoader::load_with_profile(base, "broker")
                .map_err(|e| figment::Error::from(e.to_string()))?;
            let (watcher, rx) = ConfigWatcher::new(initial);
            let watcher = watcher.with_profile(Some("broker".to_string()));

            // Base edit: the overlay still wins for the fee
            jail.create_file(
                "config/Config.toml",
                "[fees]\nfee_percent = 2.0\n\n[display]\ncurrency_prefix = \"$\"\n",
            )?;
            assert!(watcher.reload(base));
            assert_eq!(rx.borrow().fees.fee_percent, dec!(0.15));
            assert_eq!(rx.borrow().display.currency_prefix, "$");

            // Overlay edit is picked up on the next reload
            jail.create_file("config/Config.broker.toml", "[fees]\nfee_percent = 0.2\n")?;
            assert!(watcher.reload(base));
            assert_eq!(rx.borrow().fees.fee_percent, dec!(0.2));
            Ok(())
        });
    }

    #[test]
    fn keeps_last_good_config_on_invalid_file() {
        Jail::expect_with(|jail| {
            let (watcher, rx) = ConfigWatcher::new(AppConfig::default());
            jail.create_file("calc.toml", "[fees]\nfee_percent = 250\n")?;

            assert!(!watcher.reload(Path::new("calc.toml")));
            assert_eq!(rx.borrow().fees.fee_percent, dec!(1.12));
            Ok(())
        });
    }

    #[tokio::test]
    async fn watch_fails_for_missing_file() {
        let (watcher, _rx) = ConfigWatcher::new(AppConfig::default());
        let result = watcher.watch("does/not/exist/Config.toml").await;
        assert!(result.is_err());
    }
}
