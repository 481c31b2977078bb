//! Filter hot reload.
//!
//! Watches the configuration file and turns each valid revision into a
//! fresh [`RangeSet`]. Only the filter section is live; the listener and
//! upstream sections are compared against the startup configuration and
//! a change there is reported, not applied.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{GuardConfig, ListenerConfig, UpstreamConfig};
use crate::filter::RangeSet;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Produces range sets from on-disk revisions of the configuration.
#[derive(Debug, Clone)]
pub struct FilterReloader {
    path: PathBuf,
    listener: ListenerConfig,
    upstream: UpstreamConfig,
}

impl FilterReloader {
    /// `running` is the configuration the process started with.
    pub fn new(path: &Path, running: &GuardConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            listener: running.listener.clone(),
            upstream: running.upstream.clone(),
        }
    }

    /// Load the file and build its range set.
    ///
    /// The whole file must validate; a broken revision yields no ranges.
    pub fn reload(&self) -> Result<RangeSet, ConfigError> {
        let revised = load_config(&self.path)?;
        if revised.listener != self.listener || revised.upstream != self.upstream {
            tracing::warn!(
                path = ?self.path,
                "Listener and upstream changes take effect after restart"
            );
        }
        Ok(revised.filter.range_set()?)
    }

    /// Start watching. Range sets arrive on the returned receiver; the
    /// returned watcher must be kept alive for notifications to flow.
    pub fn watch(
        self,
    ) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<RangeSet>), notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }
                match self.reload() {
                    Ok(ranges) => {
                        tracing::info!(filter_ranges = ranges.len(), "Filter reloaded from disk");
                        let _ = tx.send(ranges);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected config revision, keeping current filter");
                    }
                }
            },
            Config::default().with_poll_interval(POLL_INTERVAL),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?path, "Watching config for filter changes");
        Ok((watcher, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::IpAddr;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "edge-guard-{}-{}.toml",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    fn addr(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_reload_builds_range_set() {
        let path = scratch_file("reload-ok", "[filter]\nranges = [\"10.0.0.0/8\", \"192.0.2.7\"]\n");
        let reloader = FilterReloader::new(&path, &GuardConfig::default());

        let ranges = reloader.reload().unwrap();
        assert_eq!(ranges.len(), 2);
        assert!(ranges.accepts(&addr("10.20.30.40")));
        assert!(!ranges.accepts(&addr("127.0.0.1")));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reload_rejects_invalid_revision() {
        let path = scratch_file("reload-bad", "[filter]\nranges = [\"not-a-range\"]\n");
        let reloader = FilterReloader::new(&path, &GuardConfig::default());

        assert!(matches!(reloader.reload(), Err(ConfigError::Validation(_))));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reload_still_applies_filter_when_listener_changed() {
        let path = scratch_file(
            "reload-listener",
            "[listener]\nbind_address = \"127.0.0.1:9999\"\n[filter]\nranges = [\"127.0.0.0/8\"]\n",
        );
        let reloader = FilterReloader::new(&path, &GuardConfig::default());

        let ranges = reloader.reload().unwrap();
        assert!(ranges.accepts(&addr("127.0.0.1")));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_reload_missing_file() {
        let reloader = FilterReloader::new(Path::new("/nonexistent/edge-guard.toml"), &GuardConfig::default());
        assert!(matches!(reloader.reload(), Err(ConfigError::Io(_))));
    }
}
