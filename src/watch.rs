//! Rebuild-on-change mode
//!
//! Watches the entry file's directory (editors often save by writing a temp file
//! and renaming it over the original) and rebuilds whenever the entry is created or
//! modified. Bursts of events within the debounce window trigger one rebuild.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use log::{debug, info};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{Result, TerrariumError};

/// Minimum time between two rebuilds
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Drops events that arrive too soon after the last accepted one
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Whether an event at `now` should trigger a rebuild; records it if so
    pub fn accept(&mut self, now: Instant) -> bool {
        let ready = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.window);
        if ready {
            self.last = Some(now);
        }
        ready
    }
}

/// Whether `event` is a write to `target`
pub fn touches(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        && event.paths.iter().any(|p| p == target)
}

/// Run `rebuild` once, then again after every change to `entry`, until it breaks.
pub fn watch_entry<F>(entry: &Path, mut rebuild: F) -> Result<()>
where
    F: FnMut() -> ControlFlow<()>,
{
    let target = dunce::canonicalize(entry).map_err(|_| TerrariumError::EntryNotFound {
        path: entry.display().to_string(),
    })?;
    let dir = target
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        Config::default(),
    )
    .map_err(|e| watch_failed(&target, e))?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| watch_failed(&target, e))?;
    info!("Watching {} for changes", target.display());

    let mut debouncer = Debouncer::new(DEBOUNCE);
    debouncer.accept(Instant::now());
    if rebuild().is_break() {
        return Ok(());
    }

    for event in rx {
        if !touches(&event, &target) {
            continue;
        }
        if !debouncer.accept(Instant::now()) {
            debug!("change within {}ms of the last rebuild ignored", DEBOUNCE.as_millis());
            continue;
        }
        info!("{} changed, rebuilding", target.display());
        if rebuild().is_break() {
            break;
        }
    }
    Ok(())
}

fn watch_failed(path: &Path, err: notify::Error) -> TerrariumError {
    TerrariumError::WatchFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
