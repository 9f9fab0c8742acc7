//! Event source and watch set
//!
//! `EventSource` owns the OS notification facility and exposes two
//! independently read streams: change notifications and fatal errors.
//! Paths are registered one at a time (non-recursively) and recorded in the
//! `WatchSet`.

use crate::error::WatchError;
use crate::{ChangeEvent, Op};
use notify::event::{EventKind, ModifyKind};
use notify::{Event, RecommendedWatcher, RecursiveMode};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Backend that accepts watch registrations
///
/// Dropping the backend releases everything it holds.
pub(crate) trait Registrar: Send {
    /// Start delivering notifications for `path`
    fn add(&mut self, path: &Path) -> notify::Result<()>;
}

impl Registrar for RecommendedWatcher {
    fn add(&mut self, path: &Path) -> notify::Result<()> {
        notify::Watcher::watch(self, path, RecursiveMode::NonRecursive)
    }
}

/// Paths currently registered with the event source
///
/// Append-only: entries are never removed, even when the path is deleted.
#[derive(Debug, Default, Clone)]
pub struct WatchSet {
    paths: Vec<PathBuf>,
}

impl WatchSet {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Paths in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }
}

/// Asynchronous producer of change notifications and fatal errors
pub struct EventSource {
    backend: Option<Box<dyn Registrar>>,
    watch_set: WatchSet,
    changes: mpsc::UnboundedReceiver<ChangeEvent>,
    errors: mpsc::UnboundedReceiver<WatchError>,
}

impl EventSource {
    /// Create an event source backed by the platform's recommended watcher
    pub fn notify() -> Result<Self, WatchError> {
        let (changes_tx, changes) = mpsc::unbounded_channel();
        let (errors_tx, errors) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.need_rescan() {
                    // Events were dropped by the kernel; the watch set can no longer be trusted
                    let _ = errors_tx.send(WatchError::Notify(notify::Error::generic(
                        "event queue overflowed",
                    )));
                    return;
                }

                let Some(op) = map_kind(&event.kind) else {
                    return;
                };

                for path in event.paths {
                    let _ = changes_tx.send(ChangeEvent { path, op });
                }
            }
            Err(e) => {
                let _ = errors_tx.send(WatchError::Notify(e));
            }
        })
        .map_err(WatchError::Init)?;

        Ok(Self::with_backend(Box::new(watcher), changes, errors))
    }

    /// Create an event source driven by hand through a `SourceHandle`
    ///
    /// Registrations are recorded without touching the OS.
    pub fn in_memory() -> (Self, SourceHandle) {
        let (changes_tx, changes) = mpsc::unbounded_channel();
        let (errors_tx, errors) = mpsc::unbounded_channel();

        let handle = SourceHandle {
            changes: changes_tx,
            errors: errors_tx,
            rejected: Arc::new(Mutex::new(HashSet::new())),
            released: Arc::new(AtomicUsize::new(0)),
        };

        let backend = MemoryRegistrar {
            rejected: Arc::clone(&handle.rejected),
            released: Arc::clone(&handle.released),
        };

        (Self::with_backend(Box::new(backend), changes, errors), handle)
    }

    fn with_backend(
        backend: Box<dyn Registrar>,
        changes: mpsc::UnboundedReceiver<ChangeEvent>,
        errors: mpsc::UnboundedReceiver<WatchError>,
    ) -> Self {
        Self {
            backend: Some(backend),
            watch_set: WatchSet::default(),
            changes,
            errors,
        }
    }

    /// Register a single path with the notification facility
    pub fn register(&mut self, path: &Path) -> Result<(), WatchError> {
        let backend = self.backend.as_mut().ok_or_else(|| WatchError::Registration {
            path: path.to_path_buf(),
            source: notify::Error::generic("event source is closed"),
        })?;

        backend.add(path).map_err(|source| WatchError::Registration {
            path: path.to_path_buf(),
            source,
        })?;

        self.watch_set.push(path.to_path_buf());
        Ok(())
    }

    /// Paths registered so far
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }

    /// Whether the facility has been released
    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Release the notification facility
    ///
    /// Only the first call releases anything; later calls are no-ops.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            debug!(watched = self.watch_set.len(), "Event source closed");
        }
    }

    pub(crate) fn streams(
        &mut self,
    ) -> (
        &mut mpsc::UnboundedReceiver<ChangeEvent>,
        &mut mpsc::UnboundedReceiver<WatchError>,
    ) {
        (&mut self.changes, &mut self.errors)
    }
}

impl Drop for EventSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sending side of an in-memory `EventSource`
#[derive(Clone)]
pub struct SourceHandle {
    changes: mpsc::UnboundedSender<ChangeEvent>,
    errors: mpsc::UnboundedSender<WatchError>,
    rejected: Arc<Mutex<HashSet<PathBuf>>>,
    released: Arc<AtomicUsize>,
}

impl SourceHandle {
    /// Deliver a change notification
    pub fn change(&self, path: impl Into<PathBuf>, op: Op) {
        if self.changes.send(ChangeEvent::new(path, op)).is_err() {
            warn!("Change dropped: event source is gone");
        }
    }

    /// Deliver a fatal error
    pub fn fail(&self, error: WatchError) {
        if self.errors.send(error).is_err() {
            warn!("Error dropped: event source is gone");
        }
    }

    /// Make future registrations of `path` fail
    pub fn reject(&self, path: impl Into<PathBuf>) {
        self.rejected.lock().insert(path.into());
    }

    /// Number of times the backend has been released
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

struct MemoryRegistrar {
    rejected: Arc<Mutex<HashSet<PathBuf>>>,
    released: Arc<AtomicUsize>,
}

impl Registrar for MemoryRegistrar {
    fn add(&mut self, path: &Path) -> notify::Result<()> {
        if self.rejected.lock().contains(path) {
            return Err(notify::Error::path_not_found().add_path(path.to_path_buf()));
        }
        Ok(())
    }
}

impl Drop for MemoryRegistrar {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn map_kind(kind: &EventKind) -> Option<Op> {
    match kind {
        EventKind::Create(_) => Some(Op::Create),
        EventKind::Modify(ModifyKind::Name(_)) => Some(Op::Rename),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(Op::Chmod),
        EventKind::Modify(_) => Some(Op::Write),
        EventKind::Remove(_) => Some(Op::Remove),
        _ => None,
    }
}
