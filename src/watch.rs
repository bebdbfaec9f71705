use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use tracing::{debug, warn};

use crate::error::WatchError;

/// Recursive watch on the current root that reports whether anything
/// changed since the last poll.
///
/// Events arrive on notify's thread and are only buffered here; the host
/// drains them on its own thread and turns them into a rescan.
pub struct RootWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    root: PathBuf,
}

impl RootWatcher {
    pub fn new(root: &Path) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            // The receiver is gone once the host shuts down.
            let _ = tx.send(res);
        })
        .map_err(WatchError::Create)?;

        let mut this = Self {
            watcher,
            rx,
            root: root.to_path_buf(),
        };
        this.attach(root)?;
        Ok(this)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Move the watch to a new root. A no-op if the root is unchanged.
    pub fn rearm(&mut self, root: &Path) -> Result<(), WatchError> {
        if root == self.root {
            return Ok(());
        }
        if let Err(err) = self.watcher.unwatch(&self.root) {
            debug!(path = %self.root.display(), %err, "unwatch failed");
        }
        self.root = root.to_path_buf();
        self.attach(root)?;
        // Whatever was queued belongs to the old root.
        while self.rx.try_recv().is_ok() {}
        Ok(())
    }

    /// Drain buffered events. True if any of them changed the tree's shape.
    pub fn poll_changed(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(Ok(event)) => changed |= is_structural(&event.kind),
                Ok(Err(err)) => warn!(%err, "watch error"),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    fn attach(&mut self, root: &Path) -> Result<(), WatchError> {
        self.watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::Attach {
                path: root.to_path_buf(),
                source,
            })?;
        debug!(path = %root.display(), "watching");
        Ok(())
    }
}

/// Only creations, removals and renames affect the tree; plain reads
/// (including the refresh pass's own directory listings) do not.
fn is_structural(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(notify::event::ModifyKind::Name(_))
            | EventKind::Any
            | EventKind::Other
    )
}
