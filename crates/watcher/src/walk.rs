//! Recursive enumeration of the watch root
//!
//! Every file and directory under the root (the root included) is yielded
//! lazily, depth-first, and registered as soon as it is discovered.

use crate::error::WatchError;
use crate::source::EventSource;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Enumerate every path in the subtree rooted at `root`
///
/// Order is depth-first with siblings sorted by file name. Symlinks are
/// reported but not followed. A path that cannot be visited yields a
/// `WatchError::Traversal` item.
pub fn enumerate(root: &Path) -> impl Iterator<Item = Result<PathBuf, WatchError>> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.map(walkdir::DirEntry::into_path).map_err(WatchError::from))
}

/// Register every path under `root` with `source`
///
/// Registration happens as each path is discovered, so the first traversal
/// or registration error aborts immediately. Returns the number of paths
/// registered.
pub fn populate(root: &Path, source: &mut EventSource) -> Result<usize, WatchError> {
    if root.as_os_str().is_empty() {
        return Err(WatchError::EmptyRoot);
    }

    let mut count = 0;
    for path in enumerate(root) {
        let path = path?;
        debug!("Watching {}", path.display());
        source.register(&path)?;
        count += 1;
    }

    info!("Watching {} paths under {}", count, root.display());
    Ok(count)
}
