//! File system watching for nightswatch
//!
//! This crate provides the debounced watch loop:
//! - Recursive enumeration of the watch root into a watch set
//! - An event source backed by the OS notification facility
//! - A periodic tick that collapses bursts of changes into one dispatch
//! - Build and reload actions run on each dispatch

pub mod action;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod source;
pub mod ticker;
pub mod walk;

pub use action::{action_for, Action, CommandAction, LogAction};
pub use debounce::DebounceLoop;
pub use error::{ActionError, WatchError};
pub use filter::ChangeFilter;
pub use source::{EventSource, SourceHandle, WatchSet};
pub use ticker::{IntervalTicker, ManualTicker, TickSender, Ticker};
pub use walk::{enumerate, populate};

use std::fmt;
use std::path::PathBuf;

/// File system change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Path that changed
    pub path: PathBuf,
    /// Type of change
    pub op: Op,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path.display().to_string(), self.op)
    }
}

/// Type of file system change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// File or directory created
    Create,
    /// Contents written
    Write,
    /// File or directory deleted
    Remove,
    /// Renamed (either side of the move)
    Rename,
    /// Permissions or other metadata changed
    Chmod,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Op::Create => "CREATE",
            Op::Write => "WRITE",
            Op::Remove => "REMOVE",
            Op::Rename => "RENAME",
            Op::Chmod => "CHMOD",
        };
        f.write_str(name)
    }
}
