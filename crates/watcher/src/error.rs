//! Watcher and action errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors from traversal, registration or the notification facility
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch root must not be empty")]
    EmptyRoot,

    #[error("failed to traverse watch tree")]
    Traversal(#[from] walkdir::Error),

    #[error("failed to watch {}", .path.display())]
    Registration {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to start file watcher")]
    Init(#[source] notify::Error),

    #[error("file watcher failed")]
    Notify(#[source] notify::Error),

    #[error("invalid match pattern")]
    Pattern(#[from] ignore::Error),
}

/// Build/reload failure
///
/// Never fatal for the loop; reported and then dropped.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{action}: failed to spawn `{command}`")]
    Spawn {
        action: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{action}: `{command}` timed out after {after:?}")]
    TimedOut {
        action: String,
        command: String,
        after: Duration,
    },

    #[error("{action}: `{command}` exited with {}", describe_exit(.code))]
    Failed {
        action: String,
        command: String,
        code: Option<i32>,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}
