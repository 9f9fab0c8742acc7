//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a `WatchConfig`
///
/// All of these are fatal at startup: the watcher never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("path must not be empty")]
    EmptyPath,

    #[error("invalid duration for `{field}`: {value:?}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("`{field}` must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("`{field}` must be at most {max:?}")]
    DurationTooLong {
        field: &'static str,
        max: std::time::Duration,
    },
}
