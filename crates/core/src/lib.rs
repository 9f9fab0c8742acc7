//! Core types for nightswatch
//!
//! Holds the watch configuration and its TOML loader. Everything here is
//! read once at startup and handed to the watcher as a plain value.

pub mod config;
pub mod error;

pub use config::{
    load, WatchConfig, DEFAULT_CONFIG_PATH, DEFAULT_INTERVAL, DEFAULT_TIMEOUT, MAX_DURATION,
};
pub use error::ConfigError;
