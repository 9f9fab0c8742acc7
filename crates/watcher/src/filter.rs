//! Change filtering against the configured `match` pattern
//!
//! Patterns use gitignore glob syntax relative to the watch root. A pattern
//! without a `/` matches the file name at any depth (`*.rs` matches
//! `src/lib.rs`). Without a pattern every change counts.

use crate::error::WatchError;
use ignore::overrides::{Override, OverrideBuilder};
use std::path::Path;

/// Decides which change notifications mark the loop as pending
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    matcher: Option<Override>,
}

impl ChangeFilter {
    /// Filter that accepts every change
    pub fn accept_all() -> Self {
        Self { matcher: None }
    }

    /// Build a filter for `pattern`, relative to `root`
    pub fn new(root: &Path, pattern: Option<&str>) -> Result<Self, WatchError> {
        let Some(pattern) = pattern else {
            return Ok(Self::accept_all());
        };

        let mut builder = OverrideBuilder::new(root);
        builder.add(pattern)?;

        Ok(Self {
            matcher: Some(builder.build()?),
        })
    }

    /// Check whether a change to `path` counts
    pub fn accepts(&self, path: &Path) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.matched(path, path.is_dir()).is_whitelist(),
            None => true,
        }
    }

    /// Whether a pattern is in effect
    pub fn is_active(&self) -> bool {
        self.matcher.is_some()
    }
}

impl Default for ChangeFilter {
    fn default() -> Self {
        Self::accept_all()
    }
}
