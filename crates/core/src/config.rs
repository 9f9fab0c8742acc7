//! Watch configuration
//!
//! The on-disk format is a flat TOML table:
//! ```toml
//! path = "./src"
//! match = "*.rs"
//! build = "cargo build"
//! reload = "systemctl --user restart app"
//! interval = "3s"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./nightswatch.toml";

/// Tick period used when `interval` is absent or empty
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Upper bound on a single build or reload command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest accepted `interval` or `timeout` (one week)
pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Validated watch configuration
///
/// Created once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Root of the watched tree (never empty)
    pub path: PathBuf,

    /// Glob that changed paths must match to count as a change
    pub pattern: Option<String>,

    /// Shell command run on the build step
    pub build: Option<String>,

    /// Shell command run on the reload step
    pub reload: Option<String>,

    /// Debounce tick period
    pub interval: Duration,

    /// Timeout applied to each build/reload command
    pub timeout: Duration,

    /// Skip the reload step when the build step failed
    pub gate_reload: bool,
}

/// Raw file contents before validation
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    path: String,

    #[serde(default, rename = "match")]
    pattern: Option<String>,

    #[serde(default)]
    build: Option<String>,

    #[serde(default)]
    reload: Option<String>,

    #[serde(default)]
    interval: Option<String>,

    #[serde(default)]
    timeout: Option<String>,

    #[serde(default)]
    gate_reload: bool,
}

impl WatchConfig {
    /// Build a configuration for `path` with every other field defaulted
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pattern: None,
            build: None,
            reload: None,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            gate_reload: false,
        }
    }

    /// Parse and validate TOML text
    ///
    /// `origin` is only used to label parse errors.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        if raw.path.trim().is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        Ok(Self {
            path: PathBuf::from(raw.path),
            pattern: non_empty(raw.pattern),
            build: non_empty(raw.build),
            reload: non_empty(raw.reload),
            interval: parse_duration("interval", raw.interval, DEFAULT_INTERVAL)?,
            timeout: parse_duration("timeout", raw.timeout, DEFAULT_TIMEOUT)?,
            gate_reload: raw.gate_reload,
        })
    }
}

/// Load configuration from a TOML file
pub fn load(path: &Path) -> Result<WatchConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    WatchConfig::from_toml(&text, path)
}

// Empty strings in the file mean "not set"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_duration(
    field: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let value = match non_empty(value) {
        Some(value) => value,
        None => return Ok(default),
    };

    let duration = humantime::parse_duration(value.trim()).map_err(|source| {
        ConfigError::InvalidDuration {
            field,
            value: value.clone(),
            source,
        }
    })?;

    if duration.is_zero() {
        return Err(ConfigError::ZeroDuration { field });
    }

    if duration > MAX_DURATION {
        return Err(ConfigError::DurationTooLong {
            field,
            max: MAX_DURATION,
        });
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(text: &str) -> Result<WatchConfig, ConfigError> {
        WatchConfig::from_toml(text, Path::new("test.toml"))
    }

    #[test]
    fn test_full_config() -> anyhow::Result<()> {
        let config = parse(
            r#"
            path = "./src"
            match = "*.go"
            build = "go build"
            reload = "pkill -HUP app"
            interval = "500ms"
            timeout = "2m"
            gate_reload = true
            "#,
        )?;

        assert_eq!(config.path, PathBuf::from("./src"));
        assert_eq!(config.pattern.as_deref(), Some("*.go"));
        assert_eq!(config.build.as_deref(), Some("go build"));
        assert_eq!(config.reload.as_deref(), Some("pkill -HUP app"));
        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert!(config.gate_reload);

        Ok(())
    }

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let config = parse(r#"path = "/tmp/proj""#)?;

        assert_eq!(config, WatchConfig::new("/tmp/proj"));
        assert_eq!(config.interval, Duration::from_secs(3));

        Ok(())
    }

    #[test]
    fn test_empty_strings_are_unset() -> anyhow::Result<()> {
        let config = parse(
            r#"
            path = "."
            match = ""
            build = ""
            reload = "  "
            interval = ""
            "#,
        )?;

        assert!(config.pattern.is_none());
        assert!(config.build.is_none());
        assert!(config.reload.is_none());
        assert_eq!(config.interval, DEFAULT_INTERVAL);

        Ok(())
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(parse(r#"path = """#), Err(ConfigError::EmptyPath)));
        assert!(matches!(parse(r#"build = "make""#), Err(ConfigError::EmptyPath)));
    }

    #[test]
    fn test_bad_interval_rejected() {
        let err = parse("path = \".\"\ninterval = \"soon\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDuration { field: "interval", .. }
        ));

        let err = parse("path = \".\"\ninterval = \"0s\"").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration { field: "interval" }));
    }

    #[test]
    fn test_oversized_duration_rejected() {
        // Parses as a Duration but cannot be scheduled on a clock
        let err = parse("path = \".\"\ninterval = \"500000000000y\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DurationTooLong { field: "interval", .. }
        ));

        let err = parse("path = \".\"\ntimeout = \"8days\"").unwrap_err();
        assert!(matches!(err, ConfigError::DurationTooLong { field: "timeout", .. }));

        let config = parse("path = \".\"\ninterval = \"7days\"").unwrap();
        assert_eq!(config.interval, MAX_DURATION);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse("path = \".\"\nintervall = \"3s\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nightswatch.toml");
        fs::write(&config_path, "path = \"src\"\ninterval = \"1s\"\n")?;

        let config = load(&config_path)?;
        assert_eq!(config.path, PathBuf::from("src"));
        assert_eq!(config.interval, Duration::from_secs(1));

        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load(&temp_dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
