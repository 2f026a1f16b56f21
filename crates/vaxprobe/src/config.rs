//! Harness configuration.
//!
//! Timeouts, polling cadence and the default match mode are passed explicitly
//! to the dispatcher and verifier through [`HarnessConfig`]. Values are layered:
//! built-in defaults, then an optional YAML file, then `VAXPROBE_*` environment
//! variables, then whatever the caller sets last.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default bound on action and verification waits (30 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default polling cadence (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Environment variable overriding [`HarnessConfig::base_url`]
pub const ENV_BASE_URL: &str = "VAXPROBE_BASE_URL";
/// Environment variable overriding [`HarnessConfig::timeout_ms`]
pub const ENV_TIMEOUT_MS: &str = "VAXPROBE_TIMEOUT_MS";
/// Environment variable overriding [`HarnessConfig::poll_interval_ms`]
pub const ENV_POLL_INTERVAL_MS: &str = "VAXPROBE_POLL_INTERVAL_MS";
/// Environment variable overriding [`HarnessConfig::exact`]
pub const ENV_EXACT: &str = "VAXPROBE_EXACT";

/// Configuration shared by every action and verification of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base address of the system under test
    pub base_url: String,
    /// Bound on verification and action waits, in milliseconds
    pub timeout_ms: u64,
    /// Polling cadence, in milliseconds
    pub poll_interval_ms: u64,
    /// Default match mode for text/value verifications
    pub exact: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            exact: false,
        }
    }
}

impl HarnessConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the timeout in milliseconds
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Set the default match mode
    #[must_use]
    pub const fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Timeout as a `Duration`
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as a `Duration`
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Parse a config from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> ProbeResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (used by
    /// [`Self::with_env_overrides`])
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            self.timeout_ms = parse_millis(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_millis(ENV_POLL_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_EXACT) {
            self.exact = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    return Err(ProbeError::config(format!(
                        "{ENV_EXACT} must be a boolean, got {other:?}"
                    )))
                }
            };
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the timing invariants
    pub fn validate(&self) -> ProbeResult<()> {
        if self.timeout_ms == 0 {
            return Err(ProbeError::config("timeout_ms must be greater than zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config(
                "poll_interval_ms must be greater than zero",
            ));
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(ProbeError::config(format!(
                "poll_interval_ms ({}) exceeds timeout_ms ({})",
                self.poll_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }

    /// Join a path onto the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

fn parse_millis(key: &str, raw: &str) -> ProbeResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ProbeError::config(format!("{key} must be milliseconds, got {raw:?}")))
}
