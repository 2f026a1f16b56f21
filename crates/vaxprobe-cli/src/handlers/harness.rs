//! Harness settings and browser sessions for the browser commands

use crate::commands::HarnessArgs;
use crate::error::{CliError, CliResult};
use vaxprobe::HarnessConfig;
#[cfg(feature = "browser")]
use {
    crate::commands::BrowserArgs,
    vaxprobe::{BrowserOptions, CdpDriver, Session},
};

/// Layer the harness config: file, then environment, then flags
pub fn build_harness_config(args: &HarnessArgs) -> CliResult<HarnessConfig> {
    harness_config_with(args, |key| std::env::var(key).ok())
}

/// [`build_harness_config`] with an explicit environment lookup
pub fn harness_config_with(
    args: &HarnessArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> CliResult<HarnessConfig> {
    let file = match args.config {
        Some(ref path) => HarnessConfig::from_yaml_file(path).map_err(|e| {
            CliError::config(format!("cannot load {}: {e}", path.display()))
        })?,
        None => HarnessConfig::default(),
    };

    let mut config = file.with_overrides(lookup)?;
    if let Some(ref url) = args.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    if let Some(timeout) = args.timeout {
        let timeout_ms = u64::try_from(timeout.as_millis())
            .map_err(|_| CliError::config(format!("timeout {timeout:?} is too large")))?;
        config = config.with_timeout_ms(timeout_ms);
    }
    if let Some(poll_interval_ms) = args.poll_interval_ms {
        config = config.with_poll_interval_ms(poll_interval_ms);
    }
    if args.exact {
        config = config.with_exact(true);
    }
    config.validate()?;

    if config.base_url.is_empty() {
        return Err(CliError::config(format!(
            "no base URL; pass --base-url, set {} or add base_url to the config file",
            vaxprobe::ENV_BASE_URL
        )));
    }
    Ok(config)
}

/// Chromium options from the browser flags
#[cfg(feature = "browser")]
#[must_use]
pub fn browser_options(args: &BrowserArgs) -> BrowserOptions {
    let mut options = BrowserOptions::default();
    if args.headed {
        options = options.headed();
    }
    if args.no_sandbox {
        options = options.without_sandbox();
    }
    if let Some(ref path) = args.chromium {
        options = options.with_chromium_path(path);
    }
    options
}

/// Launch Chromium and open a session on it
#[cfg(feature = "browser")]
pub async fn launch_session(
    harness: HarnessConfig,
    browser: &BrowserArgs,
) -> CliResult<Session<CdpDriver>> {
    let driver = CdpDriver::launch(&browser_options(browser)).await?;
    Ok(Session::new(driver, harness))
}

/// Close the browser behind a session, logging rather than failing
#[cfg(feature = "browser")]
pub async fn close_session(session: Session<CdpDriver>) {
    if let Err(e) = session.into_driver().close().await {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
}

/// Start the runtime the browser commands block on
#[cfg(feature = "browser")]
pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create async runtime: {e}")))
}

/// Error for browser commands in a build without Chromium support
#[cfg(not(feature = "browser"))]
pub(crate) fn browser_disabled() -> CliError {
    CliError::config("browser support not enabled. Rebuild with --features browser")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    mod layering_tests {
        use super::*;

        #[test]
        fn test_flags_only() {
            let args = HarnessArgs {
                base_url: Some("https://mavis.test".into()),
                timeout_ms: Some(5000),
                ..HarnessArgs::default()
            };
            let config = harness_config_with(&args, env(&[])).unwrap();
            assert_eq!(config.base_url, "https://mavis.test");
            assert_eq!(config.timeout_ms, 5000);
            assert!(!config.exact);
        }

        #[test]
        fn test_timeout_duration_flag() {
            let args = HarnessArgs {
                base_url: Some("https://mavis.test".into()),
                timeout: Some(std::time::Duration::from_secs(90)),
                ..HarnessArgs::default()
            };
            let config =
                harness_config_with(&args, env(&[("VAXPROBE_TIMEOUT_MS", "4000")])).unwrap();
            assert_eq!(config.timeout_ms, 90_000);
        }

        #[test]
        fn test_flag_beats_environment() {
            let args = HarnessArgs {
                base_url: Some("https://flag.test".into()),
                ..HarnessArgs::default()
            };
            let config = harness_config_with(
                &args,
                env(&[
                    ("VAXPROBE_BASE_URL", "https://env.test"),
                    ("VAXPROBE_EXACT", "yes"),
                ]),
            )
            .unwrap();
            assert_eq!(config.base_url, "https://flag.test");
            assert!(config.exact);
        }

        #[test]
        fn test_environment_beats_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: https://file.test\ntimeout_ms: 9000").unwrap();
            let args = HarnessArgs {
                config: Some(file.path().to_path_buf()),
                ..HarnessArgs::default()
            };
            let config =
                harness_config_with(&args, env(&[("VAXPROBE_TIMEOUT_MS", "4000")])).unwrap();
            assert_eq!(config.base_url, "https://file.test");
            assert_eq!(config.timeout_ms, 4000);
        }
    }

    mod rejection_tests {
        use super::*;

        #[test]
        fn test_missing_base_url() {
            let err = harness_config_with(&HarnessArgs::default(), env(&[])).unwrap_err();
            assert!(matches!(err, CliError::Config { .. }));
            assert!(err.to_string().contains("VAXPROBE_BASE_URL"));
        }

        #[test]
        fn test_poll_longer_than_timeout() {
            let args = HarnessArgs {
                base_url: Some("https://mavis.test".into()),
                timeout_ms: Some(100),
                poll_interval_ms: Some(500),
                ..HarnessArgs::default()
            };
            let err = harness_config_with(&args, env(&[])).unwrap_err();
            assert!(matches!(err, CliError::Probe(_)));
        }

        #[test]
        fn test_missing_config_file() {
            let args = HarnessArgs {
                config: Some("/nonexistent/vaxprobe.yaml".into()),
                base_url: Some("https://mavis.test".into()),
                ..HarnessArgs::default()
            };
            let err = harness_config_with(&args, env(&[])).unwrap_err();
            assert!(err.to_string().contains("/nonexistent/vaxprobe.yaml"));
        }
    }

    #[cfg(feature = "browser")]
    mod browser_tests {
        use super::*;

        #[test]
        fn test_browser_options_from_flags() {
            let args = BrowserArgs {
                headed: true,
                no_sandbox: true,
                chromium: Some("/usr/bin/chromium".into()),
            };
            let options = browser_options(&args);
            assert!(!options.headless);
            assert!(!options.sandbox);
            assert_eq!(
                options.chromium_path.as_deref(),
                Some(std::path::Path::new("/usr/bin/chromium"))
            );
        }

        #[test]
        fn test_default_browser_is_headless_and_sandboxed() {
            let options = browser_options(&BrowserArgs::default());
            assert!(options.headless);
            assert!(options.sandbox);
        }
    }
}
