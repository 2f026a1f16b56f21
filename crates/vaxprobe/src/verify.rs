//! Retrying property verification.
//!
//! A [`PropertyVerifier`] polls one property of one element until it matches
//! or the configured timeout elapses. Each poll re-resolves the locator, so
//! elements that appear late or are re-rendered between polls are handled.
//! Every driver call is bounded by the time left, so a hung browser cannot
//! stretch a verification past its timeout.

use crate::config::HarnessConfig;
use crate::driver::PageDriver;
use crate::locator::LocatorSpec;
use crate::resolver::LocatorResolver;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// Placeholder recorded as the observed value while no element matches
pub const NOT_FOUND_OBSERVATION: &str = "<element not found>";

/// Placeholder recorded when a driver call outlives the deadline
pub const DRIVER_TIMEOUT_OBSERVATION: &str = "<driver call timed out>";

/// Trim and fold every whitespace run (tabs, newlines, NBSP) to one space
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Property extracted from an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Rendered text content
    Text,
    /// Whether the element is rendered visible
    Visibility,
    /// Form control value
    Value,
}

impl PropertyKind {
    /// Property name as used in reports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Visibility => "visibility",
            Self::Value => "value",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "visibility" | "visible" => Ok(Self::Visibility),
            "value" => Ok(Self::Value),
            _ => Err(ProbeError::invalid_request(format!(
                "unknown property {s:?}"
            ))),
        }
    }
}

/// Comparison mode for text and value checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Normalized equality
    Exact,
    /// Normalized expected is a substring of normalized observed
    Contains,
}

impl MatchMode {
    /// Mode for an `exact` flag
    #[must_use]
    pub const fn from_exact(exact: bool) -> Self {
        if exact {
            Self::Exact
        } else {
            Self::Contains
        }
    }

    /// Compare after whitespace normalization
    #[must_use]
    pub fn matches(self, observed: &str, expected: &str) -> bool {
        let observed = normalize_text(observed);
        let expected = normalize_text(expected);
        match self {
            Self::Exact => observed == expected,
            Self::Contains => observed.contains(&expected),
        }
    }
}

/// One property check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Element to check
    pub locator: LocatorSpec,
    /// Property to extract
    pub property: PropertyKind,
    /// Expected value (ignored for visibility)
    pub expected: String,
    /// Match mode override; `None` uses the session default
    pub exact: Option<bool>,
}

impl VerificationRequest {
    /// Build and validate a request.
    ///
    /// Text and value checks need an expected value; visibility ignores it.
    pub fn new(
        locator: impl Into<LocatorSpec>,
        property: PropertyKind,
        expected: Option<&str>,
        exact: Option<bool>,
    ) -> ProbeResult<Self> {
        let locator = locator.into();
        let expected = match (property, expected) {
            (PropertyKind::Visibility, _) => String::new(),
            (_, Some(expected)) => expected.to_string(),
            (_, None) => {
                return Err(ProbeError::invalid_request(format!(
                    "{property} check on {locator} needs an expected value"
                )))
            }
        };
        Ok(Self {
            locator,
            property,
            expected,
            exact,
        })
    }

    /// Check rendered text
    #[must_use]
    pub fn text(locator: impl Into<LocatorSpec>, expected: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            property: PropertyKind::Text,
            expected: expected.into(),
            exact: None,
        }
    }

    /// Check the element is visible
    #[must_use]
    pub fn visible(locator: impl Into<LocatorSpec>) -> Self {
        Self {
            locator: locator.into(),
            property: PropertyKind::Visibility,
            expected: String::new(),
            exact: None,
        }
    }

    /// Check a form control's value
    #[must_use]
    pub fn value(locator: impl Into<LocatorSpec>, expected: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            property: PropertyKind::Value,
            expected: expected.into(),
            exact: None,
        }
    }

    /// Override the match mode
    #[must_use]
    pub const fn with_exact(mut self, exact: bool) -> Self {
        self.exact = Some(exact);
        self
    }

    fn expected_display(&self) -> String {
        match self.property {
            PropertyKind::Visibility => "visible".to_string(),
            PropertyKind::Text | PropertyKind::Value => normalize_text(&self.expected),
        }
    }
}

/// A satisfied verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// Normalized value that matched
    pub observed: String,
    /// Number of polls it took
    pub attempts: usize,
    /// Time spent
    pub elapsed: Duration,
}

/// Polls a property until it matches or the timeout elapses
#[derive(Debug)]
pub struct PropertyVerifier<'a, D: ?Sized> {
    driver: &'a D,
    config: &'a HarnessConfig,
}

impl<'a, D: PageDriver + ?Sized> PropertyVerifier<'a, D> {
    /// Create a verifier
    #[must_use]
    pub const fn new(driver: &'a D, config: &'a HarnessConfig) -> Self {
        Self { driver, config }
    }

    /// Run the verification.
    ///
    /// Missing elements and driver hiccups count as failed polls. An
    /// ambiguous locator or an invalid request fails immediately.
    pub async fn verify(&self, request: &VerificationRequest) -> ProbeResult<VerificationOutcome> {
        let timeout = self.config.timeout();
        let poll = self.config.poll_interval();
        let mode = MatchMode::from_exact(request.exact.unwrap_or(self.config.exact));

        let start = Instant::now();
        let deadline = start + timeout;
        let mut attempts = 0;
        let mut observed = NOT_FOUND_OBSERVATION.to_string();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            attempts += 1;

            match tokio::time::timeout(remaining, self.observe(request)).await {
                Ok(Ok(Observation { value, satisfied })) => {
                    let value = normalize_text(&value);
                    let matched = match request.property {
                        PropertyKind::Visibility => satisfied,
                        PropertyKind::Text | PropertyKind::Value => {
                            mode.matches(&value, &request.expected)
                        }
                    };
                    debug!(
                        locator = %request.locator,
                        property = %request.property,
                        attempt = attempts,
                        observed = %value,
                        matched,
                        "verification poll"
                    );
                    if matched {
                        return Ok(VerificationOutcome {
                            observed: value,
                            attempts,
                            elapsed: start.elapsed(),
                        });
                    }
                    observed = value;
                }
                Ok(Err(ProbeError::ElementNotFound { .. })) => {
                    observed = NOT_FOUND_OBSERVATION.to_string();
                }
                Ok(Err(ProbeError::Driver { message })) => {
                    debug!(locator = %request.locator, %message, "driver error during poll");
                    observed = format!("<driver error: {message}>");
                }
                Ok(Err(err)) => return Err(err),
                Err(_) => {
                    observed = DRIVER_TIMEOUT_OBSERVATION.to_string();
                    break;
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(poll.min(remaining)).await;
        }

        Err(ProbeError::VerificationTimeout {
            locator: request.locator.to_string(),
            property: request.property.to_string(),
            expected: request.expected_display(),
            observed,
            timeout_ms: self.config.timeout_ms,
            attempts,
        })
    }

    async fn observe(&self, request: &VerificationRequest) -> ProbeResult<Observation> {
        let handle = LocatorResolver::new(self.driver)
            .resolve(&request.locator)
            .await?;
        let state = self.driver.state(&handle).await?;
        if !state.attached {
            return Err(ProbeError::ElementNotFound {
                locator: request.locator.to_string(),
            });
        }
        Ok(match request.property {
            PropertyKind::Text => Observation {
                value: state.text,
                satisfied: false,
            },
            PropertyKind::Value => Observation {
                value: state.value.unwrap_or_default(),
                satisfied: false,
            },
            PropertyKind::Visibility => Observation {
                value: if state.visible { "visible" } else { "hidden" }.to_string(),
                satisfied: state.visible,
            },
        })
    }
}

struct Observation {
    value: String,
    satisfied: bool,
}
