//! Result and error types for Vaxprobe.

use thiserror::Error;

/// Result type for Vaxprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving or verifying a page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No element matched the locator
    #[error("No element matches {locator}")]
    ElementNotFound {
        /// Rendered locator
        locator: String,
    },

    /// More than one element matched and nothing disambiguated them
    #[error("Locator {locator} is ambiguous: {count} elements match")]
    AmbiguousLocator {
        /// Rendered locator
        locator: String,
        /// Number of matching elements
        count: usize,
    },

    /// An action's pre- or post-condition was never reached
    #[error("{action} on {locator} timed out after {timeout_ms}ms waiting for {condition}")]
    ActionTimeout {
        /// Action kind
        action: String,
        /// Rendered locator
        locator: String,
        /// Condition that was never met
        condition: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// A verification was never satisfied within its budget
    #[error(
        "{property} of {locator} did not match within {timeout_ms}ms \
         ({attempts} attempt(s)): expected {expected:?}, last observed {observed:?}"
    )]
    VerificationTimeout {
        /// Rendered locator
        locator: String,
        /// Property that was checked
        property: String,
        /// Expected value (normalized)
        expected: String,
        /// Last observed value (normalized)
        observed: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Number of polls performed
        attempts: usize,
    },

    /// A data row does not fit its scenario schema
    #[error("Schema mismatch in {family} {row}: field {field:?} {reason}")]
    SchemaMismatch {
        /// Scenario family (worksheet)
        family: String,
        /// Row identity
        row: String,
        /// Offending field or column
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// A request violated its kind's contract (e.g. FILL without a value)
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// The browser driver reported a failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProbeError {
    /// Create an invalid request error
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind, used in run reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ElementNotFound { .. } => "element_not_found",
            Self::AmbiguousLocator { .. } => "ambiguous_locator",
            Self::ActionTimeout { .. } => "action_timeout",
            Self::VerificationTimeout { .. } => "verification_timeout",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Driver { .. } => "driver",
            Self::Navigation { .. } => "navigation",
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Csv(_) => "csv",
            Self::Yaml(_) => "yaml",
            Self::Json(_) => "json",
        }
    }

    /// Whether this error is confined to the scenario that raised it.
    ///
    /// Schema and configuration errors describe the whole run's inputs and
    /// abort it; everything else fails only the current scenario.
    #[must_use]
    pub const fn is_scenario_scoped(&self) -> bool {
        !matches!(
            self,
            Self::SchemaMismatch { .. } | Self::Config { .. } | Self::Csv(_) | Self::Yaml(_)
        )
    }
}
