//! Vaxprobe: data-driven browser verification for a school-vaccination service
//!
//! Page objects describe screens in terms of symbolic locators and talk to
//! the browser through two calls, `act` and `verify`. Underneath, a small
//! engine resolves locators strictly, dispatches actions with actionability
//! and settle waits, and retries property checks within a bounded timeout.
//! Scenario inputs come from CSV worksheets mapped onto typed records before
//! the first browser interaction.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────────────┐
//! │  Worksheet   │──►│ RowMapper     │──►│ ScenarioRunner       │
//! │  (CSV rows)  │   │ (schema)      │   │ (one run per record) │
//! └──────────────┘   └───────────────┘   └──────────┬───────────┘
//!                                                   │ Workflow
//!                                                   ▼
//!                                        ┌──────────────────────┐
//!                                        │ Session: act/verify  │
//!                                        └──────────┬───────────┘
//!                       ┌───────────────────────────┼───────────────┐
//!                       ▼                           ▼               ▼
//!               ActionDispatcher            PropertyVerifier   LocatorResolver
//!                       └───────────────────────────┴───────────────┘
//!                                                   ▼
//!                                      PageDriver (MockDriver | CdpDriver)
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Action kinds, validated requests and the dispatcher
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod action;

/// Chromium driver (requires the `browser` feature)
#[cfg(feature = "browser")]
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::needless_raw_string_hashes
)]
pub mod cdp;

mod config;

/// Driver boundary and the in-memory test driver
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
pub mod driver;

/// Date, time and text helpers
#[allow(clippy::missing_errors_doc)]
pub mod helpers;

mod locator;

#[allow(clippy::missing_errors_doc)]
mod page_object;

mod resolver;
mod result;

/// Sequential scenario runner and run reports
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod runner;

/// Worksheets, schemas and typed scenario records
#[allow(clippy::missing_errors_doc)]
pub mod scenario;

mod session;

/// Retrying property verification
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod verify;

pub use action::{ActionDispatcher, ActionKind, ActionRequest, SettleCondition};
#[cfg(feature = "browser")]
pub use cdp::{BrowserOptions, CdpDriver};
pub use config::{
    HarnessConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS, ENV_BASE_URL, ENV_EXACT,
    ENV_POLL_INTERVAL_MS, ENV_TIMEOUT_MS,
};
pub use driver::{
    ElementHandle, ElementQuery, ElementState, MockDriver, MockEffect, MockElement, PageDriver,
    ReadyState,
};
pub use locator::{Container, LocatorSpec, NameMatch, Role};
pub use page_object::{PageObject, UrlMatcher};
pub use resolver::LocatorResolver;
pub use result::{ProbeError, ProbeResult};
pub use runner::{FailureDetail, Outcome, RunReport, ScenarioRun, ScenarioRunner, Workflow};
pub use scenario::{
    FieldKind, FieldSpec, FieldValue, RawRow, ScenarioRecord, ScenarioRowMapper, ScenarioSchema,
    Worksheet, SCENARIO_ID_COLUMN,
};
pub use session::Session;
pub use verify::{
    normalize_text, MatchMode, PropertyKind, PropertyVerifier, VerificationOutcome,
    VerificationRequest,
};

/// Prelude for page objects and workflows
pub mod prelude {
    pub use super::{
        ActionKind, HarnessConfig, LocatorSpec, PageDriver, PageObject, ProbeError, ProbeResult,
        PropertyKind, Role, ScenarioRecord, Session, Workflow,
    };
}
