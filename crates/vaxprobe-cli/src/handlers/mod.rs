//! Command handlers, kept out of main.rs so they can be tested
//!
//! Browser-free logic (family resolution, config layering, rendering, the
//! scenario loop over any `PageDriver`) lives here; only the Chromium launch
//! is behind the `browser` feature.

pub mod harness;
pub mod journey;
pub mod run;
pub mod schema;
pub mod validate;

pub use harness::{build_harness_config, harness_config_with};
#[cfg(feature = "browser")]
pub use harness::{browser_options, close_session, launch_session};
pub use journey::{execute_journey, walk_journey};
pub use run::{check_outcome, execute_run, run_records, write_report};
pub use schema::{execute_schema, render_schema};
pub use validate::{execute_validate, resolve_family};
