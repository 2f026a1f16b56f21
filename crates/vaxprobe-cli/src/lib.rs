//! Vaxprobe CLI library
//!
//! Scenario families, page objects and workflows for the school vaccination
//! service, plus the command handlers behind the `vaxprobe` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod families;
pub mod handlers;
mod output;
pub mod pages;
pub mod workflows;

pub use commands::{
    BrowserArgs, Cli, ColorArg, Commands, HarnessArgs, Journey, JourneyArgs, LogFormatArg,
    RunArgs, SchemaArgs, ValidateArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use families::Family;
pub use output::{summary_line, ProgressReporter};
pub use workflows::ParentalConsentWorkflow;
