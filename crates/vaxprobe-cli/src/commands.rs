//! CLI command definitions using clap

use crate::families::Family;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use vaxprobe::helpers::parse_duration_spec;

/// Vaxprobe: data-driven browser checks for the school vaccination service
#[derive(Parser, Debug)]
#[command(name = "vaxprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every scenario of a worksheet in a browser
    Run(RunArgs),

    /// Map a worksheet against its schema without starting a browser
    Validate(ValidateArgs),

    /// Print the columns of a scenario family
    Schema(SchemaArgs),

    /// Walk a fixed page journey in a browser
    Journey(JourneyArgs),
}

/// Harness settings shared by the browser commands
#[derive(Args, Debug, Clone, Default)]
pub struct HarnessArgs {
    /// YAML harness configuration file
    #[arg(short, long, env = "VAXPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the service under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bound on each action and verification, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Bound on each action and verification as a duration (`30s`, `2m`, `1h`)
    #[arg(long, value_parser = parse_timeout, conflicts_with = "timeout_ms")]
    pub timeout: Option<Duration>,

    /// Polling cadence, in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Match text exactly by default
    #[arg(long)]
    pub exact: bool,
}

fn parse_timeout(spec: &str) -> Result<Duration, String> {
    parse_duration_spec(spec).map_err(|e| e.to_string())
}

/// Browser launch settings
#[derive(Args, Debug, Clone, Default)]
pub struct BrowserArgs {
    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable Chromium's sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long, env = "VAXPROBE_CHROMIUM")]
    pub chromium: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Worksheet (CSV) to run
    pub sheet: PathBuf,

    /// Scenario family; defaults to the worksheet's file stem
    #[arg(short, long)]
    pub family: Option<Family>,

    /// Path of the consent wizard's start page
    #[arg(long, default_value = "/consents/start")]
    pub start_path: String,

    /// Write the JSON run report here
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Harness settings
    #[command(flatten)]
    pub harness: HarnessArgs,

    /// Browser settings
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Worksheet (CSV) to check
    pub sheet: PathBuf,

    /// Scenario family; defaults to the worksheet's file stem
    #[arg(short, long)]
    pub family: Option<Family>,
}

/// Arguments for the schema command
#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Scenario family
    #[arg(default_value = "parental_consent_hpv")]
    pub family: Family,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the journey command
#[derive(Parser, Debug)]
pub struct JourneyArgs {
    /// Journey to walk
    pub journey: Journey,

    /// Vaccine for the batch journey
    #[arg(long, default_value = "Gardasil 9 (HPV)")]
    pub vaccine: String,

    /// Child to search for in the children journey
    #[arg(long, default_value = "CFILTER1, CFilter1")]
    pub child: String,

    /// Child to remove from the cohort after the children checks
    #[arg(long)]
    pub remove_child: Option<String>,

    /// Harness settings
    #[command(flatten)]
    pub harness: HarnessArgs,

    /// Browser settings
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Fixed page journeys
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Journey {
    /// Check the vaccine, then add, change and archive a batch
    Batches,
    /// Check the children list headers and search filter
    Children,
}

/// Color choice argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
