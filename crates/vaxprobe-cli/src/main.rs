//! Vaxprobe CLI: data-driven browser checks for the school vaccination service
//!
//! ## Usage
//!
//! ```bash
//! vaxprobe schema                                   # Columns of a scenario family
//! vaxprobe validate parental_consent_hpv.csv        # Map a worksheet, no browser
//! vaxprobe run parental_consent_hpv.csv \
//!     --base-url https://mavis.test --report out/report.json
//! vaxprobe journey batches --base-url https://mavis.test
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vaxprobe_cli::{
    handlers::{execute_journey, execute_run, execute_schema, execute_validate},
    Cli, CliConfig, CliResult, Commands, LogFormat, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::Run(args) => execute_run(&config, &args),
        Commands::Validate(args) => execute_validate(&args),
        Commands::Schema(args) => execute_schema(&args),
        Commands::Journey(args) => execute_journey(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_format(cli.log_format.into())
}

/// `RUST_LOG` wins over the level implied by `-q`/`-v`
fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.default_log_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.log_format {
        LogFormat::Text => builder
            .with_ansi(config.color.should_color())
            .with_target(false)
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        eprintln!("Warning: logging disabled: {e}");
    }
}
