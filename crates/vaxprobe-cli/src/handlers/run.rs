//! Run command handler

use super::harness::build_harness_config;
use super::validate::{map_sheet, resolve_family};
use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::families::Family;
use crate::output::ProgressReporter;
use crate::pages::ConsentPage;
use crate::workflows::ParentalConsentWorkflow;
use std::path::Path;
use tracing::info;
use vaxprobe::helpers::link_formatted_now;
use vaxprobe::{PageDriver, RunReport, ScenarioRecord, ScenarioRunner, Workflow, Worksheet};

/// Execute the run command.
///
/// The whole worksheet is mapped before Chromium starts, so a schema
/// mismatch never opens a browser.
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let sheet = Worksheet::open(&args.sheet)?;
    let family = resolve_family(&sheet, args.family)?;
    let records = map_sheet(&sheet, family)?;
    let harness = build_harness_config(&args.harness)?;
    info!(
        sheet = %args.sheet.display(),
        family = %family,
        scenarios = records.len(),
        base_url = %harness.base_url,
        "worksheet mapped"
    );

    let mut reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
        .with_verbose(config.verbosity.is_verbose());
    reporter.header(&run_title(family, records.len(), &link_formatted_now()));

    let workflow = workflow_for(family, &args.start_path);
    let report = run_in_browser(args, harness, &records, &workflow, &mut reporter)?;

    reporter.summary(&report);
    if let Some(ref path) = args.report {
        write_report(&report, path)?;
        reporter.info(&format!("Report written to {}", path.display()));
    }
    check_outcome(&report)
}

/// Header line; `started` is rendered the way the app renders dates in links
fn run_title(family: Family, scenarios: usize, started: &str) -> String {
    format!("{family}: {scenarios} scenarios, started {started}")
}

fn workflow_for(family: Family, start_path: &str) -> ParentalConsentWorkflow {
    match family {
        Family::ParentalConsentHpv => ParentalConsentWorkflow::new(ConsentPage::new(start_path)),
    }
}

#[cfg(feature = "browser")]
fn run_in_browser(
    args: &RunArgs,
    harness: vaxprobe::HarnessConfig,
    records: &[ScenarioRecord],
    workflow: &ParentalConsentWorkflow,
    reporter: &mut ProgressReporter,
) -> CliResult<RunReport> {
    use super::harness::{close_session, launch_session, runtime};

    runtime()?.block_on(async {
        let session = launch_session(harness, &args.browser).await?;
        let runner = ScenarioRunner::new(session);
        let report = run_records(&runner, records, workflow, reporter).await;
        close_session(runner.into_session()).await;
        Ok::<_, CliError>(report)
    })
}

#[cfg(not(feature = "browser"))]
fn run_in_browser(
    _args: &RunArgs,
    _harness: vaxprobe::HarnessConfig,
    _records: &[ScenarioRecord],
    _workflow: &ParentalConsentWorkflow,
    _reporter: &mut ProgressReporter,
) -> CliResult<RunReport> {
    Err(super::harness::browser_disabled())
}

/// Run every record with a progress bar, one line per failed scenario
pub async fn run_records<D: PageDriver>(
    runner: &ScenarioRunner<D>,
    records: &[ScenarioRecord],
    workflow: &dyn Workflow<D>,
    reporter: &mut ProgressReporter,
) -> RunReport {
    reporter.start_progress(records.len() as u64, workflow.name());
    let report = {
        let reporter = &*reporter;
        runner
            .run_with(records, workflow, |run| reporter.scenario(run))
            .await
    };
    reporter.finish();
    report
}

/// Write the JSON report, creating parent directories
pub fn write_report(report: &RunReport, path: &Path) -> CliResult<()> {
    let json = report
        .to_json()
        .map_err(|e| CliError::report_generation(e.to_string()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// Any failed scenario fails the command
pub fn check_outcome(report: &RunReport) -> CliResult<()> {
    let failed = report.failed_count();
    if failed == 0 {
        return Ok(());
    }
    let ids: Vec<&str> = report.failures().iter().map(|r| r.scenario_id()).collect();
    Err(CliError::scenario_failures(format!(
        "{failed} of {} scenarios failed: {}",
        report.total(),
        ids.join(", ")
    )))
}
