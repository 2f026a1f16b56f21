//! Journey command handler

use super::harness::build_harness_config;
use crate::commands::{Journey, JourneyArgs};
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use crate::pages::{ChildrenPage, VaccinesPage};
use tracing::info;
use vaxprobe::{PageDriver, Session};

/// Execute the journey command
pub fn execute_journey(config: &CliConfig, args: &JourneyArgs) -> CliResult<()> {
    let harness = build_harness_config(&args.harness)?;
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    info!(journey = ?args.journey, base_url = %harness.base_url, "journey started");
    walk_in_browser(args, harness, &reporter)
}

#[cfg(feature = "browser")]
fn walk_in_browser(
    args: &JourneyArgs,
    harness: vaxprobe::HarnessConfig,
    reporter: &ProgressReporter,
) -> CliResult<()> {
    use super::harness::{close_session, launch_session, runtime};

    runtime()?.block_on(async {
        let session = launch_session(harness, &args.browser).await?;
        let result = walk_journey(&session, args, reporter).await;
        close_session(session).await;
        result
    })
}

#[cfg(not(feature = "browser"))]
fn walk_in_browser(
    _args: &JourneyArgs,
    _harness: vaxprobe::HarnessConfig,
    _reporter: &ProgressReporter,
) -> CliResult<()> {
    Err(super::harness::browser_disabled())
}

/// Walk the selected journey on an open session
pub async fn walk_journey<D: PageDriver>(
    session: &Session<D>,
    args: &JourneyArgs,
    reporter: &ProgressReporter,
) -> CliResult<()> {
    match args.journey {
        Journey::Batches => {
            let page = VaccinesPage;
            session.open(&page).await?;
            page.verify_current_vaccine(session).await?;
            let batch = page.add_batch(session, &args.vaccine).await?;
            reporter.success(&format!("Batch {} added", batch.name));
            page.change_batch(session, &batch).await?;
            reporter.success(&format!("Batch {} updated", batch.name));
            page.archive_batch(session, &batch).await?;
            reporter.success(&format!("Batch {} archived", batch.name));
        }
        Journey::Children => {
            let page = ChildrenPage;
            session.open(&page).await?;
            page.verify_headers(session).await?;
            page.verify_filter(session, &args.child).await?;
            reporter.success(&format!("Search narrowed the list to {}", args.child));
            if let Some(ref child) = args.remove_child {
                page.remove_child_from_cohort(session, child).await?;
                reporter.success(&format!("{child} removed from cohort"));
            }
        }
    }
    Ok(())
}
