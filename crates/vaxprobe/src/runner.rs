//! Scenario runner.
//!
//! Runs a [`Workflow`] once per [`ScenarioRecord`], strictly in order, on one
//! session. Whatever a scenario does wrong (an error or a panic) becomes a
//! failed [`ScenarioRun`]; the next record still runs.

use crate::driver::PageDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{ScenarioRecord, ScenarioRowMapper, ScenarioSchema, Worksheet};
use crate::session::Session;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// A business flow driven once per scenario record
#[async_trait]
pub trait Workflow<D: PageDriver>: Send + Sync {
    /// Workflow name for reports
    fn name(&self) -> &str;

    /// Drive the application for one record
    async fn execute(&self, session: &Session<D>, record: &ScenarioRecord) -> ProbeResult<()>;
}

/// Scenario outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Workflow completed
    Passed,
    /// Workflow returned an error or panicked
    Failed,
}

/// Why a scenario failed, with the original error's details preserved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    /// Error kind (`verification_timeout`, `panic`, ...)
    pub kind: String,
    /// Full error message
    pub message: String,
    /// Expected value, for verification failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Last observed value, for verification failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
}

impl FailureDetail {
    /// Capture an error
    #[must_use]
    pub fn from_error(err: &ProbeError) -> Self {
        let (expected, observed) = match err {
            ProbeError::VerificationTimeout {
                expected, observed, ..
            } => (Some(expected.clone()), Some(observed.clone())),
            _ => (None, None),
        };
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            expected,
            observed,
        }
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "workflow panicked".to_string());
        Self {
            kind: "panic".to_string(),
            message,
            expected: None,
            observed: None,
        }
    }
}

/// One record's result, immutable once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioRun {
    scenario_id: String,
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<FailureDetail>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
}

impl ScenarioRun {
    /// Scenario identity
    #[must_use]
    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    /// Outcome
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Whether the scenario passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// Failure detail, for failed runs
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureDetail> {
        self.failure.as_ref()
    }

    /// Wall-clock duration
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }
}

/// All runs of one pass over a worksheet
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique id of this pass
    pub run_id: Uuid,
    /// Scenario family
    pub family: String,
    /// Workflow name
    pub workflow: String,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// One entry per record, in source order
    pub runs: Vec<ScenarioRun>,
    /// Total duration
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl RunReport {
    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.runs.iter().all(ScenarioRun::passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.runs.iter().filter(|r| r.passed()).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.runs.iter().filter(|r| !r.passed()).count()
    }

    /// Total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.runs.len()
    }

    /// Failed runs
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioRun> {
        self.runs.iter().filter(|r| !r.passed()).collect()
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Sequential runner owning one browser session
#[derive(Debug)]
pub struct ScenarioRunner<D> {
    session: Session<D>,
}

impl<D: PageDriver> ScenarioRunner<D> {
    /// Create a runner over a session
    #[must_use]
    pub const fn new(session: Session<D>) -> Self {
        Self { session }
    }

    /// The owned session
    #[must_use]
    pub const fn session(&self) -> &Session<D> {
        &self.session
    }

    /// Give the session back
    #[must_use]
    pub fn into_session(self) -> Session<D> {
        self.session
    }

    /// Map a worksheet, then run every record.
    ///
    /// A schema mismatch anywhere in the sheet fails here, before the first
    /// scenario touches the browser.
    pub async fn run_sheet(
        &self,
        sheet: &Worksheet,
        schema: &ScenarioSchema,
        workflow: &dyn Workflow<D>,
    ) -> ProbeResult<RunReport> {
        let records = ScenarioRowMapper::new(schema).map_all(sheet)?;
        Ok(self.run(&records, workflow).await)
    }

    /// Run every record, in order
    pub async fn run(&self, records: &[ScenarioRecord], workflow: &dyn Workflow<D>) -> RunReport {
        self.run_with(records, workflow, |_| {}).await
    }

    /// Run every record, calling `observer` after each one
    pub async fn run_with(
        &self,
        records: &[ScenarioRecord],
        workflow: &dyn Workflow<D>,
        mut observer: impl FnMut(&ScenarioRun) + Send,
    ) -> RunReport {
        let started_at = Utc::now();
        let started = Instant::now();
        let family = records
            .first()
            .map(|r| r.family().to_string())
            .unwrap_or_default();
        info!(family = %family, workflow = workflow.name(), scenarios = records.len(), "run started");

        let mut runs = Vec::with_capacity(records.len());
        for record in records {
            let run = self.run_one(record, workflow).await;
            observer(&run);
            runs.push(run);
        }

        let report = RunReport {
            run_id: Uuid::new_v4(),
            family,
            workflow: workflow.name().to_string(),
            started_at,
            runs,
            duration: started.elapsed(),
        };
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            "run finished"
        );
        report
    }

    async fn run_one(&self, record: &ScenarioRecord, workflow: &dyn Workflow<D>) -> ScenarioRun {
        let span = info_span!("scenario", id = record.scenario_id(), family = record.family());
        let started = Instant::now();

        let attempt = async {
            if !self.session.config().base_url.is_empty() {
                self.session.goto("").await?;
            }
            workflow.execute(&self.session, record).await
        };
        let result = AssertUnwindSafe(attempt.instrument(span.clone()))
            .catch_unwind()
            .await;

        let failure = match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => {
                span.in_scope(|| {
                    if err.is_scenario_scoped() {
                        warn!(error = %err, "scenario failed");
                    } else {
                        error!(error = %err, "scenario failed on a run-wide error");
                    }
                });
                Some(FailureDetail::from_error(&err))
            }
            Err(payload) => {
                let detail = FailureDetail::from_panic(&*payload);
                span.in_scope(|| error!(message = %detail.message, "scenario panicked"));
                Some(detail)
            }
        };

        ScenarioRun {
            scenario_id: record.scenario_id().to_string(),
            outcome: if failure.is_some() {
                Outcome::Failed
            } else {
                Outcome::Passed
            },
            failure,
            duration: started.elapsed(),
        }
    }
}
