//! End-to-end tests driving page objects through the public API.
//!
//! Everything runs against `MockDriver`, so these exercise the real
//! resolver, dispatcher, verifier and runner loops without a browser.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use async_trait::async_trait;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use vaxprobe::prelude::*;
use vaxprobe::{MockDriver, MockEffect, MockElement, ScenarioRunner, ScenarioSchema, Worksheet};

fn config() -> HarnessConfig {
    HarnessConfig::default()
        .with_timeout_ms(300)
        .with_poll_interval_ms(10)
}

// ============================================================================
// Batch lifecycle
// ============================================================================

struct Vaccines;

impl PageObject for Vaccines {
    fn url_pattern(&self) -> &str {
        "/vaccines"
    }

    fn ready_marker(&self) -> Option<LocatorSpec> {
        Some(LocatorSpec::role(Role::Main))
    }
}

impl Vaccines {
    async fn archive<D: PageDriver>(&self, session: &Session<D>, batch: &str) -> ProbeResult<()> {
        session
            .act(batch, ActionKind::ClickLinkIndexForRow, None, Some(1))
            .await?;
        session
            .act("Yes, archive this batch", ActionKind::ClickButton, None, None)
            .await?;
        session
            .verify(Role::Main, PropertyKind::Text, "Batch archived.", None)
            .await?;
        Ok(())
    }
}

fn vaccines_page() -> MockDriver {
    let driver = MockDriver::new();
    driver.add(MockElement::new("main", Role::Main).text("Gardasil 9 (HPV) Merck Sharp & Dohme"));
    driver.add(
        MockElement::new("row1", Role::Row)
            .text("GardasilBatch1 1 April 2026")
            .child_of("main"),
    );
    driver.add(MockElement::new("change1", Role::Link).named("Change").child_of("row1"));
    driver.add(MockElement::new("archive1", Role::Link).named("Archive").child_of("row1"));
    driver.add(
        MockElement::new("row2", Role::Row)
            .text("GardasilBatch2 1 May 2026")
            .child_of("main"),
    );
    driver.add(MockElement::new("change2", Role::Link).named("Change").child_of("row2"));
    driver.add(MockElement::new("archive2", Role::Link).named("Archive").child_of("row2"));
    driver.add(
        MockElement::new("confirm", Role::Button)
            .named("Yes, archive this batch")
            .hidden(),
    );
    driver.on_click(
        "archive1",
        MockEffect::Navigate {
            url: "https://mavis.test/vaccines/batches/1/archive".into(),
            load_for: Duration::from_millis(40),
        },
    );
    driver.on_click(
        "archive1",
        MockEffect::Show {
            element: "confirm".into(),
        },
    );
    driver.on_click(
        "confirm",
        MockEffect::SetText {
            element: "main".into(),
            text: "Batch archived.".into(),
            after: Duration::from_millis(30),
        },
    );
    driver
}

#[tokio::test]
async fn test_archive_batch_uses_second_link_in_row() {
    let session = Session::new(vaccines_page(), config().with_base_url("https://mavis.test"));
    session.open(&Vaccines).await.unwrap();
    session
        .verify(Role::Main, PropertyKind::Text, "Gardasil 9 (HPV)", Some(false))
        .await
        .unwrap();

    Vaccines.archive(&session, "GardasilBatch1").await.unwrap();

    let driver = session.driver();
    assert!(driver.was_called("click:archive1"));
    assert!(!driver.was_called("click:change1"));
    assert!(!driver.was_called("click:archive2"));
    assert!(driver.was_called("click:confirm"));
}

#[tokio::test]
async fn test_verification_timeout_reports_expected_and_observed() {
    let session = Session::new(vaccines_page(), config());
    let err = session
        .verify(Role::Main, PropertyKind::Text, "Batch archived.", Some(true))
        .await
        .unwrap_err();
    match err {
        ProbeError::VerificationTimeout {
            expected, observed, ..
        } => {
            assert_eq!(expected, "Batch archived.");
            assert_eq!(observed, "Gardasil 9 (HPV) Merck Sharp & Dohme");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_row_link_without_index_is_ambiguous() {
    let session = Session::new(vaccines_page(), config());
    let err = session
        .resolve(&LocatorSpec::role(Role::Link).in_row("GardasilBatch2"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::AmbiguousLocator { count: 2, .. }));
}

// ============================================================================
// Data-driven search
// ============================================================================

struct SearchChild;

#[async_trait]
impl Workflow<MockDriver> for SearchChild {
    fn name(&self) -> &str {
        "search-child"
    }

    async fn execute(&self, session: &Session<MockDriver>, record: &ScenarioRecord) -> ProbeResult<()> {
        let child = record.text_or_empty("ChildName");
        session.act("Search", ActionKind::Fill, Some(child), None).await?;
        session.act("Search", ActionKind::ClickButton, None, None).await?;
        session.verify(Role::Main, PropertyKind::Text, child, None).await?;
        Ok(())
    }
}

fn children_page() -> MockDriver {
    let driver = MockDriver::new();
    driver.add(MockElement::new("search-box", Role::Textbox).named("Search"));
    driver.add(MockElement::new("search-btn", Role::Button).named("Search"));
    driver.add(MockElement::new("main", Role::Main).text("DOE, Ann  SMITH, Bob"));
    driver
}

fn write_sheet(dir: &TempDir, csv: &str) -> Worksheet {
    let path = dir.path().join("children_search.csv");
    fs::write(&path, csv).unwrap();
    Worksheet::open(&path).unwrap()
}

#[tokio::test]
async fn test_sheet_runs_every_row_and_keeps_failures_isolated() {
    let dir = TempDir::new().unwrap();
    let sheet = write_sheet(
        &dir,
        "ScenarioId,ChildName\nfind-ann,\"DOE, Ann\"\nfind-carol,\"JONES, Carol\"\nfind-bob,\"SMITH, Bob\"\n",
    );
    let schema = ScenarioSchema::new("children_search").required_text("ChildName");

    let runner = ScenarioRunner::new(Session::new(children_page(), config()));
    let report = runner.run_sheet(&sheet, &schema, &SearchChild).await.unwrap();

    assert_eq!(report.family, "children_search");
    assert_eq!(report.total(), 3);
    assert_eq!(report.passed_count(), 2);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].scenario_id(), "find-carol");
    let detail = failures[0].failure().unwrap();
    assert_eq!(detail.kind, "verification_timeout");
    assert_eq!(detail.expected.as_deref(), Some("JONES, Carol"));

    let history = runner.session().driver().history();
    assert!(history.contains(&"type:search-box:SMITH, Bob".to_string()));
}

#[tokio::test]
async fn test_missing_required_cell_aborts_whole_sheet() {
    let dir = TempDir::new().unwrap();
    let sheet = write_sheet(&dir, "ScenarioId,ChildName\nfind-ann,\"DOE, Ann\"\nblank-name,\n");
    let schema = ScenarioSchema::new("children_search").required_text("ChildName");

    let runner = ScenarioRunner::new(Session::new(children_page(), config()));
    let err = runner.run_sheet(&sheet, &schema, &SearchChild).await.unwrap_err();
    match err {
        ProbeError::SchemaMismatch { row, field, .. } => {
            assert_eq!(row, "blank-name");
            assert_eq!(field, "ChildName");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(runner.session().driver().history().is_empty());
}
