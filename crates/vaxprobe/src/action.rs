//! Action dispatch.
//!
//! [`ActionRequest`]s are validated when built, so a FILL without a value or
//! a click carrying one never reaches the browser. The [`ActionDispatcher`]
//! then runs each kind's protocol: resolve (waiting for attachment), wait
//! until actionable, act, and wait for the kind's post-condition. Actions are
//! performed once; only the surrounding waits poll.

use crate::config::HarnessConfig;
use crate::driver::{ElementHandle, PageDriver, ReadyState};
use crate::locator::{LocatorSpec, Role};
use crate::resolver::LocatorResolver;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

/// Closed set of UI actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Clear a text field and type a value
    Fill,
    /// Click a button
    ClickButton,
    /// Click a link
    ClickLink,
    /// Click the Nth link inside the row containing some text
    ClickLinkIndexForRow,
    /// Tick a checkbox
    Check,
    /// Choose a radio option
    SelectRadio,
}

impl ActionKind {
    /// All kinds
    pub const ALL: [Self; 6] = [
        Self::Fill,
        Self::ClickButton,
        Self::ClickLink,
        Self::ClickLinkIndexForRow,
        Self::Check,
        Self::SelectRadio,
    ];

    /// Upper-case kind name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "FILL",
            Self::ClickButton => "CLICK_BUTTON",
            Self::ClickLink => "CLICK_LINK",
            Self::ClickLinkIndexForRow => "CLICK_LINK_INDEX_FOR_ROW",
            Self::Check => "CHECK",
            Self::SelectRadio => "SELECT_RADIO",
        }
    }

    /// Whether the kind carries a value
    #[must_use]
    pub const fn requires_value(self) -> bool {
        matches!(self, Self::Fill)
    }

    /// Whether the kind carries a row index
    #[must_use]
    pub const fn requires_index(self) -> bool {
        matches!(self, Self::ClickLinkIndexForRow)
    }

    /// Role used when the locator does not name one
    #[must_use]
    pub const fn default_role(self) -> Role {
        match self {
            Self::Fill => Role::Textbox,
            Self::ClickButton => Role::Button,
            Self::ClickLink | Self::ClickLinkIndexForRow => Role::Link,
            Self::Check => Role::Checkbox,
            Self::SelectRadio => Role::Radio,
        }
    }

    /// Settle condition used when the request does not set one
    #[must_use]
    pub const fn default_settle(self) -> SettleCondition {
        match self {
            Self::ClickButton | Self::ClickLink | Self::ClickLinkIndexForRow => {
                SettleCondition::LoadComplete
            }
            Self::Fill | Self::Check | Self::SelectRadio => SettleCondition::Immediate,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ProbeError::invalid_request(format!("unknown action {s:?}")))
    }
}

/// What a click waits for before it counts as done
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SettleCondition {
    /// The document reports `complete`
    #[default]
    LoadComplete,
    /// A dependent element is attached, visible and enabled
    ElementReady(LocatorSpec),
    /// Nothing beyond the kind's own post-condition
    Immediate,
}

/// A validated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    locator: LocatorSpec,
    kind: ActionKind,
    value: Option<String>,
    settle: SettleCondition,
}

impl ActionRequest {
    /// Build a request from the page-object calling convention.
    ///
    /// `value` must be present exactly when the kind needs one (FILL) and
    /// `index` exactly for `CLICK_LINK_INDEX_FOR_ROW`. For a row-index click
    /// without an explicit row filter, the locator's name is the row text.
    pub fn new(
        locator: impl Into<LocatorSpec>,
        kind: ActionKind,
        value: Option<&str>,
        index: Option<usize>,
    ) -> ProbeResult<Self> {
        let locator = locator.into();
        match (kind.requires_value(), value) {
            (true, None) => {
                return Err(ProbeError::invalid_request(format!(
                    "{kind} on {locator} requires a value"
                )))
            }
            (false, Some(_)) => {
                return Err(ProbeError::invalid_request(format!(
                    "{kind} on {locator} does not take a value"
                )))
            }
            _ => {}
        }
        let index = match (kind.requires_index(), index) {
            (true, None) => {
                return Err(ProbeError::invalid_request(format!(
                    "{kind} on {locator} requires an index"
                )))
            }
            (false, Some(_)) => {
                return Err(ProbeError::invalid_request(format!(
                    "{kind} on {locator} does not take an index"
                )))
            }
            (_, index) => index,
        };
        if kind.requires_index() && locator.row.is_none() && locator.name.is_none() {
            return Err(ProbeError::invalid_request(format!(
                "{kind} needs row text to find the row"
            )));
        }
        Ok(Self::assemble(locator, kind, value.map(str::to_string), index))
    }

    fn assemble(
        locator: LocatorSpec,
        kind: ActionKind,
        value: Option<String>,
        index: Option<usize>,
    ) -> Self {
        let mut locator = locator.or_role(kind.default_role());
        if kind.requires_index() {
            if locator.row.is_none() {
                locator.row = locator.name.take();
            }
            locator.index = index;
        }
        Self {
            locator,
            kind,
            value,
            settle: kind.default_settle(),
        }
    }

    /// Fill a text field
    #[must_use]
    pub fn fill(locator: impl Into<LocatorSpec>, value: impl Into<String>) -> Self {
        Self::assemble(locator.into(), ActionKind::Fill, Some(value.into()), None)
    }

    /// Click a button
    #[must_use]
    pub fn click_button(locator: impl Into<LocatorSpec>) -> Self {
        Self::assemble(locator.into(), ActionKind::ClickButton, None, None)
    }

    /// Click a link
    #[must_use]
    pub fn click_link(locator: impl Into<LocatorSpec>) -> Self {
        Self::assemble(locator.into(), ActionKind::ClickLink, None, None)
    }

    /// Click the `index`th link in the row containing `row_text`
    #[must_use]
    pub fn click_link_in_row(row_text: impl Into<String>, index: usize) -> Self {
        Self::assemble(
            LocatorSpec::default().in_row(row_text),
            ActionKind::ClickLinkIndexForRow,
            None,
            Some(index),
        )
    }

    /// Tick a checkbox
    #[must_use]
    pub fn check(locator: impl Into<LocatorSpec>) -> Self {
        Self::assemble(locator.into(), ActionKind::Check, None, None)
    }

    /// Choose a radio option
    #[must_use]
    pub fn select_radio(locator: impl Into<LocatorSpec>) -> Self {
        Self::assemble(locator.into(), ActionKind::SelectRadio, None, None)
    }

    /// Override the settle condition
    #[must_use]
    pub fn with_settle(mut self, settle: SettleCondition) -> Self {
        self.settle = settle;
        self
    }

    /// Effective locator (role defaulted, row routing applied)
    #[must_use]
    pub const fn locator(&self) -> &LocatorSpec {
        &self.locator
    }

    /// Action kind
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Value to type, for FILL
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Settle condition
    #[must_use]
    pub const fn settle(&self) -> &SettleCondition {
        &self.settle
    }
}

/// Executes [`ActionRequest`]s with bounded waits
#[derive(Debug)]
pub struct ActionDispatcher<'a, D: ?Sized> {
    driver: &'a D,
    config: &'a HarnessConfig,
}

impl<'a, D: PageDriver + ?Sized> ActionDispatcher<'a, D> {
    /// Create a dispatcher
    #[must_use]
    pub const fn new(driver: &'a D, config: &'a HarnessConfig) -> Self {
        Self { driver, config }
    }

    /// Perform one action
    pub async fn perform(&self, request: &ActionRequest) -> ProbeResult<()> {
        let deadline = Instant::now() + self.config.timeout();
        debug!(action = %request.kind, locator = %request.locator, "perform");

        let handle = self.resolve_attached(&request.locator, deadline).await?;
        let driver = self.driver;
        let target = &handle;

        self.wait(request, deadline, "actionable", move || async move {
            Ok::<_, ProbeError>(driver.state(target).await?.is_actionable())
        })
        .await?;

        match request.kind {
            ActionKind::Fill => {
                let value = request.value.as_deref().unwrap_or_default();
                self.driver.clear(&handle).await?;
                if !value.is_empty() {
                    self.driver.type_text(&handle, value).await?;
                }
                self.wait(request, deadline, "value acknowledged", move || async move {
                    Ok::<_, ProbeError>(driver.state(target).await?.value.as_deref() == Some(value))
                })
                .await?;
            }
            ActionKind::ClickButton | ActionKind::ClickLink | ActionKind::ClickLinkIndexForRow => {
                self.driver.click(&handle).await?;
            }
            ActionKind::Check | ActionKind::SelectRadio => {
                if !self.driver.state(&handle).await?.checked {
                    self.driver.click(&handle).await?;
                }
                self.wait(request, deadline, "checked", move || async move {
                    Ok::<_, ProbeError>(driver.state(target).await?.checked)
                })
                .await?;
            }
        }

        self.settle(request, deadline).await
    }

    async fn settle(&self, request: &ActionRequest, deadline: Instant) -> ProbeResult<()> {
        let driver = self.driver;
        match request.settle {
            SettleCondition::Immediate => Ok(()),
            SettleCondition::LoadComplete => {
                self.wait(request, deadline, "page load complete", move || async move {
                    Ok::<_, ProbeError>(driver.ready_state().await? == ReadyState::Complete)
                })
                .await
            }
            SettleCondition::ElementReady(ref dependent) => {
                let condition = format!("{dependent} ready");
                self.wait(request, deadline, &condition, move || async move {
                    let handle = LocatorResolver::new(driver).resolve(dependent).await?;
                    Ok::<_, ProbeError>(driver.state(&handle).await?.is_actionable())
                })
                .await
            }
        }
    }

    /// Resolve, retrying until the element attaches or the deadline passes
    async fn resolve_attached(
        &self,
        locator: &LocatorSpec,
        deadline: Instant,
    ) -> ProbeResult<ElementHandle> {
        let resolver = LocatorResolver::new(self.driver);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let last = match tokio::time::timeout(remaining, resolver.resolve(locator)).await {
                Ok(Ok(handle)) => return Ok(handle),
                Ok(Err(err @ ProbeError::ElementNotFound { .. })) => err,
                Ok(Err(err)) => return Err(err),
                Err(_) => ProbeError::ElementNotFound {
                    locator: locator.to_string(),
                },
            };
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(last);
            }
            tokio::time::sleep(self.config.poll_interval().min(remaining)).await;
        }
    }

    /// Poll `probe` until it reports true; `ActionTimeout` at the deadline.
    ///
    /// Missing elements and driver errors count as "not yet".
    async fn wait<F, Fut>(
        &self,
        request: &ActionRequest,
        deadline: Instant,
        condition: &str,
        mut probe: F,
    ) -> ProbeResult<()>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = ProbeResult<bool>> + Send,
    {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, probe()).await {
                Ok(Ok(true)) => return Ok(()),
                Ok(Ok(false) | Err(ProbeError::ElementNotFound { .. } | ProbeError::Driver { .. })) => {}
                Ok(Err(err)) => return Err(err),
                Err(_) => break,
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(self.config.poll_interval().min(remaining)).await;
        }
        debug!(action = %request.kind, locator = %request.locator, condition, "action timed out");
        Err(ProbeError::ActionTimeout {
            action: request.kind.to_string(),
            locator: request.locator.to_string(),
            condition: condition.to_string(),
            timeout_ms: self.config.timeout_ms,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockEffect, MockElement};
    use std::time::Duration;

    fn fast_config() -> HarnessConfig {
        HarnessConfig::default()
            .with_timeout_ms(250)
            .with_poll_interval_ms(10)
    }

    mod request_tests {
        use super::*;

        #[test]
        fn test_fill_without_value_is_rejected() {
            let err = ActionRequest::new("First name", ActionKind::Fill, None, None).unwrap_err();
            assert!(matches!(err, ProbeError::InvalidRequest { .. }));
            assert!(err.to_string().contains("requires a value"));
        }

        #[test]
        fn test_fill_with_empty_value_is_allowed() {
            let req = ActionRequest::new("Address line 2", ActionKind::Fill, Some(""), None).unwrap();
            assert_eq!(req.value(), Some(""));
        }

        #[test]
        fn test_click_with_value_is_rejected() {
            assert!(ActionRequest::new("Continue", ActionKind::ClickButton, Some("x"), None).is_err());
        }

        #[test]
        fn test_index_only_for_row_clicks() {
            assert!(ActionRequest::new("Vaccines", ActionKind::ClickLink, None, Some(0)).is_err());
            assert!(
                ActionRequest::new("GardasilBatch1", ActionKind::ClickLinkIndexForRow, None, None)
                    .is_err()
            );
        }

        #[test]
        fn test_role_defaults_per_kind() {
            let req = ActionRequest::new("Continue", ActionKind::ClickButton, None, None).unwrap();
            assert_eq!(req.locator().role, Some(Role::Button));
            assert_eq!(req.settle(), &SettleCondition::LoadComplete);
            let req = ActionRequest::fill("First name", "Jo");
            assert_eq!(req.locator().role, Some(Role::Textbox));
            assert_eq!(req.settle(), &SettleCondition::Immediate);
        }

        #[test]
        fn test_row_click_routes_name_to_row() {
            let req = ActionRequest::new(
                "GardasilBatch1",
                ActionKind::ClickLinkIndexForRow,
                None,
                Some(1),
            )
            .unwrap();
            let locator = req.locator();
            assert_eq!(locator.row.as_deref(), Some("GardasilBatch1"));
            assert!(locator.name.is_none());
            assert_eq!(locator.index, Some(1));
            assert_eq!(locator.role, Some(Role::Link));
        }

        #[test]
        fn test_row_click_keeps_explicit_row_and_name() {
            let req = ActionRequest::new(
                LocatorSpec::named("Batch").in_row("GardasilBatch1"),
                ActionKind::ClickLinkIndexForRow,
                None,
                Some(1),
            )
            .unwrap();
            assert_eq!(req.locator().name.as_deref(), Some("Batch"));
            assert_eq!(req.locator().row.as_deref(), Some("GardasilBatch1"));
        }

        #[test]
        fn test_kind_parse() {
            assert_eq!(
                "click-link-index-for-row".parse::<ActionKind>().unwrap(),
                ActionKind::ClickLinkIndexForRow
            );
            assert!("hover".parse::<ActionKind>().is_err());
        }
    }

    mod dispatch_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_clears_then_types() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("first", Role::Textbox).named("First name").value("Old"));
            let config = fast_config();
            ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::fill("First name", "Jo"))
                .await
                .unwrap();
            assert_eq!(driver.value_of("first").as_deref(), Some("Jo"));
            assert_eq!(driver.history(), ["clear:first", "type:first:Jo"]);
        }

        #[tokio::test]
        async fn test_fill_unacknowledged_times_out() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("dob", Role::Textbox).named("Day").ignores_input());
            let config = fast_config();
            let err = ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::fill("Day", "14"))
                .await
                .unwrap_err();
            match err {
                ProbeError::ActionTimeout { condition, .. } => {
                    assert_eq!(condition, "value acknowledged");
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn test_never_enabled_button_times_out() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("go", Role::Button).named("Continue").disabled());
            let config = fast_config();
            let err = ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::click_button("Continue"))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::ActionTimeout { ref condition, .. } if condition == "actionable"));
            assert!(!driver.was_called("click:"));
        }

        #[tokio::test]
        async fn test_waits_for_enable_then_clicks() {
            let driver = MockDriver::new();
            driver.add(
                MockElement::new("go", Role::Button)
                    .named("Continue")
                    .enable_after(Duration::from_millis(50)),
            );
            let config = fast_config();
            ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::click_button("Continue"))
                .await
                .unwrap();
            assert!(driver.was_called("click:go"));
        }

        #[tokio::test]
        async fn test_waits_for_late_attachment() {
            let driver = MockDriver::new();
            driver.add(
                MockElement::new("link", Role::Link)
                    .named("Add a new batch")
                    .attach_after(Duration::from_millis(40)),
            );
            let config = fast_config();
            assert!(ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::click_link("Add a new batch"))
                .await
                .is_ok());
        }

        #[tokio::test]
        async fn test_missing_element_is_not_found() {
            let driver = MockDriver::new();
            let config = fast_config();
            let err = ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::click_link("Nowhere"))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { .. }));
        }

        #[tokio::test]
        async fn test_click_waits_for_navigation() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("save", Role::Button).named("Save changes"));
            driver.on_click(
                "save",
                MockEffect::Navigate {
                    url: "/vaccines".into(),
                    load_for: Duration::from_millis(60),
                },
            );
            let config = fast_config();
            let start = Instant::now();
            ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::click_button("Save changes"))
                .await
                .unwrap();
            assert!(start.elapsed() >= Duration::from_millis(50));
        }

        #[tokio::test]
        async fn test_stuck_navigation_times_out() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("save", Role::Button).named("Save"));
            driver.on_click(
                "save",
                MockEffect::Navigate {
                    url: "/slow".into(),
                    load_for: Duration::from_secs(60),
                },
            );
            let config = fast_config();
            let err = ActionDispatcher::new(&driver, &config)
                .perform(&ActionRequest::click_button("Save"))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("page load complete"));
        }

        #[tokio::test]
        async fn test_settle_on_dependent_element() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("add", Role::Button).named("Add batch"));
            driver.add(MockElement::new("flash", Role::Heading).named("Success").hidden());
            driver.on_click(
                "add",
                MockEffect::Show {
                    element: "flash".into(),
                },
            );
            let config = fast_config();
            let request = ActionRequest::click_button("Add batch").with_settle(
                SettleCondition::ElementReady(LocatorSpec::role(Role::Heading).named_as("Success")),
            );
            assert!(ActionDispatcher::new(&driver, &config)
                .perform(&request)
                .await
                .is_ok());
        }

        #[tokio::test]
        async fn test_row_index_click_hits_archive_link() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("r1", Role::Row).text("GardasilBatch1 Change Archive"));
            driver.add(MockElement::new("c1", Role::Link).named("Change").child_of("r1"));
            driver.add(MockElement::new("a1", Role::Link).named("Archive").child_of("r1"));
            let config = fast_config();
            let request = ActionRequest::new(
                "GardasilBatch1",
                ActionKind::ClickLinkIndexForRow,
                None,
                Some(1),
            )
            .unwrap();
            ActionDispatcher::new(&driver, &config)
                .perform(&request)
                .await
                .unwrap();
            assert_eq!(driver.history(), ["click:a1"]);
        }

        #[tokio::test]
        async fn test_check_and_radio() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("yes", Role::Radio).named("Yes, I agree"));
            driver.add(MockElement::new("text", Role::Checkbox).named("Text message"));
            let config = fast_config();
            let dispatcher = ActionDispatcher::new(&driver, &config);
            dispatcher
                .perform(&ActionRequest::select_radio("Yes, I agree"))
                .await
                .unwrap();
            dispatcher
                .perform(&ActionRequest::check("Text message"))
                .await
                .unwrap();
            // already checked: no second click
            dispatcher
                .perform(&ActionRequest::check("Text message"))
                .await
                .unwrap();
            assert_eq!(driver.history(), ["click:yes", "click:text"]);
        }
    }
}
