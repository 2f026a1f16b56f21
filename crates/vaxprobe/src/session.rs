//! Browser session facade.
//!
//! A [`Session`] owns one driver and one [`HarnessConfig`]. Page objects talk
//! to the browser only through [`Session::act`] and [`Session::verify`]; each
//! call is awaited to completion, so a session never has two requests in
//! flight.

use crate::action::{ActionDispatcher, ActionKind, ActionRequest};
use crate::config::HarnessConfig;
use crate::driver::{ElementHandle, PageDriver};
use crate::locator::LocatorSpec;
use crate::page_object::{PageObject, UrlMatcher};
use crate::resolver::LocatorResolver;
use crate::result::{ProbeError, ProbeResult};
use crate::verify::{PropertyKind, PropertyVerifier, VerificationOutcome, VerificationRequest};
use tracing::debug;

/// One exclusive browser session
#[derive(Debug)]
pub struct Session<D> {
    driver: D,
    config: HarnessConfig,
}

impl<D: PageDriver> Session<D> {
    /// Create a session
    #[must_use]
    pub const fn new(driver: D, config: HarnessConfig) -> Self {
        Self { driver, config }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Consume the session, returning the driver
    #[must_use]
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Navigate to a path relative to the base URL (or an absolute URL)
    pub async fn goto(&self, path: &str) -> ProbeResult<()> {
        let url = self.config.url_for(path);
        debug!(%url, "goto");
        self.driver.navigate(&url).await
    }

    /// Current page URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Perform an action using the page-object calling convention
    pub async fn act(
        &self,
        locator: impl Into<LocatorSpec> + Send,
        action: ActionKind,
        value: Option<&str>,
        index: Option<usize>,
    ) -> ProbeResult<()> {
        let request = ActionRequest::new(locator, action, value, index)?;
        self.perform(&request).await
    }

    /// Perform a prepared action
    pub async fn perform(&self, request: &ActionRequest) -> ProbeResult<()> {
        ActionDispatcher::new(&self.driver, &self.config)
            .perform(request)
            .await
    }

    /// Verify a property using the page-object calling convention.
    ///
    /// `exact: None` uses the session's default match mode. `expected` is
    /// ignored for [`PropertyKind::Visibility`].
    pub async fn verify(
        &self,
        locator: impl Into<LocatorSpec> + Send,
        property: PropertyKind,
        expected: &str,
        exact: Option<bool>,
    ) -> ProbeResult<VerificationOutcome> {
        let request = VerificationRequest::new(locator, property, Some(expected), exact)?;
        self.check(&request).await
    }

    /// Run a prepared verification
    pub async fn check(&self, request: &VerificationRequest) -> ProbeResult<VerificationOutcome> {
        PropertyVerifier::new(&self.driver, &self.config)
            .verify(request)
            .await
    }

    /// Resolve a locator once, without waiting
    pub async fn resolve(&self, locator: &LocatorSpec) -> ProbeResult<ElementHandle> {
        LocatorResolver::new(&self.driver).resolve(locator).await
    }

    /// Navigate to a page object's path and wait for its ready marker
    pub async fn open<P: PageObject + ?Sized>(&self, page: &P) -> ProbeResult<()> {
        self.goto(page.path()).await?;
        self.wait_loaded(page).await
    }

    /// Wait for a page object's ready marker, if it has one
    pub async fn wait_loaded<P: PageObject + ?Sized>(&self, page: &P) -> ProbeResult<()> {
        if let Some(marker) = page.ready_marker() {
            debug!(page = page.page_name(), marker = %marker, "waiting for page");
            self.check(&VerificationRequest::visible(marker)).await?;
        }
        Ok(())
    }

    /// Whether the current URL matches a page object's URL pattern
    pub async fn is_on<P: PageObject + ?Sized>(&self, page: &P) -> ProbeResult<bool> {
        let url = self.driver.current_url().await?;
        Ok(UrlMatcher::new(page.url_pattern()).matches(&url))
    }

    /// Fail unless the current URL matches a page object's URL pattern
    pub async fn expect_on<P: PageObject + ?Sized>(&self, page: &P) -> ProbeResult<()> {
        if self.is_on(page).await? {
            return Ok(());
        }
        Err(ProbeError::Navigation {
            url: self.driver.current_url().await?,
            message: format!(
                "expected {} ({})",
                page.page_name(),
                page.url_pattern()
            ),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::locator::Role;

    fn session() -> Session<MockDriver> {
        let config = HarnessConfig::default()
            .with_base_url("https://mavis.test")
            .with_timeout_ms(200)
            .with_poll_interval_ms(10);
        Session::new(MockDriver::new(), config)
    }

    struct ChildrenList;

    impl PageObject for ChildrenList {
        fn url_pattern(&self) -> &str {
            "/children"
        }

        fn ready_marker(&self) -> Option<LocatorSpec> {
            Some(LocatorSpec::role(Role::Heading).named_as("Children"))
        }
    }

    #[tokio::test]
    async fn test_act_rejects_fill_without_value_before_driving() {
        let session = session();
        let err = session
            .act("First name", ActionKind::Fill, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidRequest { .. }));
        assert!(session.driver().history().is_empty());
    }

    #[tokio::test]
    async fn test_act_and_verify() {
        let session = session();
        session
            .driver()
            .add(MockElement::new("search", Role::Textbox).named("Search"));
        session
            .act("Search", ActionKind::Fill, Some("Doe"), None)
            .await
            .unwrap();
        let outcome = session
            .verify(
                LocatorSpec::role(Role::Textbox).named_as("Search"),
                PropertyKind::Value,
                "Doe",
                Some(true),
            )
            .await
            .unwrap();
        assert_eq!(outcome.observed, "Doe");
    }

    #[tokio::test]
    async fn test_open_navigates_and_waits_for_marker() {
        let session = session();
        session
            .driver()
            .add(MockElement::new("h1", Role::Heading).named("Children"));
        session.open(&ChildrenList).await.unwrap();
        assert!(session
            .driver()
            .was_called("navigate:https://mavis.test/children"));
        assert!(session.is_on(&ChildrenList).await.unwrap());
    }

    #[tokio::test]
    async fn test_expect_on_wrong_page() {
        let session = session();
        session.goto("/vaccines").await.unwrap();
        let err = session.expect_on(&ChildrenList).await.unwrap_err();
        assert!(matches!(err, ProbeError::Navigation { .. }));
    }
}
