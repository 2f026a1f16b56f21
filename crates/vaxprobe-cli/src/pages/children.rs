//! Children list and child records.

use vaxprobe::prelude::*;
use vaxprobe::VerificationRequest;

/// The children list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildrenPage;

impl PageObject for ChildrenPage {
    fn url_pattern(&self) -> &str {
        "/children"
    }

    fn ready_marker(&self) -> Option<LocatorSpec> {
        Some(Self::heading())
    }

    fn page_name(&self) -> &str {
        "ChildrenPage"
    }
}

#[allow(clippy::unused_self)]
impl ChildrenPage {
    const LBL_CHILDREN: &'static str = "Children";
    const LBL_TABLE_HEADERS: &'static str = "Name and NHS number\tPostcode\tSchool\tDate of birth";
    const LBL_ONE_CHILD: &'static str = "1 child";
    const TXT_SEARCH: &'static str = "Search";
    const BTN_SEARCH: &'static str = "Search";
    const BTN_REMOVE_FROM_COHORT: &'static str = "Remove from cohort";
    const BTN_CONTINUE: &'static str = "Continue";
    const LNK_ACTIVITY_LOG: &'static str = "Activity log";
    const LNK_CHILD_RECORD: &'static str = "Child record";
    const LNK_CHILD_MAV_853: &'static str = "MAV_853, MAV_853";
    const LNK_CHILD_CHANGE_NHSNO: &'static str = "CHANGENHSNO, CHANGENHSNO";
    const LNK_EDIT_CHILD_RECORD: &'static str = "Edit child record";
    const LNK_CHANGE_NHS_NO: &'static str = "Change   NHS number";
    const LNK_HPV_PROGRAMME: &'static str = "Gardasil 9 (HPV)";
    const LBL_VACCINATED_WITH_HPV: &'static str = "Vaccinated with Gardasil 9";
    const LBL_OUTCOME_VACCINATED: &'static str = "Outcome\tVaccinated";
    const LBL_INVALID_NHS_NO: &'static str = "Enter a valid NHS number";
    const INVALID_NHS_NO: &'static str = "9123456789";

    fn heading() -> LocatorSpec {
        LocatorSpec::role(Role::Heading)
            .named_as(Self::LBL_CHILDREN)
            .within(Role::Main, None)
    }

    /// Heading and table columns
    pub async fn verify_headers<D: PageDriver>(&self, session: &Session<D>) -> ProbeResult<()> {
        session
            .verify(Self::heading(), PropertyKind::Text, Self::LBL_CHILDREN, Some(true))
            .await?;
        session
            .verify(Role::Main, PropertyKind::Text, Self::LBL_TABLE_HEADERS, None)
            .await?;
        Ok(())
    }

    /// Searching for one known child narrows the list to one record
    pub async fn verify_filter<D: PageDriver>(
        &self,
        session: &Session<D>,
        child_name: &str,
    ) -> ProbeResult<()> {
        self.search(session, child_name).await?;
        session
            .verify(Role::Main, PropertyKind::Text, Self::LBL_ONE_CHILD, None)
            .await?;
        Ok(())
    }

    /// Search and expect the child in the results
    pub async fn search_for_a_child<D: PageDriver>(
        &self,
        session: &Session<D>,
        child_name: &str,
    ) -> ProbeResult<()> {
        self.search(session, child_name).await?;
        session
            .verify(Role::Main, PropertyKind::Text, child_name, None)
            .await?;
        Ok(())
    }

    /// Find each child in turn
    pub async fn verify_children_uploaded<D: PageDriver>(
        &self,
        session: &Session<D>,
        children: &[String],
    ) -> ProbeResult<()> {
        for child in children {
            self.search_for_a_child(session, child).await?;
        }
        Ok(())
    }

    /// Open a child's record and remove them from the cohort
    pub async fn remove_child_from_cohort<D: PageDriver>(
        &self,
        session: &Session<D>,
        child_name: &str,
    ) -> ProbeResult<()> {
        self.search_for_a_child(session, child_name).await?;
        session
            .act(child_name, ActionKind::ClickLink, None, None)
            .await?;
        session
            .act(Self::BTN_REMOVE_FROM_COHORT, ActionKind::ClickButton, None, None)
            .await?;
        let removed = format!("{child_name} removed from cohort");
        session
            .verify(Role::Main, PropertyKind::Text, &removed, None)
            .await?;
        Ok(())
    }

    /// Open a tab of the child record and wait for it to become current.
    ///
    /// The current tab's link wraps its label in `<strong>`.
    pub async fn click_tab<D: PageDriver>(
        &self,
        session: &Session<D>,
        name: &str,
    ) -> ProbeResult<()> {
        let tab = LocatorSpec::role(Role::Link)
            .named_as(name)
            .exact()
            .within(Role::Navigation, None);
        session.act(tab, ActionKind::ClickLink, None, None).await?;
        let current = LocatorSpec::role(Role::Strong).within(Role::Link, Some(name));
        session.check(&VerificationRequest::visible(current)).await?;
        Ok(())
    }

    /// Switch to the activity log tab
    pub async fn click_activity_log<D: PageDriver>(&self, session: &Session<D>) -> ProbeResult<()> {
        self.click_tab(session, Self::LNK_ACTIVITY_LOG).await
    }

    /// A child created or matched from a consent response shows the
    /// consent, the session invitation and the manual match in its log
    pub async fn verify_activity_log_for_created_or_matched_child<D: PageDriver>(
        &self,
        session: &Session<D>,
        child_name: &str,
        location: &str,
    ) -> ProbeResult<()> {
        self.search(session, child_name).await?;
        session
            .act(child_name, ActionKind::ClickLink, None, None)
            .await?;
        self.click_activity_log(session).await?;
        let invited = format!("Invited to the session at {location}");
        for expected in [
            "Consent given",
            invited.as_str(),
            "Consent response manually matched with child record",
        ] {
            session
                .verify(Role::Main, PropertyKind::Text, expected, None)
                .await?;
        }
        Ok(())
    }

    /// A child imported without vaccine details still opens, and the
    /// programme outcome at `school` reads as vaccinated
    pub async fn verify_mav_853<D: PageDriver>(
        &self,
        session: &Session<D>,
        school: &str,
    ) -> ProbeResult<()> {
        self.search_for_a_child(session, Self::LNK_CHILD_MAV_853).await?;
        session
            .act(Self::LNK_CHILD_MAV_853, ActionKind::ClickLink, None, None)
            .await?;
        self.click_activity_log(session).await?;
        let vaccinated = LocatorSpec::role(Role::Heading)
            .named_as(Self::LBL_VACCINATED_WITH_HPV)
            .nth(0);
        session.check(&VerificationRequest::visible(vaccinated)).await?;

        session
            .act(Self::LNK_CHILD_RECORD, ActionKind::ClickLink, None, None)
            .await?;
        let programme = LocatorSpec::role(Role::Link)
            .named_as(Self::LNK_HPV_PROGRAMME)
            .in_row(school);
        session
            .act(programme, ActionKind::ClickLink, None, None)
            .await?;
        session
            .verify(Role::Main, PropertyKind::Text, Self::LBL_OUTCOME_VACCINATED, None)
            .await?;
        Ok(())
    }

    /// An invalid NHS number is rejected on the edit form
    pub async fn change_nhs_no<D: PageDriver>(&self, session: &Session<D>) -> ProbeResult<()> {
        self.search_for_a_child(session, Self::LNK_CHILD_CHANGE_NHSNO).await?;
        session
            .act(Self::LNK_CHILD_CHANGE_NHSNO, ActionKind::ClickLink, None, None)
            .await?;
        session
            .act(Self::LNK_EDIT_CHILD_RECORD, ActionKind::ClickLink, None, None)
            .await?;
        session
            .act(Self::LNK_CHANGE_NHS_NO, ActionKind::ClickLink, None, None)
            .await?;
        session
            .act(
                Self::LNK_CHILD_CHANGE_NHSNO,
                ActionKind::Fill,
                Some(Self::INVALID_NHS_NO),
                None,
            )
            .await?;
        session
            .act(Self::BTN_CONTINUE, ActionKind::ClickButton, None, None)
            .await?;
        session
            .verify(Role::Main, PropertyKind::Text, Self::LBL_INVALID_NHS_NO, None)
            .await?;
        Ok(())
    }

    async fn search<D: PageDriver>(
        &self,
        session: &Session<D>,
        child_name: &str,
    ) -> ProbeResult<()> {
        session
            .act(Self::TXT_SEARCH, ActionKind::Fill, Some(child_name), None)
            .await?;
        session
            .act(Self::BTN_SEARCH, ActionKind::ClickButton, None, None)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vaxprobe::{LocatorResolver, MockDriver, MockEffect, MockElement};

    const CHILD: &str = "CFILTER1, CFilter1";

    fn children_page() -> Session<MockDriver> {
        let driver = MockDriver::permissive();
        driver.add(MockElement::new("main", Role::Main).text(format!(
            "Children 1 child Name and NHS number\tPostcode\tSchool\tDate of birth\n{CHILD}"
        )));
        driver.add(
            MockElement::new("h1", Role::Heading)
                .named("Children")
                .text("Children")
                .child_of("main"),
        );
        let config = HarnessConfig::default()
            .with_base_url("https://mavis.test")
            .with_timeout_ms(300)
            .with_poll_interval_ms(10);
        Session::new(driver, config)
    }

    #[tokio::test]
    async fn test_open_and_verify_headers() {
        let session = children_page();
        session.open(&ChildrenPage).await.unwrap();
        ChildrenPage.verify_headers(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_headers_ignore_children_heading_outside_main() {
        let session = children_page();
        session.driver().add(MockElement::new("nav", Role::Navigation));
        session.driver().add(
            MockElement::new("nav-heading", Role::Heading)
                .named("Children")
                .text("Children")
                .child_of("nav"),
        );
        session.open(&ChildrenPage).await.unwrap();
        ChildrenPage.verify_headers(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_filter_fills_search_box_then_clicks_search() {
        let session = children_page();
        ChildrenPage.verify_filter(&session, CHILD).await.unwrap();
        let history = session.driver().history();
        let typed = history
            .iter()
            .position(|c| c == "type:auto:page/textbox:Search:CFILTER1, CFilter1")
            .unwrap();
        let clicked = history
            .iter()
            .position(|c| c == "click:auto:page/button:Search")
            .unwrap();
        assert!(typed < clicked);
    }

    #[tokio::test]
    async fn test_remove_from_cohort() {
        let session = children_page();
        session.driver().on_click(
            "auto:page/button:Remove from cohort",
            MockEffect::SetText {
                element: "main".into(),
                text: format!("{CHILD} removed from cohort"),
                after: Duration::from_millis(20),
            },
        );
        ChildrenPage
            .remove_child_from_cohort(&session, CHILD)
            .await
            .unwrap();
        assert!(session
            .driver()
            .was_called("click:auto:page/link:CFILTER1, CFilter1"));
    }

    /// Child record with a navigation bar of tabs; the current tab's label
    /// is wrapped in `<strong>` once it has been clicked
    fn child_record(tabs: &[&str]) -> Session<MockDriver> {
        let session = children_page();
        let driver = session.driver();
        driver.add(MockElement::new("tabs", Role::Navigation).named("Child record tabs"));
        for tab in tabs {
            let link = format!("tab:{tab}");
            let strong = format!("current:{tab}");
            driver.add(MockElement::new(&link, Role::Link).named(*tab).child_of("tabs"));
            driver.add(
                MockElement::new(&strong, Role::Strong)
                    .text(*tab)
                    .child_of(&link)
                    .hidden(),
            );
            driver.on_click(&link, MockEffect::Show { element: strong });
        }
        session
    }

    /// Searching lists `child` in the results
    fn search_finds(driver: &MockDriver, child: &str) {
        driver.on_click(
            "auto:page/button:Search",
            MockEffect::SetText {
                element: "main".into(),
                text: format!("1 child {child}"),
                after: Duration::ZERO,
            },
        );
    }

    mod flow_tests {
        use super::*;

        #[tokio::test]
        async fn test_click_tab_waits_for_current_marker() {
            let session = child_record(&["Child record", "Activity log"]);
            ChildrenPage.click_activity_log(&session).await.unwrap();
            let driver = session.driver();
            assert!(driver.was_called("click:tab:Activity log"));
            assert!(!driver.was_called("click:tab:Child record"));
        }

        #[tokio::test]
        async fn test_click_tab_outside_navigation_is_not_found() {
            let session = children_page();
            session.driver().add(
                MockElement::new("stray", Role::Link)
                    .named("Activity log")
                    .child_of("main"),
            );
            let err = ChildrenPage.click_activity_log(&session).await.unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { .. }));
            assert!(!session.driver().was_called("click:stray"));
        }

        #[tokio::test]
        async fn test_activity_log_for_matched_child() {
            let session = child_record(&["Activity log"]);
            session.driver().on_click(
                "tab:Activity log",
                MockEffect::SetText {
                    element: "main".into(),
                    text: "Consent given Invited to the session at Hill School \
                           Consent response manually matched with child record"
                        .into(),
                    after: Duration::from_millis(20),
                },
            );
            ChildrenPage
                .verify_activity_log_for_created_or_matched_child(&session, CHILD, "Hill School")
                .await
                .unwrap();
            let history = session.driver().history();
            let opened = history
                .iter()
                .position(|c| c == "click:auto:page/link:CFILTER1, CFilter1")
                .unwrap();
            let tab = history.iter().position(|c| c == "click:tab:Activity log").unwrap();
            assert!(opened < tab);
        }

        #[tokio::test]
        async fn test_activity_log_missing_invitation_fails() {
            let session = child_record(&["Activity log"]);
            session.driver().on_click(
                "tab:Activity log",
                MockEffect::SetText {
                    element: "main".into(),
                    text: "Consent given".into(),
                    after: Duration::ZERO,
                },
            );
            let err = ChildrenPage
                .verify_activity_log_for_created_or_matched_child(&session, CHILD, "Hill School")
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::VerificationTimeout { .. }));
        }

        #[tokio::test]
        async fn test_mav_853_opens_programme_in_school_row() {
            let session = child_record(&["Child record", "Activity log"]);
            let driver = session.driver();
            search_finds(driver, "MAV_853, MAV_853");
            driver.add(
                MockElement::new("vaccinated", Role::Heading)
                    .named("Vaccinated with Gardasil 9")
                    .child_of("main")
                    .hidden(),
            );
            driver.add(
                MockElement::new("vaccinated-again", Role::Heading)
                    .named("Vaccinated with Gardasil 9")
                    .child_of("main")
                    .hidden(),
            );
            driver.on_click(
                "tab:Activity log",
                MockEffect::Show {
                    element: "vaccinated".into(),
                },
            );
            driver.on_click(
                "tab:Child record",
                MockEffect::Hide {
                    element: "vaccinated".into(),
                },
            );
            for (row, school) in [("row-other", "Other School"), ("row-hill", "Hill School")] {
                driver.add(
                    MockElement::new(row, Role::Row)
                        .text(format!("{school} Gardasil 9 (HPV)"))
                        .child_of("main"),
                );
                driver.add(
                    MockElement::new(format!("{row}-hpv"), Role::Link)
                        .named("Gardasil 9 (HPV)")
                        .child_of(row),
                );
            }
            driver.on_click(
                "row-hill-hpv",
                MockEffect::SetText {
                    element: "main".into(),
                    text: "Outcome\tVaccinated".into(),
                    after: Duration::from_millis(20),
                },
            );

            ChildrenPage.verify_mav_853(&session, "Hill School").await.unwrap();

            assert!(driver.was_called("click:row-hill-hpv"));
            assert!(!driver.was_called("click:row-other-hpv"));
            let first = LocatorSpec::role(Role::Heading)
                .named_as("Vaccinated with Gardasil 9")
                .nth(0);
            let handle = LocatorResolver::new(driver).resolve(&first).await.unwrap();
            assert!(!driver.state(&handle).await.unwrap().visible);
        }

        #[tokio::test]
        async fn test_change_nhs_no_rejects_invalid_number() {
            let session = children_page();
            search_finds(session.driver(), "CHANGENHSNO, CHANGENHSNO");
            session.driver().on_click(
                "auto:page/button:Continue",
                MockEffect::SetText {
                    element: "main".into(),
                    text: "There is a problem Enter a valid NHS number".into(),
                    after: Duration::from_millis(20),
                },
            );
            ChildrenPage.change_nhs_no(&session).await.unwrap_or_else(|e| {
                panic!("{e}; history: {:?}", session.driver().history())
            });
            let history = session.driver().history();
            let steps: Vec<usize> = [
                "click:auto:page/link:CHANGENHSNO, CHANGENHSNO",
                "click:auto:page/link:Edit child record",
                "click:auto:page/link:Change   NHS number",
                "type:auto:page/textbox:CHANGENHSNO, CHANGENHSNO:9123456789",
                "click:auto:page/button:Continue",
            ]
            .iter()
            .map(|step| history.iter().position(|c| c == step).unwrap())
            .collect();
            assert!(steps.windows(2).all(|w| w[0] < w[1]), "{history:?}");
        }
    }
}
