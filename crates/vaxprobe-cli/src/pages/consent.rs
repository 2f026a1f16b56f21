//! Parental consent form.
//!
//! One method per wizard step. Each step fills what it is given and presses
//! "Continue"; blank optional answers are skipped, not typed.

use tracing::debug;
use vaxprobe::prelude::*;

/// The public parental consent wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentPage {
    start_path: String,
}

impl Default for ConsentPage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_START_PATH)
    }
}

impl PageObject for ConsentPage {
    fn url_pattern(&self) -> &str {
        "/consents/*"
    }

    fn path(&self) -> &str {
        &self.start_path
    }

    fn ready_marker(&self) -> Option<LocatorSpec> {
        Some(LocatorSpec::role(Role::Button).named_as(Self::BTN_START))
    }

    fn page_name(&self) -> &str {
        "ConsentPage"
    }
}

#[allow(clippy::unused_self)]
impl ConsentPage {
    /// Start page used when none is configured
    pub const DEFAULT_START_PATH: &'static str = "/consents/start";

    const BTN_START: &'static str = "Start now";
    const BTN_CONTINUE: &'static str = "Continue";
    const BTN_CONFIRM: &'static str = "Confirm";
    const TXT_FIRST_NAME: &'static str = "First name";
    const TXT_LAST_NAME: &'static str = "Last name";
    const TXT_PREFERRED_FIRST_NAME: &'static str = "Preferred first name";
    const TXT_PREFERRED_LAST_NAME: &'static str = "Preferred last name";
    const TXT_DAY: &'static str = "Day";
    const TXT_MONTH: &'static str = "Month";
    const TXT_YEAR: &'static str = "Year";
    const TXT_SCHOOL: &'static str = "Select a school";
    const TXT_FULL_NAME: &'static str = "Full name";
    const TXT_EMAIL: &'static str = "Email address";
    const TXT_PHONE: &'static str = "Phone number";
    const CHK_TEXT_UPDATES: &'static str = "Tell me if my child’s vaccination is updated";
    const RDO_CONSENT_YES: &'static str = "Yes, I agree";
    const RDO_YES: &'static str = "Yes";
    const RDO_NO: &'static str = "No";
    const TXT_ADDRESS_LINE_1: &'static str = "Address line 1";
    const TXT_ADDRESS_LINE_2: &'static str = "Address line 2 (optional)";
    const TXT_CITY: &'static str = "Town or city";
    const TXT_POSTCODE: &'static str = "Postcode";
    const TXT_GIVE_DETAILS: &'static str = "Give details";

    /// Consent wizard starting at `start_path`
    #[must_use]
    pub fn new(start_path: impl Into<String>) -> Self {
        Self {
            start_path: start_path.into(),
        }
    }

    /// Open the start page and begin
    pub async fn start<D: PageDriver>(&self, session: &Session<D>) -> ProbeResult<()> {
        session.open(self).await?;
        click_button(session, Self::BTN_START).await
    }

    /// Child's legal name and, if given, preferred name
    pub async fn fill_child_name_details<D: PageDriver>(
        &self,
        session: &Session<D>,
        first_name: &str,
        last_name: &str,
        known_as_first: &str,
        known_as_last: &str,
    ) -> ProbeResult<()> {
        let exact = |label: &str| LocatorSpec::named(label).exact();
        session
            .act(exact(Self::TXT_FIRST_NAME), ActionKind::Fill, Some(first_name), None)
            .await?;
        session
            .act(exact(Self::TXT_LAST_NAME), ActionKind::Fill, Some(last_name), None)
            .await?;
        if known_as_first.is_empty() && known_as_last.is_empty() {
            select_radio(session, Self::RDO_NO).await?;
        } else {
            select_radio(session, Self::RDO_YES).await?;
            fill_if_present(session, Self::TXT_PREFERRED_FIRST_NAME, known_as_first).await?;
            fill_if_present(session, Self::TXT_PREFERRED_LAST_NAME, known_as_last).await?;
        }
        continue_on(session).await
    }

    /// Child's date of birth
    pub async fn fill_child_dob<D: PageDriver>(
        &self,
        session: &Session<D>,
        day: &str,
        month: &str,
        year: &str,
    ) -> ProbeResult<()> {
        fill_if_present(session, Self::TXT_DAY, day).await?;
        fill_if_present(session, Self::TXT_MONTH, month).await?;
        fill_if_present(session, Self::TXT_YEAR, year).await?;
        continue_on(session).await
    }

    /// Child's school
    pub async fn select_child_school<D: PageDriver>(
        &self,
        session: &Session<D>,
        school_name: &str,
    ) -> ProbeResult<()> {
        if !school_name.is_empty() {
            let picker = LocatorSpec::role(Role::Combobox).named_as(Self::TXT_SCHOOL);
            session
                .act(picker, ActionKind::Fill, Some(school_name), None)
                .await?;
        }
        continue_on(session).await
    }

    /// Parent or guardian details
    pub async fn fill_parent_details<D: PageDriver>(
        &self,
        session: &Session<D>,
        parent_name: &str,
        relation: &str,
        email: &str,
        phone: &str,
    ) -> ProbeResult<()> {
        fill_if_present(session, Self::TXT_FULL_NAME, parent_name).await?;
        if !relation.is_empty() {
            select_radio(session, relation).await?;
        }
        fill_if_present(session, Self::TXT_EMAIL, email).await?;
        fill_if_present(session, Self::TXT_PHONE, phone).await?;
        continue_on(session).await
    }

    /// Opt in to text updates (only shown when a phone number was given)
    pub async fn check_phone_options<D: PageDriver>(&self, session: &Session<D>) -> ProbeResult<()> {
        session
            .act(Self::CHK_TEXT_UPDATES, ActionKind::Check, None, None)
            .await?;
        continue_on(session).await
    }

    /// Give or refuse consent
    pub async fn select_consent<D: PageDriver>(
        &self,
        session: &Session<D>,
        consented: bool,
    ) -> ProbeResult<()> {
        let choice = if consented {
            Self::RDO_CONSENT_YES
        } else {
            Self::RDO_NO
        };
        select_radio(session, choice).await?;
        continue_on(session).await
    }

    /// Home address
    pub async fn fill_address_details<D: PageDriver>(
        &self,
        session: &Session<D>,
        line1: &str,
        line2: &str,
        city: &str,
        postcode: &str,
    ) -> ProbeResult<()> {
        fill_if_present(session, Self::TXT_ADDRESS_LINE_1, line1).await?;
        fill_if_present(session, Self::TXT_ADDRESS_LINE_2, line2).await?;
        fill_if_present(session, Self::TXT_CITY, city).await?;
        fill_if_present(session, Self::TXT_POSTCODE, postcode).await?;
        continue_on(session).await
    }

    /// Answer one yes/no health question; blank details answer "No"
    pub async fn answer_health_question<D: PageDriver>(
        &self,
        session: &Session<D>,
        details: &str,
    ) -> ProbeResult<()> {
        if details.is_empty() {
            select_radio(session, Self::RDO_NO).await?;
        } else {
            select_radio(session, Self::RDO_YES).await?;
            session
                .act(Self::TXT_GIVE_DETAILS, ActionKind::Fill, Some(details), None)
                .await?;
        }
        continue_on(session).await
    }

    /// Why consent was refused, with optional notes
    pub async fn select_consent_not_given_reason<D: PageDriver>(
        &self,
        session: &Session<D>,
        reason: &str,
        notes: &str,
    ) -> ProbeResult<()> {
        if !reason.is_empty() {
            select_radio(session, reason).await?;
        }
        continue_on(session).await?;
        if !notes.is_empty() {
            session
                .act(Self::TXT_GIVE_DETAILS, ActionKind::Fill, Some(notes), None)
                .await?;
            continue_on(session).await?;
        }
        Ok(())
    }

    /// Submit the answers
    pub async fn click_confirm_details<D: PageDriver>(
        &self,
        session: &Session<D>,
        scenario_id: &str,
    ) -> ProbeResult<()> {
        debug!(scenario = scenario_id, "confirming consent answers");
        click_button(session, Self::BTN_CONFIRM).await
    }

    /// The confirmation page shows exactly `expected`
    pub async fn verify_final_message<D: PageDriver>(
        &self,
        session: &Session<D>,
        expected: &str,
    ) -> ProbeResult<()> {
        session
            .verify(Role::Main, PropertyKind::Text, expected, Some(true))
            .await?;
        Ok(())
    }
}

async fn select_radio<D: PageDriver>(session: &Session<D>, label: &str) -> ProbeResult<()> {
    session
        .act(LocatorSpec::named(label).exact(), ActionKind::SelectRadio, None, None)
        .await
}

async fn click_button<D: PageDriver>(session: &Session<D>, label: &str) -> ProbeResult<()> {
    session.act(label, ActionKind::ClickButton, None, None).await
}

async fn continue_on<D: PageDriver>(session: &Session<D>) -> ProbeResult<()> {
    click_button(session, ConsentPage::BTN_CONTINUE).await
}

async fn fill_if_present<D: PageDriver>(
    session: &Session<D>,
    label: &str,
    value: &str,
) -> ProbeResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    session.act(label, ActionKind::Fill, Some(value), None).await
}
