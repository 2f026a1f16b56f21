//! Business workflows driven once per scenario record.

use crate::families::consent_columns as col;
use crate::pages::ConsentPage;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};
use vaxprobe::helpers::{clean_text, date_of_birth_for_year_group};
use vaxprobe::prelude::*;

/// School year offered the HPV vaccine
const HPV_YEAR_GROUP: i32 = 8;

/// Walks the consent wizard for one `parental_consent_hpv` record.
///
/// A phone number adds the phone options step. Consent adds the address and
/// the four health questions; refusal asks for a reason instead. A record
/// with no date of birth gets one from the HPV year group.
#[derive(Debug, Clone, Default)]
pub struct ParentalConsentWorkflow {
    page: ConsentPage,
}

impl ParentalConsentWorkflow {
    /// Workflow over a consent wizard
    #[must_use]
    pub const fn new(page: ConsentPage) -> Self {
        Self { page }
    }
}

#[async_trait]
impl<D: PageDriver> Workflow<D> for ParentalConsentWorkflow {
    fn name(&self) -> &str {
        "parental-consent"
    }

    async fn execute(&self, session: &Session<D>, record: &ScenarioRecord) -> ProbeResult<()> {
        let page = &self.page;
        let field = |column: &str| record.text_or_empty(column);
        let name = |column: &str| clean_text(field(column));

        page.start(session).await?;
        page.fill_child_name_details(
            session,
            &name(col::CHILD_FIRST_NAME),
            &name(col::CHILD_LAST_NAME),
            &name(col::CHILD_AKA_FIRST),
            &name(col::CHILD_AKA_LAST),
        )
        .await?;
        let [day, month, year] = dob_cells(record, Local::now().date_naive())?;
        page.fill_child_dob(session, &day, &month, &year).await?;
        page.select_child_school(session, field(col::SCHOOL_NAME))
            .await?;

        let phone = field(col::PHONE);
        page.fill_parent_details(
            session,
            field(col::PARENT_FULL_NAME),
            field(col::RELATION),
            field(col::EMAIL),
            phone,
        )
        .await?;
        if !phone.is_empty() {
            page.check_phone_options(session).await?;
        }

        let consented = record.flag(col::CONSENT_VACCINE).unwrap_or(false);
        page.select_consent(session, consented).await?;
        if consented {
            page.fill_address_details(
                session,
                field(col::ADDRESS_LINE_1),
                field(col::ADDRESS_LINE_2),
                field(col::CITY),
                field(col::POSTCODE),
            )
            .await?;
            for column in [
                col::ALLERGY_DETAILS,
                col::MEDICAL_CONDITION_DETAILS,
                col::REACTION_DETAILS,
                col::EXTRA_SUPPORT_DETAILS,
            ] {
                page.answer_health_question(session, field(column)).await?;
            }
        } else {
            page.select_consent_not_given_reason(
                session,
                field(col::CONSENT_NOT_GIVEN_REASON),
                field(col::CONSENT_NOT_GIVEN_DETAILS),
            )
            .await?;
        }

        page.click_confirm_details(session, record.scenario_id())
            .await?;
        page.verify_final_message(session, field(col::EXPECTED_FINAL_MESSAGE))
            .await
    }
}

/// Day, month and year cells of the child's birth date.
///
/// When all three are blank, picks a date in the HPV year group window of
/// `today`, keyed on the scenario id so reruns type the same date.
fn dob_cells(record: &ScenarioRecord, today: NaiveDate) -> ProbeResult<[String; 3]> {
    let cells = [col::CHILD_DOB_DAY, col::CHILD_DOB_MONTH, col::CHILD_DOB_YEAR]
        .map(|column| record.text_or_empty(column).to_string());
    if cells.iter().any(|cell| !cell.is_empty()) {
        return Ok(cells);
    }
    let pick = record.scenario_id().bytes().map(u64::from).sum();
    let dob = date_of_birth_for_year_group(today, HPV_YEAR_GROUP, pick)?;
    Ok([
        dob.day().to_string(),
        dob.month().to_string(),
        dob.year().to_string(),
    ])
}
