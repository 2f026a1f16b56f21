//! Vaccines and batches.

use chrono::{Local, NaiveDate};
use vaxprobe::helpers::{compact_timestamp_now, offset_business_date};
use vaxprobe::prelude::*;

/// HPV vaccine as listed on the vaccines page
pub const HPV_VACCINE: &str = "Gardasil 9 (HPV)";

/// A batch created through the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Batch name, unique per run
    pub name: String,
    /// Expiry as `YYYYMMDD`
    pub expiry: String,
}

impl Batch {
    /// A batch of `vaccine` named from the vaccine and a timestamp, expiring in
    /// about a year
    pub fn for_vaccine(vaccine: &str, today: NaiveDate) -> ProbeResult<Self> {
        Ok(Self {
            name: format!("{}{}", vaccine.replace(' ', ""), compact_timestamp_now()),
            expiry: offset_business_date(today, 365)?,
        })
    }

    fn expiry_parts(&self) -> (&str, &str, &str) {
        let expiry = self.expiry.as_str();
        let part = move |range: std::ops::Range<usize>| expiry.get(range).unwrap_or_default();
        (part(6..8), part(4..6), part(0..4))
    }
}

/// The vaccines page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaccinesPage;

impl PageObject for VaccinesPage {
    fn url_pattern(&self) -> &str {
        "/vaccines"
    }

    fn ready_marker(&self) -> Option<LocatorSpec> {
        Some(LocatorSpec::role(Role::Heading).named_as("Vaccines"))
    }

    fn page_name(&self) -> &str {
        "VaccinesPage"
    }
}

#[allow(clippy::unused_self)]
impl VaccinesPage {
    const LBL_VACCINE_MANUFACTURER: &'static str = "Merck Sharp & Dohme";
    const LBL_BATCH_ARCHIVED: &'static str = "Batch archived.";
    const TXT_BATCH_NAME: &'static str = "Batch";
    const TXT_EXPIRY_DAY: &'static str = "Day";
    const TXT_EXPIRY_MONTH: &'static str = "Month";
    const TXT_EXPIRY_YEAR: &'static str = "Year";
    const BTN_ADD_BATCH: &'static str = "Add batch";
    const BTN_SAVE_CHANGES: &'static str = "Save changes";
    const BTN_CONFIRM_ARCHIVE: &'static str = "Yes, archive this batch";
    /// Row link positions: change first, archive second
    const LNK_CHANGE: usize = 0;
    const LNK_ARCHIVE: usize = 1;

    /// The HPV vaccine and its manufacturer are listed
    pub async fn verify_current_vaccine<D: PageDriver>(&self, session: &Session<D>) -> ProbeResult<()> {
        session
            .verify(Role::Main, PropertyKind::Text, HPV_VACCINE, Some(false))
            .await?;
        session
            .verify(
                Role::Main,
                PropertyKind::Text,
                Self::LBL_VACCINE_MANUFACTURER,
                Some(false),
            )
            .await?;
        Ok(())
    }

    /// Add a new batch of `vaccine` expiring in a year
    pub async fn add_batch<D: PageDriver>(
        &self,
        session: &Session<D>,
        vaccine: &str,
    ) -> ProbeResult<Batch> {
        let batch = Batch::for_vaccine(vaccine, Local::now().date_naive())?;
        let (day, month, year) = batch.expiry_parts();

        session
            .verify(Role::Main, PropertyKind::Text, vaccine, None)
            .await?;
        let add_link = LocatorSpec::role(Role::Link).named_as(format!("Add a new {vaccine} batch"));
        session
            .act(add_link, ActionKind::ClickLink, None, None)
            .await?;
        session
            .verify(Role::Main, PropertyKind::Text, vaccine, None)
            .await?;

        let field = |label: &str| LocatorSpec::named(label).exact();
        session
            .act(field(Self::TXT_BATCH_NAME), ActionKind::Fill, Some(&batch.name), None)
            .await?;
        session
            .act(field(Self::TXT_EXPIRY_DAY), ActionKind::Fill, Some(day), None)
            .await?;
        session
            .act(field(Self::TXT_EXPIRY_MONTH), ActionKind::Fill, Some(month), None)
            .await?;
        session
            .act(field(Self::TXT_EXPIRY_YEAR), ActionKind::Fill, Some(year), None)
            .await?;
        session
            .act(Self::BTN_ADD_BATCH, ActionKind::ClickButton, None, None)
            .await?;

        let added = format!("Batch {} added", batch.name);
        session
            .verify(Role::Main, PropertyKind::Text, &added, None)
            .await?;
        Ok(batch)
    }

    /// Push a batch's expiry out by two years
    pub async fn change_batch<D: PageDriver>(
        &self,
        session: &Session<D>,
        batch: &Batch,
    ) -> ProbeResult<()> {
        let year = offset_business_date(Local::now().date_naive(), 730)?;
        session
            .act(
                batch.name.as_str(),
                ActionKind::ClickLinkIndexForRow,
                None,
                Some(Self::LNK_CHANGE),
            )
            .await?;
        session
            .act(
                LocatorSpec::named(Self::TXT_EXPIRY_YEAR).exact(),
                ActionKind::Fill,
                year.get(0..4),
                None,
            )
            .await?;
        session
            .act(Self::BTN_SAVE_CHANGES, ActionKind::ClickButton, None, None)
            .await?;

        let updated = format!("Batch {} updated", batch.name);
        session
            .verify(Role::Main, PropertyKind::Text, &updated, None)
            .await?;
        Ok(())
    }

    /// Archive a batch
    pub async fn archive_batch<D: PageDriver>(
        &self,
        session: &Session<D>,
        batch: &Batch,
    ) -> ProbeResult<()> {
        session
            .act(
                batch.name.as_str(),
                ActionKind::ClickLinkIndexForRow,
                None,
                Some(Self::LNK_ARCHIVE),
            )
            .await?;
        session
            .act(Self::BTN_CONFIRM_ARCHIVE, ActionKind::ClickButton, None, None)
            .await?;
        session
            .verify(Role::Main, PropertyKind::Text, Self::LBL_BATCH_ARCHIVED, None)
            .await?;
        Ok(())
    }
}
