//! Scenario family registry.
//!
//! Each family names one worksheet layout and the workflow that consumes it.

use clap::ValueEnum;
use std::fmt;
use vaxprobe::ScenarioSchema;

/// Column names of the `parental_consent_hpv` worksheet
pub mod consent_columns {
    /// Child's legal first name
    pub const CHILD_FIRST_NAME: &str = "ChildFirstName";
    /// Child's legal last name
    pub const CHILD_LAST_NAME: &str = "ChildLastName";
    /// Preferred first name
    pub const CHILD_AKA_FIRST: &str = "ChildAKAFirst";
    /// Preferred last name
    pub const CHILD_AKA_LAST: &str = "ChildAKALast";
    /// Date of birth, day
    pub const CHILD_DOB_DAY: &str = "ChildDobDay";
    /// Date of birth, month
    pub const CHILD_DOB_MONTH: &str = "ChildDobMonth";
    /// Date of birth, year
    pub const CHILD_DOB_YEAR: &str = "ChildDobYear";
    /// School the child attends
    pub const SCHOOL_NAME: &str = "SchoolName";
    /// Parent or guardian full name
    pub const PARENT_FULL_NAME: &str = "ParentFullName";
    /// Relationship to the child
    pub const RELATION: &str = "Relation";
    /// Contact email
    pub const EMAIL: &str = "Email";
    /// Contact phone; blank skips the phone options step
    pub const PHONE: &str = "Phone";
    /// Whether consent is given
    pub const CONSENT_VACCINE: &str = "ConsentVaccine";
    /// GP surgery
    pub const GP_NAME: &str = "GPName";
    /// Home address, line 1
    pub const ADDRESS_LINE_1: &str = "AddressLine1";
    /// Home address, line 2
    pub const ADDRESS_LINE_2: &str = "AddressLine2";
    /// Town or city
    pub const CITY: &str = "City";
    /// Postcode
    pub const POSTCODE: &str = "PostCode";
    /// Allergy details; blank answers "No"
    pub const ALLERGY_DETAILS: &str = "AllergyDetails";
    /// Medical condition details; blank answers "No"
    pub const MEDICAL_CONDITION_DETAILS: &str = "MedicalConditionDetails";
    /// Previous reaction details; blank answers "No"
    pub const REACTION_DETAILS: &str = "ReactionDetails";
    /// Extra support details; blank answers "No"
    pub const EXTRA_SUPPORT_DETAILS: &str = "ExtraSupportDetails";
    /// Refusal reason, used when consent is not given
    pub const CONSENT_NOT_GIVEN_REASON: &str = "ConsentNotGivenReason";
    /// Refusal notes
    pub const CONSENT_NOT_GIVEN_DETAILS: &str = "ConsentNotGivenDetails";
    /// Text expected in `main` on the confirmation page
    pub const EXPECTED_FINAL_MESSAGE: &str = "ExpectedFinalMessage";
}

/// Known scenario families
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    /// Parental consent for the HPV vaccination
    #[value(name = "parental_consent_hpv")]
    ParentalConsentHpv,
}

impl Family {
    /// All families
    pub const ALL: [Self; 1] = [Self::ParentalConsentHpv];

    /// Family name, also the worksheet file stem
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ParentalConsentHpv => "parental_consent_hpv",
        }
    }

    /// Look a family up by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Column schema
    #[must_use]
    pub fn schema(self) -> ScenarioSchema {
        match self {
            Self::ParentalConsentHpv => parental_consent_hpv(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parental_consent_hpv() -> ScenarioSchema {
    use consent_columns as col;

    ScenarioSchema::new(Family::ParentalConsentHpv.name())
        .required_text(col::CHILD_FIRST_NAME)
        .required_text(col::CHILD_LAST_NAME)
        .optional_text(col::CHILD_AKA_FIRST)
        .optional_text(col::CHILD_AKA_LAST)
        .optional_text(col::CHILD_DOB_DAY)
        .optional_text(col::CHILD_DOB_MONTH)
        .optional_text(col::CHILD_DOB_YEAR)
        .optional_text(col::SCHOOL_NAME)
        .optional_text(col::PARENT_FULL_NAME)
        .optional_text(col::RELATION)
        .optional_text(col::EMAIL)
        .optional_text(col::PHONE)
        .required_flag(col::CONSENT_VACCINE)
        .optional_text(col::GP_NAME)
        .optional_text(col::ADDRESS_LINE_1)
        .optional_text(col::ADDRESS_LINE_2)
        .optional_text(col::CITY)
        .optional_text(col::POSTCODE)
        .optional_text(col::ALLERGY_DETAILS)
        .optional_text(col::MEDICAL_CONDITION_DETAILS)
        .optional_text(col::REACTION_DETAILS)
        .optional_text(col::EXTRA_SUPPORT_DETAILS)
        .optional_text(col::CONSENT_NOT_GIVEN_REASON)
        .optional_text(col::CONSENT_NOT_GIVEN_DETAILS)
        .required_text(col::EXPECTED_FINAL_MESSAGE)
}
