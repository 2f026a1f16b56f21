//! Validate command handler

use crate::commands::ValidateArgs;
use crate::error::{CliError, CliResult};
use crate::families::Family;
use vaxprobe::{ScenarioRecord, ScenarioRowMapper, Worksheet};

/// Execute the validate command
pub fn execute_validate(args: &ValidateArgs) -> CliResult<()> {
    let sheet = Worksheet::open(&args.sheet)?;
    let family = resolve_family(&sheet, args.family)?;
    let records = map_sheet(&sheet, family)?;
    println!(
        "{}: {} scenarios valid ({family})",
        args.sheet.display(),
        records.len()
    );
    Ok(())
}

/// The `--family` flag if given, else the family named by the worksheet
pub fn resolve_family(sheet: &Worksheet, flag: Option<Family>) -> CliResult<Family> {
    if let Some(family) = flag {
        return Ok(family);
    }
    Family::from_name(sheet.family()).ok_or_else(|| {
        let known: Vec<&str> = Family::ALL.iter().map(|f| f.name()).collect();
        CliError::invalid_argument(format!(
            "worksheet {:?} does not name a known family; pass --family ({})",
            sheet.family(),
            known.join(", ")
        ))
    })
}

/// Map every row of `sheet` against the family's schema
pub(crate) fn map_sheet(sheet: &Worksheet, family: Family) -> CliResult<Vec<ScenarioRecord>> {
    let schema = family.schema();
    Ok(ScenarioRowMapper::new(&schema).map_all(sheet)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use vaxprobe::ProbeError;

    fn sheet(family: &str, csv: &str) -> Worksheet {
        Worksheet::from_reader(family, csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_family_from_file_stem() {
        let sheet = sheet("parental_consent_hpv", "ChildFirstName\n");
        assert_eq!(
            resolve_family(&sheet, None).unwrap(),
            Family::ParentalConsentHpv
        );
    }

    #[test]
    fn test_flag_wins_over_file_stem() {
        let sheet = sheet("batch_of_tuesday", "ChildFirstName\n");
        assert_eq!(
            resolve_family(&sheet, Some(Family::ParentalConsentHpv)).unwrap(),
            Family::ParentalConsentHpv
        );
    }

    #[test]
    fn test_unknown_stem_lists_families() {
        let sheet = sheet("batch_of_tuesday", "ChildFirstName\n");
        let err = resolve_family(&sheet, None).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
        assert!(err.to_string().contains("parental_consent_hpv"));
    }

    #[test]
    fn test_map_sheet_counts_records() {
        let sheet = sheet(
            "parental_consent_hpv",
            "ScenarioId,ChildFirstName,ChildLastName,ConsentVaccine,ExpectedFinalMessage\n\
             a,Jo,Doe,yes,Consent recorded\n\
             b,Al,Poe,no,Consent refused\n",
        );
        let records = map_sheet(&sheet, Family::ParentalConsentHpv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].scenario_id(), "b");
    }

    #[test]
    fn test_map_sheet_rejects_bad_flag() {
        let sheet = sheet(
            "parental_consent_hpv",
            "ScenarioId,ChildFirstName,ChildLastName,ConsentVaccine,ExpectedFinalMessage\n\
             a,Jo,Doe,perhaps,Consent recorded\n",
        );
        let err = map_sheet(&sheet, Family::ParentalConsentHpv).unwrap_err();
        assert!(matches!(
            err,
            CliError::Probe(ProbeError::SchemaMismatch { ref field, .. }) if field == "ConsentVaccine"
        ));
    }
}
