//! CSV worksheets: one file per scenario family.

use crate::result::{ProbeError, ProbeResult};
use std::io::Read;
use std::path::Path;

/// One untyped data row, column-keyed, in header order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    number: usize,
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Create a row; `number` is the 1-based data row number
    #[must_use]
    pub const fn new(number: usize, cells: Vec<(String, String)>) -> Self {
        Self { number, cells }
    }

    /// 1-based data row number
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }

    /// Cell for `column`, if the row has that column
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Column names present in the row
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, value)| value.trim().is_empty())
    }
}

/// A loaded worksheet: header plus data rows in execution order
#[derive(Debug, Clone)]
pub struct Worksheet {
    family: String,
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl Worksheet {
    /// Load a CSV file; the family is the file stem
    pub fn open(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let path = path.as_ref();
        let family = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                ProbeError::config(format!("cannot name a worksheet from {}", path.display()))
            })?
            .to_string();
        let file = std::fs::File::open(path)?;
        Self::from_reader(family, file)
    }

    /// Parse CSV from any reader. Fully blank rows are skipped.
    pub fn from_reader(family: impl Into<String>, reader: impl Read) -> ProbeResult<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for (index, record) in csv.records().enumerate() {
            let record = record?;
            let cells = headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            let row = RawRow::new(index + 1, cells);
            if !row.is_blank() {
                rows.push(row);
            }
        }

        Ok(Self {
            family: family.into(),
            headers,
            rows,
        })
    }

    /// Scenario family
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Header columns, in file order
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, in file order
    #[must_use]
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// No data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reader_keeps_order_and_numbers() {
        let csv = "ChildFirstName , ChildLastName\nJo,Doe\n,\nSam,Roe\n";
        let sheet = Worksheet::from_reader("parental_consent_hpv", csv.as_bytes()).unwrap();
        assert_eq!(sheet.headers(), ["ChildFirstName", "ChildLastName"]);
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rows()[0].get("ChildFirstName"), Some("Jo"));
        // the blank line in between keeps its number
        assert_eq!(sheet.rows()[1].number(), 3);
        assert_eq!(sheet.rows()[1].get("ChildLastName"), Some("Roe"));
    }

    #[test]
    fn test_ragged_row_is_csv_error() {
        let csv = "A,B\n1,2,3\n";
        let err = Worksheet::from_reader("f", csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ProbeError::Csv(_)));
    }

    #[test]
    fn test_open_names_family_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parental_consent_hpv.csv");
        std::fs::write(&path, "ChildFirstName\nJo\n").unwrap();
        let sheet = Worksheet::open(&path).unwrap();
        assert_eq!(sheet.family(), "parental_consent_hpv");
        assert!(!sheet.is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let err = Worksheet::open("/nonexistent/sheet.csv").unwrap_err();
        assert!(matches!(err, ProbeError::Io(_)));
    }
}
