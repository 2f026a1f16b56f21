//! Row → record mapping.
//!
//! A row either maps to a complete [`ScenarioRecord`] or fails with a
//! [`ProbeError::SchemaMismatch`] naming the row and field. There is no
//! partially built record: every cell is coerced first and the record is
//! assembled in one step.

use super::record::{FieldValue, ScenarioRecord};
use super::schema::{FieldKind, FieldSpec, ScenarioSchema, SCENARIO_ID_COLUMN};
use super::source::{RawRow, Worksheet};
use crate::result::{ProbeError, ProbeResult};
use std::collections::HashSet;
use tracing::debug;

/// Maps untyped rows onto a [`ScenarioSchema`]
#[derive(Debug, Clone, Copy)]
pub struct ScenarioRowMapper<'a> {
    schema: &'a ScenarioSchema,
}

impl<'a> ScenarioRowMapper<'a> {
    /// Create a mapper for `schema`
    #[must_use]
    pub const fn new(schema: &'a ScenarioSchema) -> Self {
        Self { schema }
    }

    /// Check a worksheet header against the schema.
    ///
    /// Undeclared columns and missing required columns are mismatches.
    /// Missing optional columns read as blank.
    pub fn check_headers(&self, headers: &[String]) -> ProbeResult<()> {
        if let Some(unknown) = headers
            .iter()
            .find(|h| h.as_str() != SCENARIO_ID_COLUMN && self.schema.get(h).is_none())
        {
            return Err(self.mismatch("header", unknown, "is not declared by the schema"));
        }
        if let Some(missing) = self
            .schema
            .fields()
            .iter()
            .find(|f| f.required && !headers.iter().any(|h| *h == f.column))
        {
            return Err(self.mismatch("header", &missing.column, "is required but has no column"));
        }
        Ok(())
    }

    /// Map one row
    pub fn map(&self, row: &RawRow) -> ProbeResult<ScenarioRecord> {
        let scenario_id = row_identity(row);
        let fields = self
            .schema
            .fields()
            .iter()
            .map(|spec| {
                let raw = row.get(&spec.column).unwrap_or_default();
                coerce(spec, raw)
                    .map(|value| (spec.column.clone(), value))
                    .map_err(|reason| self.mismatch(&scenario_id, &spec.column, &reason))
            })
            .collect::<ProbeResult<Vec<_>>>()?;
        Ok(ScenarioRecord::new(
            scenario_id,
            self.schema.family().to_string(),
            fields,
        ))
    }

    /// Map a whole worksheet, failing on the first bad row or duplicate id
    pub fn map_all(&self, sheet: &Worksheet) -> ProbeResult<Vec<ScenarioRecord>> {
        self.check_headers(sheet.headers())?;
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(sheet.len());
        for row in sheet.rows() {
            let record = self.map(row)?;
            if !seen.insert(record.scenario_id().to_string()) {
                return Err(self.mismatch(
                    record.scenario_id(),
                    SCENARIO_ID_COLUMN,
                    "duplicates an earlier row",
                ));
            }
            records.push(record);
        }
        debug!(family = self.schema.family(), records = records.len(), "worksheet mapped");
        Ok(records)
    }

    fn mismatch(&self, row: &str, field: &str, reason: &str) -> ProbeError {
        ProbeError::SchemaMismatch {
            family: self.schema.family().to_string(),
            row: row.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// `ScenarioId` cell if non-blank, else `row-<n>`
fn row_identity(row: &RawRow) -> String {
    row.get(SCENARIO_ID_COLUMN)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(|| format!("row-{}", row.number()), str::to_string)
}

fn coerce(spec: &FieldSpec, raw: &str) -> Result<FieldValue, String> {
    let cell = raw.trim();
    if cell.is_empty() {
        return if spec.required {
            Err("is required but empty".to_string())
        } else {
            Ok(FieldValue::Empty)
        };
    }
    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text(cell.to_string())),
        FieldKind::Flag => parse_flag(cell)
            .map(FieldValue::Flag)
            .ok_or_else(|| format!("expected a flag, got {cell:?}")),
        FieldKind::Integer => parse_integer(cell)
            .map(FieldValue::Integer)
            .ok_or_else(|| format!("expected an integer, got {cell:?}")),
    }
}

fn parse_flag(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Spreadsheet exports write whole numbers as `5.0`
fn parse_integer(cell: &str) -> Option<i64> {
    if let Ok(n) = cell.parse::<i64>() {
        return Some(n);
    }
    let (whole, fraction) = cell.split_once('.')?;
    if fraction.bytes().all(|b| b == b'0') {
        whole.parse().ok()
    } else {
        None
    }
}
