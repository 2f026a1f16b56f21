//! Scenario schemas: the declared columns of one scenario family.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column holding the scenario identity, when a worksheet has one
pub const SCENARIO_ID_COLUMN: &str = "ScenarioId";

/// How a cell is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text
    Text,
    /// Boolean (`true/false`, `yes/no`, `y/n`, `1/0`)
    Flag,
    /// Whole number
    Integer,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Flag => "flag",
            Self::Integer => "integer",
        })
    }
}

/// One declared column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Column header
    pub column: String,
    /// Coercion
    pub kind: FieldKind,
    /// Must be present and non-empty
    pub required: bool,
}

/// The declared field set of a scenario family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSchema {
    family: String,
    fields: Vec<FieldSpec>,
}

impl ScenarioSchema {
    /// Create an empty schema for `family`
    #[must_use]
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field
    #[must_use]
    pub fn field(mut self, column: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        self.fields.push(FieldSpec {
            column: column.into(),
            kind,
            required,
        });
        self
    }

    /// Declare a required text field
    #[must_use]
    pub fn required_text(self, column: impl Into<String>) -> Self {
        self.field(column, FieldKind::Text, true)
    }

    /// Declare an optional text field
    #[must_use]
    pub fn optional_text(self, column: impl Into<String>) -> Self {
        self.field(column, FieldKind::Text, false)
    }

    /// Declare a required flag
    #[must_use]
    pub fn required_flag(self, column: impl Into<String>) -> Self {
        self.field(column, FieldKind::Flag, true)
    }

    /// Declare an optional flag
    #[must_use]
    pub fn optional_flag(self, column: impl Into<String>) -> Self {
        self.field(column, FieldKind::Flag, false)
    }

    /// Declare a required integer
    #[must_use]
    pub fn required_integer(self, column: impl Into<String>) -> Self {
        self.field(column, FieldKind::Integer, true)
    }

    /// Declare an optional integer
    #[must_use]
    pub fn optional_integer(self, column: impl Into<String>) -> Self {
        self.field(column, FieldKind::Integer, false)
    }

    /// Family (worksheet) name
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Declared fields, in order
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a declared field
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Number of declared fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// No fields declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let schema = ScenarioSchema::new("batches")
            .required_text("BatchName")
            .optional_integer("ExpiryOffsetDays")
            .optional_flag("Archive");
        let columns: Vec<_> = schema.fields().iter().map(|f| f.column.as_str()).collect();
        assert_eq!(columns, ["BatchName", "ExpiryOffsetDays", "Archive"]);
        assert_eq!(schema.family(), "batches");
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_get() {
        let schema = ScenarioSchema::new("f").required_flag("ConsentVaccine");
        let field = schema.get("ConsentVaccine").map(|f| (f.kind, f.required));
        assert_eq!(field, Some((FieldKind::Flag, true)));
        assert!(schema.get("Nope").is_none());
    }
}
