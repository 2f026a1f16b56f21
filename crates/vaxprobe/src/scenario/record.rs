//! Typed scenario records.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A coerced cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Blank cell (optional field)
    Empty,
    /// Text cell
    Text(String),
    /// Flag cell
    Flag(bool),
    /// Integer cell
    Integer(i64),
}

impl FieldValue {
    /// Blank cell
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// One scenario's inputs, immutable once mapped.
///
/// The field set always equals the schema's declared fields, in declaration
/// order. Records only come out of
/// [`ScenarioRowMapper`](super::ScenarioRowMapper).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRecord {
    scenario_id: String,
    family: String,
    fields: Vec<(String, FieldValue)>,
}

impl ScenarioRecord {
    pub(crate) fn new(
        scenario_id: String,
        family: String,
        fields: Vec<(String, FieldValue)>,
    ) -> Self {
        Self {
            scenario_id,
            family,
            fields,
        }
    }

    /// Row identity, unique within a run
    #[must_use]
    pub fn scenario_id(&self) -> &str {
        &self.scenario_id
    }

    /// Scenario family the record belongs to
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Raw field value
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Text value; `None` when blank or not a text field
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Text value, with blanks as `""`
    #[must_use]
    pub fn text_or_empty(&self, column: &str) -> &str {
        self.text(column).unwrap_or_default()
    }

    /// Flag value
    #[must_use]
    pub fn flag(&self, column: &str) -> Option<bool> {
        match self.get(column) {
            Some(FieldValue::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Integer value
    #[must_use]
    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    /// Whether the field holds a non-blank value
    #[must_use]
    pub fn has_value(&self, column: &str) -> bool {
        self.get(column).is_some_and(|v| !v.is_empty())
    }

    /// All fields, in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Serialize for ScenarioRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("scenario_id", &self.scenario_id)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
