//! Symbolic locators.
//!
//! A [`LocatorSpec`] describes an element by ARIA role and accessible name,
//! optionally scoped to a container, narrowed to a table row containing some
//! text, and disambiguated by a zero-based index. Locators are strict: they
//! must resolve to exactly one element unless an index picks among several.
//!
//! ```
//! use vaxprobe::{LocatorSpec, Role};
//!
//! // The archive link is the second link in the batch's row.
//! let archive = LocatorSpec::role(Role::Link)
//!     .named_as("Batch")
//!     .in_row("GardasilBatch1")
//!     .nth(1);
//! assert_eq!(archive.to_string(), "link \"Batch\" in row \"GardasilBatch1\" [1]");
//! ```

use crate::result::{ProbeError, ProbeResult};
use crate::verify::normalize_text;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ARIA roles the suite locates by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// `<button>`, `<input type=submit>`
    Button,
    /// `<input type=checkbox>`
    Checkbox,
    /// `<select>`
    Combobox,
    /// `<h1>`..`<h6>`
    Heading,
    /// `<a href>`
    Link,
    /// `<main>`
    Main,
    /// `<nav>`
    Navigation,
    /// `<p>`
    Paragraph,
    /// `<input type=radio>`
    Radio,
    /// `<tr>`
    Row,
    /// `<strong>`
    Strong,
    /// `<table>`
    Table,
    /// `<input type=text|email|tel|...>`, `<textarea>`
    Textbox,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Self; 13] = [
        Self::Button,
        Self::Checkbox,
        Self::Combobox,
        Self::Heading,
        Self::Link,
        Self::Main,
        Self::Navigation,
        Self::Paragraph,
        Self::Radio,
        Self::Row,
        Self::Strong,
        Self::Table,
        Self::Textbox,
    ];

    /// ARIA role name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Checkbox => "checkbox",
            Self::Combobox => "combobox",
            Self::Heading => "heading",
            Self::Link => "link",
            Self::Main => "main",
            Self::Navigation => "navigation",
            Self::Paragraph => "paragraph",
            Self::Radio => "radio",
            Self::Row => "row",
            Self::Strong => "strong",
            Self::Table => "table",
            Self::Textbox => "textbox",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| ProbeError::invalid_request(format!("unknown role {s:?}")))
    }
}

/// How an accessible name is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NameMatch {
    /// Case-insensitive substring (the default)
    #[default]
    Contains,
    /// Whole-string equality after whitespace normalization
    Exact,
}

impl NameMatch {
    /// Test a candidate accessible name against the wanted one
    #[must_use]
    pub fn matches(self, candidate: &str, wanted: &str) -> bool {
        let candidate = normalize_text(candidate);
        let wanted = normalize_text(wanted);
        match self {
            Self::Exact => candidate == wanted,
            Self::Contains => candidate.to_lowercase().contains(&wanted.to_lowercase()),
        }
    }
}

/// A container that scopes a locator (e.g. the navigation bar)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container role
    pub role: Role,
    /// Optional container name
    pub name: Option<String>,
}

/// A symbolic reference to a UI element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocatorSpec {
    /// Role; `None` lets the action kind choose (or matches any role)
    pub role: Option<Role>,
    /// Accessible name; `None` matches any name
    pub name: Option<String>,
    /// Name matching mode
    pub name_match: NameMatch,
    /// Container scope; `None` means the whole page
    pub scope: Option<Container>,
    /// Only match inside table rows containing this text
    pub row: Option<String>,
    /// Zero-based pick among the remaining candidates
    pub index: Option<usize>,
}

impl LocatorSpec {
    /// Locate by role
    #[must_use]
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    /// Locate by accessible name only; the action kind supplies the role
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the accessible name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder alias for [`Self::with_name`] that reads well after `role()`
    #[must_use]
    pub fn named_as(self, name: impl Into<String>) -> Self {
        self.with_name(name)
    }

    /// Require the accessible name to match exactly
    #[must_use]
    pub const fn exact(mut self) -> Self {
        self.name_match = NameMatch::Exact;
        self
    }

    /// Scope to a container
    #[must_use]
    pub fn within(mut self, role: Role, name: Option<&str>) -> Self {
        self.scope = Some(Container {
            role,
            name: name.map(str::to_string),
        });
        self
    }

    /// Narrow to rows containing `text`
    #[must_use]
    pub fn in_row(mut self, text: impl Into<String>) -> Self {
        self.row = Some(text.into());
        self
    }

    /// Pick the Nth (zero-based) candidate
    #[must_use]
    pub const fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Fill in the role if the locator did not name one
    #[must_use]
    pub fn or_role(mut self, role: Role) -> Self {
        if self.role.is_none() {
            self.role = Some(role);
        }
        self
    }
}

impl From<&str> for LocatorSpec {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for LocatorSpec {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<Role> for LocatorSpec {
    fn from(role: Role) -> Self {
        Self::role(role)
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.role, &self.name) {
            (Some(role), Some(name)) => write!(f, "{role} {name:?}")?,
            (Some(role), None) => write!(f, "{role}")?,
            (None, Some(name)) => write!(f, "{name:?}")?,
            (None, None) => f.write_str("any element")?,
        }
        if let Some(ref scope) = self.scope {
            match scope.name {
                Some(ref name) => write!(f, " within {} {name:?}", scope.role)?,
                None => write!(f, " within {}", scope.role)?,
            }
        }
        if let Some(ref row) = self.row {
            write!(f, " in row {row:?}")?;
        }
        if let Some(index) = self.index {
            write!(f, " [{index}]")?;
        }
        Ok(())
    }
}
