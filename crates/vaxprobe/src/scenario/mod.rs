//! Data-driven scenarios.
//!
//! A scenario family is one CSV [`Worksheet`] plus a [`ScenarioSchema`]
//! declaring its columns. [`ScenarioRowMapper::map_all`] turns the whole sheet
//! into typed [`ScenarioRecord`]s before any browser work starts, so a bad row
//! aborts the run instead of failing halfway through it.

mod mapper;
mod record;
mod schema;
mod source;

pub use mapper::ScenarioRowMapper;
pub use record::{FieldValue, ScenarioRecord};
pub use schema::{FieldKind, FieldSpec, ScenarioSchema, SCENARIO_ID_COLUMN};
pub use source::{RawRow, Worksheet};
