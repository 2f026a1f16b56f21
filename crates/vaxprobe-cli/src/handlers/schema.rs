//! Schema command handler

use crate::commands::SchemaArgs;
use crate::error::{CliError, CliResult};
use crate::families::Family;
use std::fmt::Write;
use vaxprobe::{FieldKind, SCENARIO_ID_COLUMN};

/// Execute the schema command
pub fn execute_schema(args: &SchemaArgs) -> CliResult<()> {
    println!("{}", render_schema(args.family, args.json)?);
    Ok(())
}

/// Render a family's columns as a table or as JSON
pub fn render_schema(family: Family, json: bool) -> CliResult<String> {
    let schema = family.schema();
    if json {
        return serde_json::to_string_pretty(&schema)
            .map_err(|e| CliError::report_generation(e.to_string()));
    }

    let mut out = format!("{family} ({} columns)\n", schema.len() + 1);
    let _ = writeln!(
        out,
        "  {SCENARIO_ID_COLUMN:<28} {:<8} optional  (row identity)",
        FieldKind::Text.to_string()
    );
    for field in schema.fields() {
        let required = if field.required { "required" } else { "optional" };
        let _ = writeln!(
            out,
            "  {:<28} {:<8} {required}",
            field.column,
            field.kind.to_string()
        );
    }
    Ok(out.trim_end().to_string())
}
