//! Record-to-statement compiler.
//!
//! One `INSERT` per record, driven entirely by the [`TableSpec`] of the
//! entity kind. The primary key is produced server-side by the
//! schema-qualified generator; parents are resolved at execution time by a
//! correlated subquery over the parent table's `id_internal` column, so the
//! compiler never needs to see generated keys. Parent existence is not
//! validated here: an unresolvable reference compiles fine and yields an
//! empty subquery when the script runs.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::sanitize::{normalize_text, serialize_for_sql};
use crate::schema::{ColumnKind, ColumnSpec, EntityKind, TableSpec};

/// Server-side unique-id generator invoked for every primary key.
pub const ID_GENERATOR_FN: &str = "generate_ulid";

/// Compiles one record into a complete `INSERT INTO "<Table>" (...) VALUES (...);`.
///
/// A record that is not a JSON object, or is missing any field the table
/// spec names, is a fatal error. No statement text is produced for a record
/// that fails.
pub fn compile_insert(table: &TableSpec, record: &Value, schema: &str) -> Result<String> {
    let fields = match record.as_object() {
        Some(fields) => fields,
        None => bail!("record for table \"{}\" is not a JSON object", table.table),
    };

    let mut columns = Vec::with_capacity(table.columns.len() + 1);
    let mut values = Vec::with_capacity(table.columns.len() + 1);

    columns.push("\"id\"".to_string());
    values.push(format!("{schema}.{ID_GENERATOR_FN}()"));

    for spec in table.columns {
        let value = fields.get(spec.field).with_context(|| {
            format!(
                "missing required field `{}` for column \"{}\".\"{}\"",
                spec.field, table.table, spec.column
            )
        })?;

        columns.push(format!("\"{}\"", spec.column));
        values.push(render_value(spec, value).with_context(|| {
            format!("failed to render column \"{}\".\"{}\"", table.table, spec.column)
        })?);
    }

    Ok(format!(
        "INSERT INTO \"{}\" ({}) VALUES ({});",
        table.table,
        columns.join(", "),
        values.join(", ")
    ))
}

/// Compiles a whole dataset in input order, aborting on the first bad record.
pub fn compile_dataset(kind: EntityKind, records: &[Value], schema: &str) -> Result<Vec<String>> {
    let table = kind.table();
    let mut statements = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let statement = compile_insert(table, record, schema).with_context(|| {
            format!("failed to compile {} record at index {index}", kind.as_str())
        })?;
        statements.push(statement);
    }

    Ok(statements)
}

/// Connection preamble: optional `\connect` (psql only) plus the search-path
/// directive that scopes unqualified identifiers to the target schema.
pub fn preamble(database: Option<&str>, schema: &str) -> String {
    let mut header = String::new();

    if let Some(database) = database {
        header.push_str(&format!("\\connect {database}\n\n"));
    }
    header.push_str(&format!("SET search_path TO {schema}, public;\n"));

    header
}

/// Assembles the final script: preamble, then every statement separated by a
/// blank line, with a trailing newline.
pub fn assemble_script(header: &str, statements: &[String]) -> String {
    let mut script = String::with_capacity(
        header.len() + statements.iter().map(|s| s.len() + 2).sum::<usize>(),
    );

    script.push_str(header);
    for statement in statements {
        script.push('\n');
        script.push_str(statement);
        script.push('\n');
    }

    script
}

fn render_value(spec: &ColumnSpec, value: &Value) -> Result<String> {
    match spec.kind {
        ColumnKind::Text => Ok(format!("'{}'", normalize_text(value))),
        ColumnKind::Json => Ok(format!("'{}'", serialize_for_sql(value)?)),
        ColumnKind::Numeric => render_numeric(value),
        ColumnKind::NullableNumeric => {
            if value.is_null() {
                Ok("NULL".to_string())
            } else {
                render_numeric(value)
            }
        }
        ColumnKind::ParentLookup { table } => {
            let key = render_numeric(value)
                .with_context(|| format!("invalid parent reference into \"{table}\""))?;
            Ok(format!(
                "(SELECT id FROM \"{table}\" WHERE id_internal = {key})"
            ))
        }
    }
}

/// Renders a bare numeric token. The source datasets carry some numeric
/// columns (latitude, longitude) as decimal strings; those are accepted as
/// long as the text parses as a number, and are embedded verbatim to keep
/// their original precision. Everything else is rejected, so nothing
/// unquoted can smuggle SQL into the statement.
fn render_numeric(value: &Value) -> Result<String> {
    match value {
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => {
            let trimmed = text.trim();
            match trimmed.parse::<f64>() {
                Ok(number) if number.is_finite() => Ok(trimmed.to_string()),
                _ => bail!("expected a numeric value, got `{text}`"),
            }
        }
        other => bail!("expected a numeric value, got `{other}`"),
    }
}
