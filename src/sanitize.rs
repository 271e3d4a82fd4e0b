//! Sanitization of untrusted text for literal embedding in SQL.
//!
//! Every string that ends up between single quotes in the generated script
//! must pass through [`normalize_text`] or [`serialize_for_sql`] exactly
//! once. The compiler is the only embedding point, so the escaping contract
//! has a single enforcement point that can be audited in isolation.
//!
//! Invalid byte sequences are already gone by the time values reach this
//! module: the loader decodes raw bytes with replacement, and `serde_json`
//! only produces valid UTF-8 strings.

use anyhow::{Context, Result};
use serde_json::Value;

/// Renders any JSON value as SQL-literal-safe text.
///
/// `null` becomes the empty string, strings pass through, and every other
/// value is stringified to its compact JSON text. Literal single quotes are
/// doubled so the result can sit verbatim between single quotes.
pub fn normalize_text(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };

    escape_quotes(&text)
}

/// Recursively applies [`normalize_text`] to every string leaf of a JSON
/// value, leaving numbers, booleans and nulls untouched.
///
/// Object keys are not escaped; they never reach a SQL literal. Key order is
/// preserved (`serde_json` is built with `preserve_order`).
pub fn sanitize_structure(value: &Value) -> Value {
    match value {
        Value::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), sanitize_structure(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_structure).collect()),
        Value::String(_) => Value::String(normalize_text(value)),
        other => other.clone(),
    }
}

/// Serializes a JSON value compactly, keeping non-ASCII characters literal,
/// and escapes the serialized text for embedding in a SQL string literal.
///
/// Single quotes only occur inside JSON string values, so escaping the
/// serialized text as a whole round-trips: the database parses the literal
/// back to exactly the serialized JSON.
pub fn serialize_for_sql(value: &Value) -> Result<String> {
    let serialized = serde_json::to_string(value).context("failed to serialize json value")?;
    Ok(escape_quotes(&serialized))
}

fn escape_quotes(text: &str) -> String {
    text.replace('\'', "''")
}
