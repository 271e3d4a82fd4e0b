//! Dataset loading: raw bytes → ordered record lists.
//!
//! Decoding is lossy on purpose. The source datasets occasionally carry
//! broken byte sequences; those become U+FFFD replacement characters instead
//! of failing the run, per the input contract. Everything after this point
//! operates on valid UTF-8.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value;

/// Loads one dataset file as an ordered sequence of raw records.
pub fn load_dataset(path: &Path) -> Result<Vec<Value>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    match document {
        Value::Array(records) => Ok(records),
        other => bail!(
            "expected a JSON array of records in {}, got {}",
            path.display(),
            json_type_name(&other)
        ),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::load_dataset;

    #[test]
    fn loads_an_array_of_records_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        fs::write(
            &path,
            r#"[{"id": 1, "name": "Africa"}, {"id": 2, "name": "Americas"}]"#,
        )
        .unwrap();

        let records = load_dataset(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], json!(1));
        assert_eq!(records[1]["name"], json!("Americas"));
    }

    #[test]
    fn invalid_utf8_is_replaced_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        fs::write(&path, b"[{\"id\": 1, \"name\": \"Afr\xFFica\"}]").unwrap();

        let records = load_dataset(&path).unwrap();
        assert_eq!(records[0]["name"], json!("Afr\u{FFFD}ica"));
    }

    #[test]
    fn non_array_document_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.json");
        fs::write(&path, r#"{"id": 1}"#).unwrap();

        let error = load_dataset(&path).unwrap_err();
        assert!(error.to_string().contains("expected a JSON array"));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let error = load_dataset(&path).unwrap_err();
        assert!(error.to_string().contains("absent.json"));
    }
}
