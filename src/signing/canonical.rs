use serde_json::{Map, Value};

use super::error::SigningError;
use crate::report::AuthenticityReport;

/// Deterministic signing input for `report`.
///
/// JSON of the report with `signature` removed, object keys sorted recursively,
/// and no whitespace. Signed and unsigned copies of a report canonicalize to
/// the same bytes.
pub fn canonical_bytes(report: &AuthenticityReport) -> Result<Vec<u8>, SigningError> {
    let mut value = serde_json::to_value(report)?;
    if let Value::Object(fields) = &mut value {
        fields.remove("signature");
    }
    Ok(serde_json::to_vec(&sort_keys(value))?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(fields) => {
            let mut entries: Vec<(String, Value)> = fields.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
