//! Parsing of persisted path datasets and suspicious-path selections.

use super::schema::{scalar_id, PathRecord};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse the rows of a path dataset
///
/// Accepts a bare array of rows or an object with a `paths` array. Rows
/// without a `path_id` are skipped with a warning; they cannot be addressed
/// by any later stage.
pub fn parse_path_dataset(raw: &Value) -> Result<Vec<PathRecord>, ParseError> {
    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(obj) => obj.get("paths").and_then(Value::as_array).ok_or_else(|| {
            ParseError::InvalidFormat("Path dataset object must hold a `paths` array".to_string())
        })?,
        _ => {
            return Err(ParseError::InvalidFormat(
                "Path dataset must be a JSON array or object".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let record: PathRecord = serde_json::from_value(row.clone())?;
        if record.path_id.is_empty() {
            warn!("Skipping dataset row {} without a path_id", index);
            continue;
        }
        records.push(record);
    }

    debug!("Parsed {} path dataset rows", records.len());
    Ok(records)
}

/// Parse a `{ source: [path_id, ...] }` selection produced by the ranking stage
pub fn parse_suspicious_map(raw: &Value) -> Result<BTreeMap<String, Vec<String>>, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Suspicious path map must be an object".to_string())
    })?;

    let mut selection = BTreeMap::new();
    for (source, ids) in obj {
        let ids = ids.as_array().ok_or_else(|| {
            ParseError::InvalidFormat(format!("Path ids for `{}` must be an array", source))
        })?;

        let parsed: Vec<String> = ids.iter().filter_map(scalar_id).collect();
        if parsed.len() != ids.len() {
            warn!(
                "Dropped {} non-scalar path ids for source {}",
                ids.len() - parsed.len(),
                source
            );
        }
        selection.insert(source.clone(), parsed);
    }

    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_without_path_id_are_skipped() {
        let raw = json!([
            {"tx_hash": "0x1", "path_id": "p1", "methods_str": "f1|f2"},
            {"tx_hash": "0x1", "methods_str": "f3"},
        ]);

        let rows = parse_path_dataset(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path_id, "p1");
    }

    #[test]
    fn test_parse_suspicious_map() {
        let raw = json!({"run_a": ["p1", 2], "run_b": []});
        let map = parse_suspicious_map(&raw).unwrap();

        assert_eq!(map["run_a"], vec!["p1".to_string(), "2".to_string()]);
        assert!(map["run_b"].is_empty());
        assert!(parse_suspicious_map(&json!(["p1"])).is_err());
    }
}
