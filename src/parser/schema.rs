//! Input record definitions.
//!
//! Two shapes enter the crate: the ordered flat call records of one
//! transaction, and the rows of an already-extracted path dataset.

use crate::utils::config::{METHOD_SEPARATOR, NULL_MARKERS, UNKNOWN_ADDRESS};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Arbitrary key/value payload attached to a path (and to its leaf node)
pub type Metadata = BTreeMap<String, Value>;

/// One observed `from -> to` call.
///
/// A record missing `from` or `to` keeps its slot with the address
/// `"unknown"`; positional indices must stay stable for the reconstructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCallRecord")]
pub struct CallRecord {
    pub from: String,
    pub to: String,
    /// Resolved name or raw selector, treated as an opaque string
    pub method: String,
    /// Decimal (or `0x` hex) value string
    pub value: String,
}

/// Every accepted spelling of a call record's fields.
///
/// Trace nodes often carry several spellings at once (`method` next to
/// `method_id`), so each one is read separately and the first non-blank
/// value wins.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCallRecord {
    from: Option<Value>,
    from_address: Option<Value>,
    #[serde(rename = "fromAddress")]
    from_address_camel: Option<Value>,
    to: Option<Value>,
    to_address: Option<Value>,
    #[serde(rename = "toAddress")]
    to_address_camel: Option<Value>,
    method: Option<Value>,
    method_id: Option<Value>,
    #[serde(rename = "methodId")]
    method_id_camel: Option<Value>,
    name: Option<Value>,
    value: Option<Value>,
}

impl From<RawCallRecord> for CallRecord {
    fn from(raw: RawCallRecord) -> Self {
        Self {
            from: first_text([raw.from, raw.from_address, raw.from_address_camel])
                .unwrap_or_else(unknown_address),
            to: first_text([raw.to, raw.to_address, raw.to_address_camel])
                .unwrap_or_else(unknown_address),
            method: first_text([raw.method, raw.method_id, raw.method_id_camel, raw.name])
                .unwrap_or_default(),
            value: first_text([raw.value]).unwrap_or_else(zero_value),
        }
    }
}

impl CallRecord {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        method: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            method: method.into(),
            value: value.into(),
        }
    }

    /// True when either address had to be replaced by `"unknown"`
    pub fn is_malformed(&self) -> bool {
        self.from == UNKNOWN_ADDRESS || self.to == UNKNOWN_ADDRESS
    }
}

/// One row of a persisted path dataset.
///
/// `methods_str` is the `|`-joined method sequence; every other column is
/// kept verbatim in `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub tx_hash: String,

    #[serde(default, deserialize_with = "text_or_empty")]
    pub path_id: String,

    #[serde(default, alias = "methods", deserialize_with = "text_or_empty")]
    pub methods_str: String,

    #[serde(flatten)]
    pub metadata: Metadata,
}

impl PathRecord {
    pub fn new(
        tx_hash: impl Into<String>,
        path_id: impl Into<String>,
        methods_str: impl Into<String>,
    ) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            path_id: path_id.into(),
            methods_str: methods_str.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Method sequence of this path, in call order
    pub fn methods(&self) -> Vec<String> {
        split_methods(&self.methods_str)
    }

    /// Payload copied onto the leaf node that this path terminates at
    pub fn leaf_metadata(&self) -> Metadata {
        let mut payload = self.metadata.clone();
        payload.insert("path_id".to_string(), Value::from(self.path_id.clone()));
        payload.insert("tx_hash".to_string(), Value::from(self.tx_hash.clone()));
        payload.insert(
            "methods_str".to_string(),
            Value::from(self.methods_str.clone()),
        );
        payload
    }
}

/// Split a `|`-joined method sequence, dropping blanks and null markers
pub fn split_methods(methods_str: &str) -> Vec<String> {
    let trimmed = methods_str.trim();
    if is_null_marker(trimmed) {
        return Vec::new();
    }

    trimmed
        .split(METHOD_SEPARATOR)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_null_marker(text: &str) -> bool {
    let lowered = text.to_lowercase();
    NULL_MARKERS.contains(&lowered.as_str())
}

fn unknown_address() -> String {
    UNKNOWN_ADDRESS.to_string()
}

fn zero_value() -> String {
    "0".to_string()
}

/// Render a path identifier given as a JSON string or number
pub(crate) fn scalar_id(value: &Value) -> Option<String> {
    scalar_text(value.clone())
}

/// Render a scalar JSON value as text; `None` for null/blank/containers
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// First candidate holding a non-blank scalar
fn first_text<const N: usize>(candidates: [Option<Value>; N]) -> Option<String> {
    candidates.into_iter().flatten().find_map(scalar_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_addresses_become_unknown() {
        let record: CallRecord = serde_json::from_value(json!({
            "to": null,
            "method": "transfer"
        }))
        .unwrap();

        assert_eq!(record.from, "unknown");
        assert_eq!(record.to, "unknown");
        assert_eq!(record.value, "0");
        assert!(record.is_malformed());
    }

    #[test]
    fn test_field_aliases() {
        let record: CallRecord = serde_json::from_value(json!({
            "from_address": "0xA",
            "to_address": "0xB",
            "method_id": "0xa9059cbb",
            "value": 15
        }))
        .unwrap();

        assert_eq!(record, CallRecord::new("0xA", "0xB", "0xa9059cbb", "15"));
        assert!(!record.is_malformed());
    }

    #[test]
    fn test_name_and_selector_together() {
        let record: CallRecord = serde_json::from_value(json!({
            "from": "0xA",
            "from_address": "0xA",
            "to": "0xB",
            "to_address": "0xB",
            "method": "transfer",
            "method_id": "0xa9059cbb"
        }))
        .unwrap();

        assert_eq!(record, CallRecord::new("0xA", "0xB", "transfer", "0"));
    }

    #[test]
    fn test_blank_method_falls_back_to_selector() {
        let record: CallRecord = serde_json::from_value(json!({
            "from": "0xA",
            "to": "0xB",
            "method": "",
            "method_id": "0xa9059cbb"
        }))
        .unwrap();

        assert_eq!(record.method, "0xa9059cbb");
    }

    #[test]
    fn test_split_methods() {
        assert_eq!(split_methods("f1| f2 ||f3"), vec!["f1", "f2", "f3"]);
        assert!(split_methods("").is_empty());
        assert!(split_methods("nan").is_empty());
        assert!(split_methods("None").is_empty());
    }

    #[test]
    fn test_path_record_keeps_extra_columns() {
        let record: PathRecord = serde_json::from_value(json!({
            "tx_hash": "0xabc",
            "path_id": 7,
            "methods_str": "f1|f2",
            "label": 1,
            "event_name": "exploit"
        }))
        .unwrap();

        assert_eq!(record.path_id, "7");
        assert_eq!(record.methods(), vec!["f1", "f2"]);
        assert_eq!(record.metadata["label"], json!(1));

        let leaf = record.leaf_metadata();
        assert_eq!(leaf["path_id"], json!("7"));
        assert_eq!(leaf["event_name"], json!("exploit"));
    }
}
