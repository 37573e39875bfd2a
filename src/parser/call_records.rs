//! Parsing of flat call records and nested call hierarchies.
//!
//! Accepts the JSON shapes emitted by the upstream trace-normalization stage
//! and produces the ordered `CallRecord` lists the reconstructor consumes.

use super::schema::CallRecord;
use crate::utils::config::{CALL_LIST_FIELD_NAMES, HIERARCHY_FIELD_NAMES, UNKNOWN_ADDRESS};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse one transaction's ordered call records
///
/// Accepts a bare array or an object wrapping the array under one of
/// `calls`, `flat_calls` or `trace`.
///
/// An element that cannot be read as a record keeps its slot as an
/// all-`"unknown"` call.
///
/// # Errors
/// * `ParseError::InvalidFormat` - neither an array nor a wrapping object
pub fn parse_call_records(raw: &Value) -> Result<Vec<CallRecord>, ParseError> {
    let items = match raw {
        Value::Array(items) => items,
        Value::Object(obj) => CALL_LIST_FIELD_NAMES
            .iter()
            .find_map(|field| obj.get(*field).and_then(Value::as_array))
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Expected one of {:?} holding an array of calls",
                    CALL_LIST_FIELD_NAMES
                ))
            })?,
        _ => {
            return Err(ParseError::InvalidFormat(
                "Call records must be a JSON array or object".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<CallRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Call record {} is unreadable ({}), kept as an unknown call", index, e);
                records.push(CallRecord::new(UNKNOWN_ADDRESS, UNKNOWN_ADDRESS, "", "0"));
            }
        }
    }

    let malformed = records.iter().filter(|r| r.is_malformed()).count();
    if malformed > 0 {
        warn!(
            "{} of {} call records are missing an address, kept as \"unknown\"",
            malformed,
            records.len()
        );
    }

    debug!("Parsed {} call records", records.len());
    Ok(records)
}

/// Parse a multi-transaction call graph: `{ tx_hash: calls }`
///
/// Each entry is anything `parse_call_records` accepts, or an object
/// holding a nested hierarchy under `call_hierarchy` /
/// `rebuilt_call_hierarchy`, which is flattened first.
pub fn parse_call_graph(raw: &Value) -> Result<BTreeMap<String, Vec<CallRecord>>, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Call graph must be an object keyed by tx hash".to_string())
    })?;

    let mut graph = BTreeMap::new();
    for (tx_hash, calls) in obj {
        let hierarchy = HIERARCHY_FIELD_NAMES
            .iter()
            .find_map(|field| calls.get(*field).filter(|h| h.is_object()));

        let records = match hierarchy {
            Some(hierarchy) => flatten_hierarchy(hierarchy),
            None => parse_call_records(calls)?,
        };
        graph.insert(tx_hash.clone(), records);
    }

    debug!("Parsed call graph with {} transactions", graph.len());
    Ok(graph)
}

/// Flatten a nested `{from, to, method, value, children}` hierarchy
///
/// Pre-order walk. Nodes lacking either address are not emitted, but their
/// children still are.
pub fn flatten_hierarchy(hierarchy: &Value) -> Vec<CallRecord> {
    let mut flat = Vec::new();
    collect_calls(hierarchy, &mut flat);
    flat
}

fn collect_calls(node: &Value, flat: &mut Vec<CallRecord>) {
    let Some(obj) = node.as_object() else {
        return;
    };

    match serde_json::from_value::<CallRecord>(node.clone()) {
        Ok(record) if !record.is_malformed() => flat.push(record),
        Ok(_) => debug!("Hierarchy node without both addresses, descending only"),
        Err(e) => warn!("Skipping unreadable hierarchy node: {}", e),
    }

    if let Some(children) = obj.get("children").and_then(Value::as_array) {
        for child in children {
            collect_calls(child, flat);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wrapped_records() {
        let raw = json!({
            "flat_calls": [
                {"from": "A", "to": "B", "method": "f1"},
                {"from": "B", "method": "f2", "value": "0x10"}
            ]
        });

        let records = parse_call_records(&raw).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].to, "unknown");
        assert_eq!(records[1].value, "0x10");
    }

    #[test]
    fn test_unreadable_element_keeps_its_slot() {
        let raw = json!([
            {"from": "A", "to": "B", "method": "f1"},
            "garbage",
            {"from": "B", "to": "C", "method": "f2"}
        ]);

        let records = parse_call_records(&raw).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[1].is_malformed());
        assert_eq!(records[2].method, "f2");
    }

    #[test]
    fn test_parse_rejects_scalar() {
        assert!(parse_call_records(&json!(42)).is_err());
        assert!(parse_call_records(&json!({"steps": []})).is_err());
    }

    #[test]
    fn test_flatten_hierarchy_preorder() {
        let hierarchy = json!({
            "from": "EOA", "to": "A", "method": "root",
            "children": [
                {"from": "A", "to": "B", "method": "f1", "children": [
                    {"from": "B", "to": "C", "method": "f2"}
                ]},
                {"to": "D", "method": "anonymous", "children": [
                    {"from": "D", "to": "E", "method": "f3"}
                ]}
            ]
        });

        let methods: Vec<String> = flatten_hierarchy(&hierarchy)
            .into_iter()
            .map(|r| r.method)
            .collect();
        assert_eq!(methods, vec!["root", "f1", "f2", "f3"]);
    }

    #[test]
    fn test_flatten_nodes_with_selector_and_name() {
        let hierarchy = json!({
            "from": "EOA", "to": "Router", "method": "swap", "method_id": "0x022c0d9f",
            "children": [
                {"from_address": "Router", "to_address": "Token",
                 "method": "transfer", "method_id": "0xa9059cbb", "value": "0x0"}
            ]
        });

        let flat = flatten_hierarchy(&hierarchy);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].method, "swap");
        assert_eq!(flat[1], CallRecord::new("Router", "Token", "transfer", "0x0"));
    }

    #[test]
    fn test_call_graph_accepts_hierarchy_entries() {
        let raw = json!({
            "0xa": [{"from": "A", "to": "B", "method": "f1"}],
            "0xb": {"call_hierarchy": {
                "from": "A", "to": "B", "method": "g1",
                "children": [{"from": "B", "to": "C", "method": "g2"}]
            }}
        });

        let graph = parse_call_graph(&raw).unwrap();
        assert_eq!(graph["0xa"].len(), 1);
        assert_eq!(graph["0xb"].len(), 2);
        assert_eq!(graph["0xb"][1].method, "g2");
    }
}
