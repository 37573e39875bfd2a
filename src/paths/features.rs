//! Per-path feature rows, the shape persisted into path datasets.
//!
//! A row produced here is what the insertion builder later reads back as a
//! `PathRecord`.

use super::extractor::CallPath;
use crate::parser::schema::PathRecord;
use crate::utils::config::{METHOD_SEPARATOR, UNKNOWN_ADDRESS};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Hex characters kept from the path digest
const PATH_ID_LEN: usize = 16;

/// Address characters kept per step in `path_content`
const ADDRESS_PREFIX_LEN: usize = 10;

/// One step of a feature row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathNodeDetail {
    pub step: usize,
    pub from: String,
    pub to: String,
    pub method: String,
    pub depth: i32,
    pub call_type: String,
    pub value: String,
}

/// Descriptive features of one extracted path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathFeatures {
    pub path_id: String,
    pub tx_hash: String,
    pub path_length: usize,
    pub max_depth: i32,
    pub path_content: String,
    /// Non-empty methods in call order
    pub methods: Vec<String>,
    pub methods_str: String,
    pub unique_methods: Vec<String>,
    pub method_count: usize,
    pub addresses: Vec<String>,
    pub address_count: usize,
    /// Decimal sum of every parsable step value
    pub total_value: String,
    pub call_type_distribution: BTreeMap<String, usize>,
    pub contains_create: bool,
    pub contains_transfer: bool,
    pub contains_swap: bool,
    pub contains_approve: bool,
    pub path_nodes_detail: Vec<PathNodeDetail>,
    pub extraction_timestamp: String,
}

/// Compute the feature row of `path`
///
/// **Public** - dataset row builder
///
/// # Returns
/// `None` for an empty path
pub fn extract_path_features(path: &CallPath) -> Option<PathFeatures> {
    if path.is_empty() {
        return None;
    }

    let path_content = path
        .steps
        .iter()
        .map(|s| format!("{}:{}:{}", prefix(&s.from), prefix(&s.to), s.method))
        .collect::<Vec<_>>()
        .join("->");

    let methods: Vec<String> = path
        .steps
        .iter()
        .filter(|s| !s.method.is_empty())
        .map(|s| s.method.clone())
        .collect();
    let unique_methods: Vec<String> = methods.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();

    let addresses: Vec<String> = path
        .steps
        .iter()
        .flat_map(|s| [s.from.as_str(), s.to.as_str()])
        .filter(|a| !a.is_empty() && *a != UNKNOWN_ADDRESS)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut call_type_distribution = BTreeMap::new();
    for step in &path.steps {
        *call_type_distribution
            .entry(step.call_type.as_str().to_string())
            .or_insert(0) += 1;
    }

    let method_contains = |needle: &str| {
        path.steps
            .iter()
            .any(|s| s.method.to_lowercase().contains(needle))
    };

    let path_nodes_detail = path
        .steps
        .iter()
        .enumerate()
        .map(|(i, s)| PathNodeDetail {
            step: i + 1,
            from: s.from.clone(),
            to: s.to.clone(),
            method: s.method.clone(),
            depth: s.depth,
            call_type: s.call_type.as_str().to_string(),
            value: s.value.clone(),
        })
        .collect();

    Some(PathFeatures {
        path_id: path_id(&path.tx_hash, &path_content),
        tx_hash: path.tx_hash.clone(),
        path_length: path.len(),
        max_depth: path.steps.iter().map(|s| s.depth).max().unwrap_or(0),
        path_content,
        methods_str: methods.join(METHOD_SEPARATOR.to_string().as_str()),
        method_count: unique_methods.len(),
        unique_methods,
        methods,
        address_count: addresses.len(),
        addresses,
        total_value: total_value(path.steps.iter().map(|s| s.value.as_str())).to_string(),
        call_type_distribution,
        contains_create: method_contains("create"),
        contains_transfer: method_contains("transfer"),
        contains_swap: method_contains("swap"),
        contains_approve: method_contains("approve"),
        path_nodes_detail,
        extraction_timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

impl PathFeatures {
    /// Dataset row for the insertion builder; every feature but the step
    /// detail goes into metadata
    pub fn to_path_record(&self) -> PathRecord {
        PathRecord::new(&self.tx_hash, &self.path_id, &self.methods_str)
            .with_metadata("path_length", self.path_length)
            .with_metadata("max_depth", self.max_depth)
            .with_metadata("path_content", self.path_content.clone())
            .with_metadata("method_count", self.method_count)
            .with_metadata("address_count", self.address_count)
            .with_metadata("total_value", self.total_value.clone())
            .with_metadata("call_type_distribution", json!(self.call_type_distribution))
            .with_metadata("contains_create", self.contains_create)
            .with_metadata("contains_transfer", self.contains_transfer)
            .with_metadata("contains_swap", self.contains_swap)
            .with_metadata("contains_approve", self.contains_approve)
            .with_metadata("extraction_timestamp", self.extraction_timestamp.clone())
    }
}

/// First 16 hex chars of SHA-256 over `{tx_hash}_{path_content}`
pub fn path_id(tx_hash: &str, path_content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}_{}", tx_hash, path_content).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..PATH_ID_LEN].to_string()
}

/// Sum of decimal or `0x` hex values; anything else counts as zero
pub fn total_value<'a>(values: impl IntoIterator<Item = &'a str>) -> u128 {
    values
        .into_iter()
        .filter_map(parse_value)
        .fold(0u128, u128::saturating_add)
}

fn parse_value(value: &str) -> Option<u128> {
    if let Some(hex) = value.strip_prefix("0x") {
        return u128::from_str_radix(hex, 16).ok();
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse().ok();
    }
    None
}

fn prefix(address: &str) -> String {
    address.chars().take(ADDRESS_PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::CallRecord;
    use crate::paths::extractor::extract_paths;
    use crate::tree::reconstruct;

    fn sample_path() -> CallPath {
        let records = vec![
            CallRecord::new("0xattacker0000", "0xpool", "flashLoan", "0x10"),
            CallRecord::new("0xpool", "0xtoken", "transferFrom", "5"),
            CallRecord::new("0xtoken", "unknown", "", "oops"),
        ];
        let tree = reconstruct(&records).unwrap();
        extract_paths(&tree, "0xtx").remove(0)
    }

    #[test]
    fn test_path_id_is_stable_hex() {
        let a = path_id("0xtx", "a:b:c");
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, path_id("0xtx", "a:b:c"));
        assert_ne!(a, path_id("0xty", "a:b:c"));
    }

    #[test]
    fn test_total_value_skips_unparsable() {
        assert_eq!(total_value(["0x10", "5", "oops", "", "-3"]), 21);
    }

    #[test]
    fn test_features_of_path() {
        let features = extract_path_features(&sample_path()).unwrap();

        assert_eq!(features.path_length, 3);
        assert_eq!(features.methods, vec!["flashLoan", "transferFrom"]);
        assert_eq!(features.methods_str, "flashLoan|transferFrom");
        assert_eq!(features.address_count, 3);
        assert_eq!(features.total_value, "21");
        assert_eq!(features.max_depth, 2);
        assert!(features.contains_transfer);
        assert!(!features.contains_swap);
        assert_eq!(features.call_type_distribution["generic"], 2);
        assert!(features.path_content.starts_with("0xattacker:0xpool:flashLoan->"));
    }

    #[test]
    fn test_row_feeds_insertion_builder() {
        let features = extract_path_features(&sample_path()).unwrap();
        let record = features.to_path_record();

        assert_eq!(record.path_id, features.path_id);
        assert_eq!(record.methods(), vec!["flashLoan", "transferFrom"]);
        assert_eq!(record.metadata["contains_transfer"], json!(true));
    }
}
