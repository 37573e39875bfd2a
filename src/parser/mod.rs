//! Input parsing and record definitions.
//!
//! This module handles:
//! - Flat call records (and nested hierarchies flattened into them)
//! - Persisted path dataset rows
//! - Suspicious path selections from the ranking stage

pub mod call_records;
pub mod dataset;
pub mod schema;

// Re-export main types
pub use call_records::{flatten_hierarchy, parse_call_graph, parse_call_records};
pub use dataset::{parse_path_dataset, parse_suspicious_map};
pub use schema::{split_methods, CallRecord, Metadata, PathRecord};
