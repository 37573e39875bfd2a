//! Output writers for rankings, reports and contexts.
//!
//! - JSON files (pretty)
//! - Text summaries for the terminal

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{read_json, write_json};
pub use text::{format_path_context, ranking_summary};
