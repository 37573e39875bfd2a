//! Path extraction from reconstructed call trees.
//!
//! - `extractor`: root-to-leaf enumeration
//! - `features`: per-path dataset rows

pub mod extractor;
pub mod features;

pub use extractor::{extract_all_paths, extract_paths, CallPath, PathStep};
pub use features::{extract_path_features, PathFeatures};
