//! Utility modules for configuration and error handling.

pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{AnalysisConfig, ScoringWeights};
pub use error::{OutputError, ParseError};
