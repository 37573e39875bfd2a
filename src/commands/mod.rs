//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod context;
pub mod models;
pub mod rank;
pub mod utils;

// Re-export main command functions
pub use context::{execute_context, validate_context_args, ContextReport};
pub use models::{ContextArgs, ContextMode, RankArgs};
pub use rank::{execute_rank, validate_rank_args};
pub use utils::{display_schema, display_version, load_config};
