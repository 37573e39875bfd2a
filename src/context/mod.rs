//! Context extraction around suspicious paths.
//!
//! Two flavours over the same transaction tree:
//! - `neighborhood`: every node within k hops of the path
//! - `expansion`: new paths grown from the path, layer by layer

pub mod connections;
pub mod expansion;
pub mod neighborhood;
pub mod schema;

pub use connections::{AllPairsPrefix, PathConnector};
pub use expansion::GeneratedPath;
pub use neighborhood::{neighbors_by_distance, neighbors_within};
pub use schema::{
    ExpansionContext, ExpansionNodeDetail, LayerStatistics, NodeDetail, NodeSummary, PathContext,
    PathDetail,
};
