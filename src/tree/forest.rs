//! One insertion tree per transaction, built and queried across a dataset.

use super::trie::{TransactionTree, TreeStatistics};
use crate::context::{ExpansionContext, PathContext};
use crate::parser::schema::PathRecord;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Suspicious path ids grouped by the dataset they were selected from
pub type SuspiciousSelection = BTreeMap<String, Vec<String>>;

/// Expansion contexts grouped by source dataset, then by path id
pub type SourceContexts = BTreeMap<String, BTreeMap<String, ExpansionContext>>;

/// Neighborhood contexts grouped by source dataset, then by path id
pub type SourceNeighborhoods = BTreeMap<String, BTreeMap<String, PathContext>>;

/// All transaction trees of a path dataset, keyed by tx hash
#[derive(Debug, Clone, Default)]
pub struct CallForest {
    trees: BTreeMap<String, TransactionTree>,
}

/// Totals across every tree of a forest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalStatistics {
    pub total_transactions: usize,
    pub total_nodes: usize,
    pub total_paths: usize,
    pub total_suspicious_paths: usize,
    pub max_depth: i32,
    pub avg_nodes_per_tx: f64,
    pub avg_paths_per_tx: f64,
}

impl CallForest {
    /// Group rows by `tx_hash` and build each transaction's tree
    ///
    /// Rows keep their dataset order within a transaction. Trees are built
    /// on the rayon pool, one worker per transaction.
    pub fn build(records: &[PathRecord]) -> Self {
        info!("Building transaction trees from {} path rows", records.len());

        let mut grouped: BTreeMap<&str, Vec<&PathRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.tx_hash.as_str()).or_default().push(record);
        }

        let trees: BTreeMap<String, TransactionTree> = grouped
            .into_par_iter()
            .map(|(tx_hash, rows)| {
                let tree = TransactionTree::from_records(tx_hash, rows);
                (tx_hash.to_string(), tree)
            })
            .collect();

        info!("Built {} transaction trees", trees.len());
        Self { trees }
    }

    /// Mark every selected id in each tree that knows it
    ///
    /// Returns the number of (tree, path) markings made.
    pub fn mark_suspicious(&mut self, selection: &SuspiciousSelection) -> usize {
        let total: usize = self
            .trees
            .par_iter_mut()
            .map(|(_, tree)| {
                let known: Vec<String> = selection
                    .values()
                    .flatten()
                    .filter(|id| tree.contains_path(id))
                    .cloned()
                    .collect();

                if known.is_empty() {
                    return 0;
                }
                tree.mark_suspicious(&known);
                known.len()
            })
            .sum();

        info!("Marked {} suspicious paths", total);
        total
    }

    /// Mark the selection, then expand every selected path by `k` layers
    ///
    /// Each context is tagged with its transaction and source. Ids found in
    /// no tree are logged and left out.
    pub fn extract_path_contexts(&mut self, selection: &SuspiciousSelection, k: usize) -> SourceContexts {
        info!("Extracting path contexts with k={}", k);
        self.mark_suspicious(selection);

        let mut all_contexts = SourceContexts::new();
        for (source, path_ids) in selection {
            let file_contexts: BTreeMap<String, ExpansionContext> = path_ids
                .par_iter()
                .filter_map(|path_id| {
                    let Some(tree) = self.find_path(path_id) else {
                        warn!("Path {} not found in any transaction tree", path_id);
                        return None;
                    };

                    let mut context = tree.expand_for(path_id, k)?;
                    context.tx_hash = Some(tree.tx_hash().to_string());
                    context.source_file = Some(source.clone());
                    debug!(
                        "{}: k={} expanded to {} paths",
                        path_id, k, context.layer_statistics.total_paths
                    );
                    Some((path_id.clone(), context))
                })
                .collect();

            if !file_contexts.is_empty() {
                info!("{}: {} path contexts", source, file_contexts.len());
                all_contexts.insert(source.clone(), file_contexts);
            }
        }

        let total: usize = all_contexts.values().map(BTreeMap::len).sum();
        info!("Extracted {} path contexts", total);
        all_contexts
    }

    /// Mark the selection, then build every k-hop neighborhood context
    ///
    /// Grouped like `extract_path_contexts`. An id known to several trees
    /// takes the context of the first tree in tx hash order.
    pub fn neighborhood_contexts(&mut self, selection: &SuspiciousSelection, k: usize) -> SourceNeighborhoods {
        info!("Extracting neighborhood contexts with k={}", k);
        self.mark_suspicious(selection);

        let found: Vec<(String, PathContext)> = self
            .trees
            .par_iter()
            .flat_map_iter(|(_, tree)| tree.all_suspicious_contexts(k))
            .collect();

        let mut by_path: HashMap<String, PathContext> = HashMap::with_capacity(found.len());
        for (path_id, context) in found {
            by_path.entry(path_id).or_insert(context);
        }

        let mut all_contexts = SourceNeighborhoods::new();
        for (source, path_ids) in selection {
            let mut file_contexts = BTreeMap::new();
            for path_id in path_ids {
                let Some(context) = by_path.get(path_id) else {
                    warn!("Path {} not found in any transaction tree", path_id);
                    continue;
                };
                let mut context = context.clone();
                context.source_file = Some(source.clone());
                file_contexts.insert(path_id.clone(), context);
            }

            if !file_contexts.is_empty() {
                info!("{}: {} neighborhood contexts", source, file_contexts.len());
                all_contexts.insert(source.clone(), file_contexts);
            }
        }

        all_contexts
    }

    /// First tree (in tx hash order) that knows `path_id`
    pub fn find_path(&self, path_id: &str) -> Option<&TransactionTree> {
        self.trees.values().find(|tree| tree.contains_path(path_id))
    }

    pub fn tree(&self, tx_hash: &str) -> Option<&TransactionTree> {
        self.trees.get(tx_hash)
    }

    pub fn trees(&self) -> impl Iterator<Item = &TransactionTree> {
        self.trees.values()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Totals across all trees; `None` for an empty forest
    pub fn global_statistics(&self) -> Option<GlobalStatistics> {
        if self.trees.is_empty() {
            return None;
        }

        let stats: Vec<TreeStatistics> = self.trees.values().map(TransactionTree::statistics).collect();
        let total_nodes: usize = stats.iter().map(|s| s.total_nodes).sum();
        let total_paths: usize = stats.iter().map(|s| s.total_paths).sum();
        let tx_count = stats.len() as f64;

        Some(GlobalStatistics {
            total_transactions: stats.len(),
            total_nodes,
            total_paths,
            total_suspicious_paths: stats.iter().map(|s| s.suspicious_paths).sum(),
            max_depth: stats.iter().map(|s| s.max_depth).max().unwrap_or(0),
            avg_nodes_per_tx: total_nodes as f64 / tx_count,
            avg_paths_per_tx: total_paths as f64 / tx_count,
        })
    }
}
