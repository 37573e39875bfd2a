//! Rebuild a call hierarchy from an ordered list of flat call records.
//!
//! Nesting is decided only by comparing a record's `from` with the
//! immediately preceding record's `to`. The full ancestor stack is never
//! consulted, so a call returning to a grandparent frame starts a new root
//! tree instead of re-attaching. Downstream datasets were built on this
//! shape; keep it.

use super::arena::CallTree;
use super::node::NodeId;
use crate::parser::schema::CallRecord;
use crate::utils::config::VIRTUAL_ROOT_METHOD;
use log::debug;

/// Reconstruct the call tree of one transaction
///
/// **Public** - main entry point for the flat-sequence reconstructor
///
/// # Algorithm
/// 1. The first record starts a root at depth 0 and becomes the cursor
/// 2. A record whose `from` equals the previous record's `to`
///    (case-insensitive) opens a sibling run: the maximal consecutive
///    records sharing its `from` all become children of the cursor, and
///    the last of them becomes the new cursor
/// 3. Any other record starts a new root tree and becomes the cursor
/// 4. Several root trees are wrapped under a `virtual_root` at depth -1,
///    shifting every real node one level deeper
///
/// # Returns
/// `None` for an empty record list
pub fn reconstruct(records: &[CallRecord]) -> Option<CallTree> {
    if records.is_empty() {
        return None;
    }

    let mut tree = CallTree::new();
    let mut roots: Vec<NodeId> = Vec::new();
    let mut current_parent = push_call(&mut tree, records, 0, 0, None);
    roots.push(current_parent);

    let mut i = 1;
    while i < records.len() {
        let call = &records[i];

        if same_address(&call.from, &records[i - 1].to) {
            let child_depth = tree.at(current_parent).depth + 1;

            let mut j = i;
            while j < records.len() && same_address(&records[j].from, &call.from) {
                j += 1;
            }

            let mut last_sibling = current_parent;
            for index in i..j {
                last_sibling = push_call(&mut tree, records, index, child_depth, Some(current_parent));
            }

            current_parent = last_sibling;
            i = j;
        } else {
            current_parent = push_call(&mut tree, records, i, 0, None);
            roots.push(current_parent);
            i += 1;
        }
    }

    if roots.len() == 1 {
        tree.set_root(roots[0]);
    } else {
        wrap_in_virtual_root(&mut tree, &roots);
    }

    debug!(
        "Reconstructed {} nodes in {} root tree(s) from {} records",
        tree.len() - usize::from(roots.len() > 1),
        roots.len(),
        records.len()
    );

    Some(tree)
}

/// Create a node for `records[index]`
///
/// **Private** - internal helper for reconstruct
fn push_call(
    tree: &mut CallTree,
    records: &[CallRecord],
    index: usize,
    depth: i32,
    parent: Option<NodeId>,
) -> NodeId {
    let record = &records[index];
    let id = tree.add_node(record.method.clone(), depth, parent);
    let node = tree.node_mut(id);
    node.call = Some(record.clone());
    node.call_index = Some(index);
    id
}

/// Shift every node one level down and hang the roots under a synthetic node
///
/// **Private** - internal helper for reconstruct
fn wrap_in_virtual_root(tree: &mut CallTree, roots: &[NodeId]) {
    let real_nodes = tree.len();
    for id in 0..real_nodes {
        tree.node_mut(id).depth += 1;
    }

    let virtual_root = tree.add_node(VIRTUAL_ROOT_METHOD, -1, None);
    for &root in roots {
        tree.node_mut(root).parent = Some(virtual_root);
    }
    tree.node_mut(virtual_root).children = roots.to_vec();
    tree.set_root(virtual_root);
}

fn same_address(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(from: &str, to: &str, method: &str) -> CallRecord {
        CallRecord::new(from, to, method, "0")
    }

    #[test]
    fn test_empty_input_yields_no_tree() {
        assert!(reconstruct(&[]).is_none());
    }

    #[test]
    fn test_single_record_is_bare_root() {
        let tree = reconstruct(&[call("A", "B", "f1")]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), Some(0));
        assert!(!tree.has_virtual_root());
    }

    #[test]
    fn test_address_match_is_case_insensitive() {
        let tree = reconstruct(&[call("A", "0xAbC", "f1"), call("0xabc", "D", "f2")]).unwrap();
        assert_eq!(tree.root(), Some(0));
        assert_eq!(tree.children(0), &[1]);
    }

    #[test]
    fn test_sibling_run_moves_cursor_to_last_sibling() {
        // B calls C, D and E in a row; E's callee F then nests under E
        let records = vec![
            call("A", "B", "enter"),
            call("B", "C", "s1"),
            call("B", "D", "s2"),
            call("B", "E", "s3"),
            call("E", "F", "deep"),
        ];
        let tree = reconstruct(&records).unwrap();

        assert_eq!(tree.children(0), &[1, 2, 3]);
        assert_eq!(tree.children(3), &[4]);
        assert_eq!(tree.at(4).depth, 2);
        assert_eq!(tree.at(4).call_index, Some(4));
    }

    #[test]
    fn test_return_to_grandparent_starts_new_root() {
        let records = vec![
            call("A", "B", "f1"),
            call("B", "C", "f2"),
            call("A", "D", "f3"),
        ];
        let tree = reconstruct(&records).unwrap();

        assert!(tree.has_virtual_root());
        assert_eq!(tree.top_level_roots(), vec![0, 2]);
    }

    #[test]
    fn test_virtual_root_shifts_depths() {
        let records = vec![call("A", "B", "f1"), call("X", "Y", "g1"), call("Y", "Z", "g2")];
        let tree = reconstruct(&records).unwrap();
        let root = tree.root().unwrap();

        assert_eq!(tree.at(root).method, "virtual_root");
        assert_eq!(tree.at(root).depth, -1);
        // every real node moves down by exactly one level
        assert_eq!(tree.at(0).depth, 1);
        assert_eq!(tree.at(1).depth, 1);
        assert_eq!(tree.at(2).depth, 2);
        assert_eq!(tree.parent(0), Some(root));
    }
}
