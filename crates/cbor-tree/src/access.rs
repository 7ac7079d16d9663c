//! Read-only lookups over a node's children.
//!
//! None of these fail: an absent root, a stale id, a key of the wrong kind
//! or a map with a dangling trailing key all simply produce `None`.

use crate::node::{NodeId, Value};
use crate::tree::Tree;

/// Value paired with the integer key equal to `key`.
///
/// Unsigned and signed keys compare by numeric value, so `key` can be any
/// integer type up to `u64` or `i64`.
pub fn map_get_int(tree: &Tree<'_>, map: Option<NodeId>, key: impl Into<i128>) -> Option<NodeId> {
    let key = key.into();
    tree.pairs(map?).find_map(|(k, v)| {
        let matched = match tree.get(k)?.value {
            Value::Uint(u) => i128::from(u) == key,
            Value::Int(i) => i == key,
            _ => false,
        };
        matched.then_some(v)
    })
}

/// Value paired with the text or byte string key whose bytes equal `key`.
///
/// Text and byte string keys are interchangeable here.
pub fn map_get_bytes(tree: &Tree<'_>, map: Option<NodeId>, key: &[u8]) -> Option<NodeId> {
    tree.pairs(map?).find_map(|(k, v)| {
        let node = tree.get(k)?;
        match &node.value {
            Value::Text(b) | Value::Bytes(b) if node.length == key.len() && **b == *key => Some(v),
            _ => None,
        }
    })
}

pub fn map_get_str(tree: &Tree<'_>, map: Option<NodeId>, key: &str) -> Option<NodeId> {
    map_get_bytes(tree, map, key.as_bytes())
}

/// Element at `position`. Walks the sibling list, so this is O(position);
/// iterate with [`Tree::children`] instead of re-indexing in a loop.
pub fn array_index(tree: &Tree<'_>, array: Option<NodeId>, position: usize) -> Option<NodeId> {
    tree.children(array?).nth(position)
}
