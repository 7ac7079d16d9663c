//! Accessor properties over maps and arrays, checked against trees built
//! through the arena API and against bytes produced by an independent CBOR
//! encoder.

use std::collections::BTreeSet;

use cbor_tree::{array_index, decode, map_get_int, map_get_str, NodeId, Tree, Value};
use ciborium::value::{Integer, Value as Cbor};
use proptest::prelude::*;

/// Keys across the whole CBOR integer range: signed, large negative, and
/// unsigned beyond `i64::MAX`.
fn key_strategy() -> impl Strategy<Value = i128> {
    prop_oneof![
        any::<i64>().prop_map(i128::from),
        any::<u64>().prop_map(i128::from),
        (-(1i128 << 64))..0i128,
    ]
}

fn integer_value(key: i128) -> Value<'static> {
    match u64::try_from(key) {
        Ok(u) => Value::Uint(u),
        Err(_) => Value::Int(key),
    }
}

fn int_keyed_map(keys: &BTreeSet<i128>) -> (Tree<'static>, NodeId) {
    let mut tree = Tree::new();
    let map = tree.create_map().unwrap();
    for (i, key) in keys.iter().enumerate() {
        let k = tree.alloc(integer_value(*key)).unwrap();
        let v = tree.create_uint(i as u64).unwrap();
        tree.append_child(map, k).unwrap();
        tree.append_child(map, v).unwrap();
    }
    (tree, map)
}

fn cbor_int(key: i128) -> Cbor {
    Cbor::Integer(Integer::try_from(key).unwrap())
}

proptest! {
    #[test]
    fn map_get_int_finds_every_key(
        keys in prop::collection::btree_set(key_strategy(), 0..32),
        absent in key_strategy(),
    ) {
        let (tree, map) = int_keyed_map(&keys);
        for (i, key) in keys.iter().enumerate() {
            let found = map_get_int(&tree, Some(map), *key).unwrap();
            prop_assert_eq!(tree[found].value.as_integer(), Some(i as i128));
        }
        if !keys.contains(&absent) {
            prop_assert_eq!(map_get_int(&tree, Some(map), absent), None);
        }
    }

    #[test]
    fn map_get_int_on_decoded_bytes(
        keys in prop::collection::btree_set(key_strategy(), 1..16),
    ) {
        let pairs: Vec<(Cbor, Cbor)> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (cbor_int(*k), Cbor::Integer(Integer::from(i as u64))))
            .collect();
        let mut bytes = Vec::new();
        ciborium::into_writer(&Cbor::Map(pairs), &mut bytes).unwrap();
        let decoded = decode(&bytes).unwrap();
        for (i, key) in keys.iter().enumerate() {
            let found = map_get_int(&decoded.tree, Some(decoded.root), *key).unwrap();
            prop_assert_eq!(decoded.tree[found].value.as_integer(), Some(i as i128));
        }
    }

    #[test]
    fn array_index_matches_position(
        items in prop::collection::vec(any::<u64>(), 0..64),
        position in 0usize..80,
    ) {
        let mut tree = Tree::new();
        let array = tree.create_array().unwrap();
        for item in &items {
            let n = tree.create_uint(*item).unwrap();
            tree.array_append(array, n).unwrap();
        }
        let found = array_index(&tree, Some(array), position);
        match items.get(position) {
            Some(item) => {
                let id = found.unwrap();
                prop_assert_eq!(tree[id].value.as_integer(), Some(i128::from(*item)));
            }
            None => prop_assert_eq!(found, None),
        }
    }
}

#[test]
fn signed_and_unsigned_keys_compare_by_value() {
    let (tree, map) = int_keyed_map(&BTreeSet::from([-1, 0, u64::MAX as i128]));
    assert!(map_get_int(&tree, Some(map), -1i64).is_some());
    assert!(map_get_int(&tree, Some(map), 0u8).is_some());
    assert!(map_get_int(&tree, Some(map), u64::MAX).is_some());
    assert_eq!(map_get_int(&tree, Some(map), 1i64), None);
}

#[test]
fn odd_map_never_matches_dangling_key() {
    let mut tree = Tree::new();
    let map = tree.create_map().unwrap();
    let value = tree.create_uint(1).unwrap();
    tree.map_put_text(map, "a", value).unwrap();
    let dangling = tree.create_text("b").unwrap();
    tree.append_child(map, dangling).unwrap();
    assert_eq!(tree[map].length, 3);

    assert_eq!(map_get_str(&tree, Some(map), "a"), Some(value));
    assert_eq!(map_get_str(&tree, Some(map), "b"), None);
    assert_eq!(tree.pairs(map).count(), 1);
}

#[test]
fn odd_map_never_matches_dangling_int_key() {
    let mut tree = Tree::new();
    let map = tree.create_map().unwrap();
    let value = tree.create_uint(10).unwrap();
    tree.map_put_int(map, 1i64, value).unwrap();
    let dangling = tree.create_uint(5).unwrap();
    tree.append_child(map, dangling).unwrap();
    assert_eq!(tree[map].length, 3);

    assert_eq!(map_get_int(&tree, Some(map), 1i64), Some(value));
    assert_eq!(map_get_int(&tree, Some(map), 5i64), None);
    assert_eq!(map_get_int(&tree, Some(map), 10i64), None);
}

#[test]
fn accessors_tolerate_absent_and_wrong_kinds() {
    let mut tree = Tree::new();
    let scalar = tree.create_uint(7).unwrap();
    assert_eq!(map_get_int(&tree, None, 1i64), None);
    assert_eq!(map_get_str(&tree, Some(scalar), "a"), None);
    assert_eq!(array_index(&tree, None, 0), None);
    assert_eq!(array_index(&tree, Some(scalar), 0), None);
}

#[test]
fn text_and_byte_keys_both_match_by_content() {
    let pairs = vec![
        (Cbor::Bytes(b"k1".to_vec()), Cbor::Integer(1u8.into())),
        (Cbor::Text("k2".into()), Cbor::Integer(2u8.into())),
    ];
    let mut bytes = Vec::new();
    ciborium::into_writer(&Cbor::Map(pairs), &mut bytes).unwrap();
    let decoded = decode(&bytes).unwrap();
    let root = Some(decoded.root);
    let k1 = map_get_str(&decoded.tree, root, "k1").unwrap();
    let k2 = cbor_tree::map_get_bytes(&decoded.tree, root, b"k2").unwrap();
    assert_eq!(decoded.tree[k1].value.as_integer(), Some(1));
    assert_eq!(decoded.tree[k2].value.as_integer(), Some(2));
}
