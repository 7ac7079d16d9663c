//! Text builder: failure scenarios, rendering of built trees, trailing
//! content policy and allocation balance.

use cbor_tree::{
    build, build_range, build_with, map_get_int, map_get_str, to_diag, to_json, BuildError,
    BuildOptions, Kind, TrailingPolicy, TreeLimits, TreeError,
};
use serde_json::json;

#[test]
fn failure_scenarios() {
    let cases: &[(&str, BuildError)] = &[
        ("]", BuildError::Structure { pos: 0 }),
        ("[", BuildError::IncompleteStructure { pos: 1 }),
        ("\"abc", BuildError::UnterminatedLiteral { pos: 0 }),
        ("tru", BuildError::InvalidLiteral { pos: 0 }),
        ("[1, 2}", BuildError::Structure { pos: 5 }),
        ("{\"a\": [1}", BuildError::Structure { pos: 8 }),
        ("[nul]", BuildError::InvalidLiteral { pos: 1 }),
        ("[-]", BuildError::InvalidLiteral { pos: 1 }),
        ("[@]", BuildError::InvalidLiteral { pos: 1 }),
        ("18446744073709551616", BuildError::InvalidLiteral { pos: 0 }),
        ("[\"\\q\"]", BuildError::InvalidLiteral { pos: 1 }),
        ("[\"a\nb\"]", BuildError::InvalidLiteral { pos: 1 }),
        ("", BuildError::EmptyInput),
        (" \n, ", BuildError::EmptyInput),
    ];
    for (input, expected) in cases {
        assert_eq!(&build(input).unwrap_err(), expected, "input {input:?}");
    }
}

#[test]
fn rendering_reproduces_scalars_and_nesting() {
    let built = build(r#"{"a": 1, "b": [2, 3]}"#).unwrap();
    assert_eq!(
        to_diag(&built.tree, built.root),
        concat!(
            "{\n",
            "  \"a\"\n",
            "  1\n",
            "  \"b\"\n",
            "  [\n",
            "    2\n",
            "    3\n",
            "  ]\n",
            "}\n",
        )
    );
}

#[test]
fn literals_cover_the_integer_range() {
    let built = build("[-18446744073709551616, 18446744073709551615, -1, 0]").unwrap();
    let tree = &built.tree;
    let kinds: Vec<Kind> = tree.children(built.root).map(|c| tree[c].kind()).collect();
    assert_eq!(kinds, [Kind::Int, Kind::Uint, Kind::Int, Kind::Uint]);
    assert_eq!(
        to_diag(tree, built.root),
        "[\n  -18446744073709551616\n  18446744073709551615\n  -1\n  0\n]\n"
    );
}

#[test]
fn integer_keys_are_found_after_building() {
    let built = build(r#"{1: "one", -1: "minus one", 18446744073709551615: "max"}"#).unwrap();
    let root = Some(built.root);
    let tree = &built.tree;
    let minus_one = map_get_int(tree, root, -1i64).unwrap();
    assert_eq!(tree[minus_one].value.as_str(), Some("minus one"));
    let max = map_get_int(tree, root, u64::MAX).unwrap();
    assert_eq!(tree[max].value.as_str(), Some("max"));
    assert_eq!(map_get_int(tree, root, 2i64), None);
}

#[test]
fn escaped_strings_are_decoded_and_owned() {
    let built = build(r#"["plain", "tab\tquote\"uni\u00e9"]"#).unwrap();
    let tree = &built.tree;
    let items: Vec<_> = tree.children(built.root).collect();
    assert_eq!(tree[items[0]].value.as_str(), Some("plain"));
    assert_eq!(tree[items[1]].value.as_str(), Some("tab\tquote\"uni\u{e9}"));
    assert_eq!(tree.owned_bytes(), "tab\tquote\"uni\u{e9}".len());
}

#[test]
fn unpaired_map_key_is_kept_but_never_matched() {
    let built = build(r#"{"a"}"#).unwrap();
    assert_eq!(built.tree[built.root].length, 1);
    assert_eq!(map_get_str(&built.tree, Some(built.root), "a"), None);
}

#[test]
fn trailing_content_policy() {
    assert_eq!(
        build("1 2").unwrap_err(),
        BuildError::TrailingContent { pos: 2 }
    );
    assert_eq!(build("[] ]").unwrap_err(), BuildError::Structure { pos: 3 });

    let ignore = BuildOptions {
        trailing: TrailingPolicy::Ignore,
        ..BuildOptions::default()
    };
    let built = build_with("[1] garbage", &ignore).unwrap();
    assert_eq!(built.consumed, 3);
    assert_eq!(built.tree[built.root].length, 1);

    let built = build_with("7 8", &ignore).unwrap();
    assert_eq!(built.consumed, 1);
    assert_eq!(built.tree[built.root].value.as_integer(), Some(7));
}

#[test]
fn range_positions_are_absolute() {
    let input = "xx[1, tru]yy";
    let err = build_range(input, 2, 10, &BuildOptions::default()).unwrap_err();
    assert_eq!(err, BuildError::InvalidLiteral { pos: 6 });

    let built = build_range(input, 2, 5, &BuildOptions::default());
    assert_eq!(built.unwrap_err(), BuildError::IncompleteStructure { pos: 5 });

    assert_eq!(
        build_range(input, 4, 2, &BuildOptions::default()).unwrap_err(),
        BuildError::OutOfRange {
            start: 4,
            end: 2,
            len: input.len()
        }
    );
}

#[test]
fn node_limit_surfaces_as_allocation_error() {
    let options = BuildOptions {
        limits: TreeLimits::max_nodes(2),
        ..BuildOptions::default()
    };
    assert_eq!(
        build_with("[1, 2]", &options).unwrap_err(),
        BuildError::Allocation(TreeError::NodeLimit { limit: 2 })
    );
}

#[test]
fn free_returns_to_baseline() {
    let mut built = build(r#"{"k\n": ["a\"", {"b": [1, 2, "c\\"]}], "z": null}"#).unwrap();
    let live = built.tree.live_nodes();
    assert_eq!(live, 12);
    assert!(built.tree.owned_bytes() > 0);
    assert_eq!(built.tree.free(built.root), live);
    assert_eq!(built.tree.live_nodes(), 0);
    assert_eq!(built.tree.owned_bytes(), 0);
    assert_eq!(built.tree.free(built.root), 0);
}

#[test]
fn built_tree_projects_to_json() {
    let built = build(r#"{"a": [true, false, null], "b": {"c": -5}}"#).unwrap();
    assert_eq!(
        to_json(&built.tree, built.root).unwrap(),
        json!({"a": [true, false, null], "b": {"c": -5}})
    );
}
