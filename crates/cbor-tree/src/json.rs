//! Projection of a value tree onto `serde_json::Value`.

use std::vec;

use serde_json::{Map, Number, Value as Json};
use thiserror::Error;

use crate::node::{Kind, NodeId, Value};
use crate::tree::Tree;

/// Deepest container nesting accepted. The walk itself is iterative; the
/// bound keeps the resulting `serde_json::Value` (whose drop and
/// serialization recurse) shallow.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("map key at {id} is not a text string")]
    NonTextKey { id: NodeId },
    #[error("text at {id} is not valid UTF-8")]
    InvalidUtf8 { id: NodeId },
    #[error("value at {id} is not representable in JSON")]
    NonFinite { id: NodeId },
    #[error("{kind} value at {id} has no JSON equivalent")]
    Unsupported { id: NodeId, kind: Kind },
    #[error("nesting exceeds {MAX_DEPTH} levels")]
    TooDeep,
}

/// A container whose children are still being converted.
enum Frame {
    Array {
        items: Vec<Json>,
        rest: vec::IntoIter<NodeId>,
    },
    Object {
        entries: Map<String, Json>,
        key: Option<String>,
        rest: vec::IntoIter<(NodeId, NodeId)>,
    },
    Tag {
        content: Option<Json>,
        child: Option<NodeId>,
    },
}

impl Frame {
    fn accept(&mut self, value: Json) {
        match self {
            Frame::Array { items, .. } => items.push(value),
            Frame::Object { entries, key, .. } => {
                if let Some(key) = key.take() {
                    entries.insert(key, value);
                }
            }
            Frame::Tag { content, .. } => *content = Some(value),
        }
    }

    fn next_child(&mut self, tree: &Tree<'_>) -> Result<Option<NodeId>, JsonError> {
        Ok(match self {
            Frame::Array { rest, .. } => rest.next(),
            Frame::Object { key, rest, .. } => match rest.next() {
                Some((k, v)) => {
                    *key = Some(text_key(tree, k)?);
                    Some(v)
                }
                None => None,
            },
            Frame::Tag { child, .. } => child.take(),
        })
    }

    fn finish(self) -> Json {
        match self {
            Frame::Array { items, .. } => Json::Array(items),
            Frame::Object { entries, .. } => Json::Object(entries),
            Frame::Tag { content, .. } => content.unwrap_or(Json::Null),
        }
    }
}

/// Converts the subtree at `root`. Byte strings become arrays of numbers,
/// tags are dropped in favour of their content and undefined becomes null.
pub fn to_json(tree: &Tree<'_>, root: NodeId) -> Result<Json, JsonError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut done = open(tree, root, &mut stack)?;
    loop {
        let Some(frame) = stack.last_mut() else {
            return Ok(done.unwrap_or(Json::Null));
        };
        if let Some(value) = done.take() {
            frame.accept(value);
        }
        match frame.next_child(tree)? {
            Some(child) => done = open(tree, child, &mut stack)?,
            None => done = stack.pop().map(Frame::finish),
        }
    }
}

/// Converts a scalar directly, or pushes a frame for a container and
/// returns `None`.
fn open(tree: &Tree<'_>, id: NodeId, stack: &mut Vec<Frame>) -> Result<Option<Json>, JsonError> {
    let Some(node) = tree.get(id) else {
        return Ok(Some(Json::Null));
    };
    let frame = match &node.value {
        Value::Array => Frame::Array {
            items: Vec::with_capacity(node.length),
            rest: tree.children(id).collect::<Vec<_>>().into_iter(),
        },
        Value::Map => Frame::Object {
            entries: Map::new(),
            key: None,
            rest: tree.pairs(id).collect::<Vec<_>>().into_iter(),
        },
        Value::Tag(_) => Frame::Tag {
            content: None,
            child: node.first_child,
        },
        scalar => return scalar_to_json(tree, id, scalar).map(Some),
    };
    if stack.len() >= MAX_DEPTH {
        return Err(JsonError::TooDeep);
    }
    stack.push(frame);
    Ok(None)
}

fn scalar_to_json(tree: &Tree<'_>, id: NodeId, value: &Value<'_>) -> Result<Json, JsonError> {
    Ok(match value {
        Value::Null | Value::Undefined => Json::Null,
        Value::True => Json::Bool(true),
        Value::False => Json::Bool(false),
        Value::Uint(u) => Json::Number(Number::from(*u)),
        Value::Int(i) => {
            let i = i64::try_from(*i).map_err(|_| JsonError::Unsupported {
                id,
                kind: Kind::Int,
            })?;
            Json::Number(Number::from(i))
        }
        Value::Double(d) => Number::from_f64(*d)
            .map(Json::Number)
            .ok_or(JsonError::NonFinite { id })?,
        Value::Text(b) => Json::String(utf8(id, b)?),
        Value::Bytes(b) => bytes_to_json(b),
        Value::TextChunked => {
            let mut text = String::new();
            for chunk in tree.children(id) {
                if let Some(b) = tree.get(chunk).and_then(|n| n.value.as_bytes()) {
                    text.push_str(&utf8(chunk, b)?);
                }
            }
            Json::String(text)
        }
        Value::BytesChunked => {
            let bytes: Vec<u8> = tree
                .children(id)
                .filter_map(|c| tree.get(c).and_then(|n| n.value.as_bytes()))
                .flatten()
                .copied()
                .collect();
            bytes_to_json(&bytes)
        }
        Value::Simple(_) | Value::Invalid(_) | Value::Array | Value::Map | Value::Tag(_) => {
            return Err(JsonError::Unsupported {
                id,
                kind: value.kind(),
            })
        }
    })
}

fn text_key(tree: &Tree<'_>, id: NodeId) -> Result<String, JsonError> {
    match tree.get(id).map(|n| &n.value) {
        Some(Value::Text(b)) => utf8(id, b),
        _ => Err(JsonError::NonTextKey { id }),
    }
}

fn utf8(id: NodeId, bytes: &[u8]) -> Result<String, JsonError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| JsonError::InvalidUtf8 { id })
}

fn bytes_to_json(bytes: &[u8]) -> Json {
    Json::Array(bytes.iter().map(|b| Json::Number(Number::from(*b))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::decode::decode;
    use serde_json::json;

    #[test]
    fn built_document_projects_to_json() {
        let built = build(r#"{"a": 1, "b": [true, false, null, -2, "x"]}"#).unwrap();
        assert_eq!(
            to_json(&built.tree, built.root).unwrap(),
            json!({"a": 1, "b": [true, false, null, -2, "x"]})
        );
    }

    #[test]
    fn chunked_strings_are_joined() {
        let decoded = decode(b"\x82\x7f\x61a\x62bc\xff\x5f\x41\x01\x41\x02\xff").unwrap();
        assert_eq!(
            to_json(&decoded.tree, decoded.root).unwrap(),
            json!(["abc", [1, 2]])
        );
    }

    #[test]
    fn tags_unwrap_and_undefined_is_null() {
        let decoded = decode(b"\x82\xc1\x01\xf7").unwrap();
        assert_eq!(to_json(&decoded.tree, decoded.root).unwrap(), json!([1, null]));
    }

    #[test]
    fn integer_keys_are_rejected() {
        let decoded = decode(b"\xa1\x01\x02").unwrap();
        assert!(matches!(
            to_json(&decoded.tree, decoded.root),
            Err(JsonError::NonTextKey { .. })
        ));
    }

    fn nested_arrays(depth: usize) -> Vec<u8> {
        let mut bytes = vec![0x81; depth];
        bytes.push(0x00);
        bytes
    }

    #[test]
    fn deep_nesting_is_refused() {
        let bytes = nested_arrays(MAX_DEPTH + 1);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(to_json(&decoded.tree, decoded.root), Err(JsonError::TooDeep));
    }

    #[test]
    fn nesting_at_the_limit_fits_a_small_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(2 << 20)
            .spawn(|| {
                let bytes = nested_arrays(MAX_DEPTH);
                let decoded = decode(&bytes).unwrap();
                let json = to_json(&decoded.tree, decoded.root).unwrap();
                let mut depth = 0;
                let mut curr = &json;
                while let Json::Array(items) = curr {
                    depth += 1;
                    curr = &items[0];
                }
                assert_eq!(depth, MAX_DEPTH);
                assert_eq!(curr, &json!(0));
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn dangling_map_key_is_skipped() {
        let built = build(r#"{"a": 1, "b"}"#).unwrap();
        assert_eq!(to_json(&built.tree, built.root).unwrap(), json!({"a": 1}));
    }
}
