//! Value tree to binary CBOR.
//!
//! Heads use the shortest form. Chunked strings are written back as
//! indefinite-length strings; doubles use single precision when that is
//! lossless.

use thiserror::Error;

use crate::constants::*;
use crate::node::{NodeId, Value};
use crate::tree::Tree;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("node {id} has unknown kind code {code}")]
    InvalidKind { id: NodeId, code: u8 },
    #[error("map {id} holds {length} items, not a whole number of pairs")]
    OddSizeMap { id: NodeId, length: usize },
    #[error("tag {id} wraps {children} values, expected exactly one")]
    TagArity { id: NodeId, children: usize },
    #[error("integer at {id} is outside -2^64..=2^64-1")]
    IntegerOutOfRange { id: NodeId },
}

/// Writes a major type head with argument `n`.
pub fn write_head(out: &mut Vec<u8>, major: u8, n: u64) {
    let major_bits = major << 5;
    if n <= 23 {
        out.push(major_bits | (n as u8));
    } else if n <= 0xff {
        out.push(major_bits | AI_ONE_BYTE);
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(major_bits | AI_TWO_BYTES);
        out.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        out.push(major_bits | AI_FOUR_BYTES);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        out.push(major_bits | AI_EIGHT_BYTES);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

enum Step {
    Enter(NodeId),
    Break,
}

pub fn encode(tree: &Tree<'_>, root: NodeId) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    encode_into(tree, root, &mut out)?;
    Ok(out)
}

/// Appends the encoding of `root` to `out`.
pub fn encode_into(tree: &Tree<'_>, root: NodeId, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let mut steps = vec![Step::Enter(root)];
    while let Some(step) = steps.pop() {
        let id = match step {
            Step::Break => {
                out.push(BREAK);
                continue;
            }
            Step::Enter(id) => id,
        };
        let Some(node) = tree.get(id) else {
            continue;
        };
        let mut indefinite = false;
        match &node.value {
            Value::Uint(u) => write_head(out, MAJOR_UNSIGNED, *u),
            Value::Int(i) => {
                let (major, n) = if *i >= 0 {
                    (MAJOR_UNSIGNED, *i)
                } else {
                    (MAJOR_NEGATIVE, -1 - *i)
                };
                let n = u64::try_from(n).map_err(|_| EncodeError::IntegerOutOfRange { id })?;
                write_head(out, major, n);
            }
            Value::Double(d) => write_double(out, *d),
            Value::Bytes(b) => {
                write_head(out, MAJOR_BYTES, b.len() as u64);
                out.extend_from_slice(b);
            }
            Value::Text(b) => {
                write_head(out, MAJOR_TEXT, b.len() as u64);
                out.extend_from_slice(b);
            }
            Value::BytesChunked => {
                out.push((MAJOR_BYTES << 5) | AI_INDEFINITE);
                indefinite = true;
            }
            Value::TextChunked => {
                out.push((MAJOR_TEXT << 5) | AI_INDEFINITE);
                indefinite = true;
            }
            Value::Array => write_head(out, MAJOR_ARRAY, node.length as u64),
            Value::Map => {
                if node.length % 2 != 0 {
                    return Err(EncodeError::OddSizeMap {
                        id,
                        length: node.length,
                    });
                }
                write_head(out, MAJOR_MAP, (node.length / 2) as u64);
            }
            Value::Tag(tag) => {
                if node.length != 1 {
                    return Err(EncodeError::TagArity {
                        id,
                        children: node.length,
                    });
                }
                write_head(out, MAJOR_TAG, *tag);
            }
            Value::False => out.push((MAJOR_SIMPLE << 5) | SIMPLE_FALSE),
            Value::True => out.push((MAJOR_SIMPLE << 5) | SIMPLE_TRUE),
            Value::Null => out.push((MAJOR_SIMPLE << 5) | SIMPLE_NULL),
            Value::Undefined => out.push((MAJOR_SIMPLE << 5) | SIMPLE_UNDEFINED),
            Value::Simple(v) => write_head(out, MAJOR_SIMPLE, u64::from(*v)),
            Value::Invalid(code) => return Err(EncodeError::InvalidKind { id, code: *code }),
        }
        if indefinite {
            steps.push(Step::Break);
        }
        if node.kind().is_container() {
            let children: Vec<NodeId> = tree.children(id).collect();
            steps.extend(children.into_iter().rev().map(Step::Enter));
        }
    }
    Ok(())
}

fn write_double(out: &mut Vec<u8>, value: f64) {
    if is_f32_roundtrip(value) {
        out.push(0xfa);
        out.extend_from_slice(&(value as f32).to_bits().to_be_bytes());
    } else {
        out.push(0xfb);
        out.extend_from_slice(&value.to_bits().to_be_bytes());
    }
}
