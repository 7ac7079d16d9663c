//! Value nodes: the tagged unit of a CBOR value tree.
//!
//! Nodes live in a [`Tree`](crate::Tree) arena. Every structural link
//! (`first_child`, `last_child`, `next`, `parent`) is an `Option<NodeId>`
//! index into that arena rather than a pointer, so links can be rewired in
//! O(1) without any borrow juggling.

use std::borrow::Cow;
use std::fmt;

/// Stable index of a node inside its [`Tree`](crate::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind discriminator of a [`Value`].
///
/// The numeric codes are stable and appear in diagnostics for kinds the
/// renderer does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    False,
    True,
    Null,
    Undefined,
    Uint,
    Int,
    Bytes,
    Text,
    BytesChunked,
    TextChunked,
    Array,
    Map,
    Tag,
    Simple,
    Double,
    Invalid,
}

impl Kind {
    pub fn code(self) -> u8 {
        match self {
            Kind::False => 0,
            Kind::True => 1,
            Kind::Null => 2,
            Kind::Undefined => 3,
            Kind::Uint => 4,
            Kind::Int => 5,
            Kind::Bytes => 6,
            Kind::Text => 7,
            Kind::BytesChunked => 8,
            Kind::TextChunked => 9,
            Kind::Array => 10,
            Kind::Map => 11,
            Kind::Tag => 12,
            Kind::Simple => 13,
            Kind::Double => 14,
            Kind::Invalid => 16,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::False => "false",
            Kind::True => "true",
            Kind::Null => "null",
            Kind::Undefined => "undefined",
            Kind::Uint => "uint",
            Kind::Int => "int",
            Kind::Bytes => "bytes",
            Kind::Text => "text",
            Kind::BytesChunked => "bytes-chunked",
            Kind::TextChunked => "text-chunked",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Tag => "tag",
            Kind::Simple => "simple",
            Kind::Double => "double",
            Kind::Invalid => "invalid",
        }
    }

    /// Kinds whose meaning is carried by their children.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Kind::Array | Kind::Map | Kind::Tag | Kind::BytesChunked | Kind::TextChunked
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of a node, one variant per kind.
///
/// String payloads are byte views. `Cow::Borrowed` points into a buffer the
/// caller owns (the decoder input, the builder text); `Cow::Owned` bytes
/// belong to the tree and are released when the node is freed.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Uint(u64),
    /// Signed integer. Decoded negatives span `-2^64..=-1`.
    Int(i128),
    Double(f64),
    Bytes(Cow<'a, [u8]>),
    Text(Cow<'a, [u8]>),
    BytesChunked,
    TextChunked,
    Array,
    Map,
    Tag(u64),
    True,
    False,
    Null,
    Undefined,
    Simple(u8),
    /// A node carrying a raw kind code nothing else understands.
    Invalid(u8),
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Uint(_) => Kind::Uint,
            Value::Int(_) => Kind::Int,
            Value::Double(_) => Kind::Double,
            Value::Bytes(_) => Kind::Bytes,
            Value::Text(_) => Kind::Text,
            Value::BytesChunked => Kind::BytesChunked,
            Value::TextChunked => Kind::TextChunked,
            Value::Array => Kind::Array,
            Value::Map => Kind::Map,
            Value::Tag(_) => Kind::Tag,
            Value::True => Kind::True,
            Value::False => Kind::False,
            Value::Null => Kind::Null,
            Value::Undefined => Kind::Undefined,
            Value::Simple(_) => Kind::Simple,
            Value::Invalid(_) => Kind::Invalid,
        }
    }

    /// Integer value for either integer kind.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            Value::Uint(u) => Some(i128::from(*u)),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Raw bytes of a definite text or byte string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::Text(b) => Some(b),
            _ => None,
        }
    }

    /// Text payload, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Number of payload bytes owned by the tree (zero for borrowed views).
    pub(crate) fn owned_len(&self) -> usize {
        match self {
            Value::Bytes(Cow::Owned(b)) | Value::Text(Cow::Owned(b)) => b.len(),
            _ => 0,
        }
    }

    pub(crate) fn byte_len(&self) -> usize {
        self.as_bytes().map_or(0, <[u8]>::len)
    }
}

/// One slot of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    pub value: Value<'a>,
    /// Direct child count for containers (a map counts keys and values
    /// separately), byte count for strings.
    pub length: usize,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next: Option<NodeId>,
    /// Back-link used while building and freeing. Never needed to read a value.
    pub parent: Option<NodeId>,
}

impl<'a> Node<'a> {
    pub(crate) fn new(value: Value<'a>) -> Self {
        let length = value.byte_len();
        Self {
            value,
            length,
            first_child: None,
            last_child: None,
            next: None,
            parent: None,
        }
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_unique() {
        let kinds = [
            Kind::False,
            Kind::True,
            Kind::Null,
            Kind::Undefined,
            Kind::Uint,
            Kind::Int,
            Kind::Bytes,
            Kind::Text,
            Kind::BytesChunked,
            Kind::TextChunked,
            Kind::Array,
            Kind::Map,
            Kind::Tag,
            Kind::Simple,
            Kind::Double,
            Kind::Invalid,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn string_length_is_byte_count() {
        let node = Node::new(Value::Text(Cow::Borrowed("€".as_bytes())));
        assert_eq!(node.length, 3);
        assert_eq!(node.value.as_str(), Some("€"));
    }

    #[test]
    fn owned_len_ignores_borrowed_payloads() {
        let borrowed = Value::Bytes(Cow::Borrowed(&[1, 2, 3]));
        let owned = Value::Bytes(Cow::Owned(vec![1, 2, 3]));
        assert_eq!(borrowed.owned_len(), 0);
        assert_eq!(owned.owned_len(), 3);
    }
}
