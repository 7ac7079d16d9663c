//! Generic CBOR value tree.
//!
//! Values live in an index-linked arena ([`Tree`]) and are reached through
//! structural accessors ([`access`]). Trees come from binary CBOR
//! ([`decode`]) or from a small JSON-like text form ([`builder`]), and go
//! back out as diagnostic notation ([`diag`]), binary CBOR ([`encode`]) or
//! JSON ([`json`]).

mod constants;

pub mod access;
pub mod builder;
pub mod cli;
pub mod decode;
pub mod diag;
pub mod encode;
pub mod json;
pub mod node;
pub mod options;
pub mod tree;

pub use access::{array_index, map_get_bytes, map_get_int, map_get_str};
pub use builder::{build, build_range, build_with, BuildError, Built, TreeBuilder};
pub use decode::{decode, decode_with, DecodeError, DecodeErrorKind, Decoded};
pub use diag::{to_diag, write_diag};
pub use encode::{encode, EncodeError};
pub use json::{to_json, JsonError};
pub use node::{Kind, Node, NodeId, Value};
pub use options::{BuildOptions, DecodeOptions, TrailingPolicy, TreeLimits};
pub use tree::{Tree, TreeError};
