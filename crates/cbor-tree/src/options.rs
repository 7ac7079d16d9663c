//! Knobs for decoding and building trees.

/// Bounds applied to a [`Tree`](crate::Tree) arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeLimits {
    /// Maximum number of live nodes. `None` is bounded only by memory.
    pub max_nodes: Option<usize>,
}

impl TreeLimits {
    pub fn max_nodes(max_nodes: usize) -> Self {
        Self {
            max_nodes: Some(max_nodes),
        }
    }
}

/// Options for [`decode_with`](crate::decode::decode_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Accept half, single and double precision floats. When `false` (or
    /// when the crate is built without the `float` feature) any float item
    /// fails with `float-unsupported`.
    pub floats: bool,
    pub limits: TreeLimits,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            floats: cfg!(feature = "float"),
            limits: TreeLimits::default(),
        }
    }
}

/// What the builder does with tokens after the first complete document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingPolicy {
    /// Any token other than a separator after the document is an error.
    #[default]
    Reject,
    /// Stop at the end of the first document and leave the rest unread.
    Ignore,
}

/// Options for [`TreeBuilder`](crate::builder::TreeBuilder).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub trailing: TrailingPolicy,
    pub limits: TreeLimits,
}
