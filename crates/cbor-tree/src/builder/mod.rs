//! Incremental construction of a value tree from JSON-like text.
//!
//! [`TreeBuilder`] is a token sink: each [`Token`] either opens a container,
//! closes the innermost one, or attaches a literal to it. The open
//! containers are kept on an explicit stack of node ids, so the builder's
//! whole state is the stack plus the retained root.
//!
//! ```
//! use cbor_tree::builder::build;
//! use cbor_tree::access::{array_index, map_get_str};
//!
//! let built = build(r#"{"a": 1, "b": [2, 3]}"#).unwrap();
//! let b = map_get_str(&built.tree, Some(built.root), "b");
//! let three = array_index(&built.tree, b, 1).unwrap();
//! assert_eq!(built.tree[three].value.as_integer(), Some(3));
//! ```

mod error;
mod lexer;

pub use error::BuildError;
pub use lexer::{Container, Lexer, Token};

use crate::node::{NodeId, Value};
use crate::options::{BuildOptions, TrailingPolicy};
use crate::tree::Tree;

/// A finished build.
#[derive(Debug)]
pub struct Built<'a> {
    pub tree: Tree<'a>,
    pub root: NodeId,
    /// Offset just past the last byte read.
    pub consumed: usize,
}

#[derive(Debug, Default)]
pub struct TreeBuilder<'a> {
    tree: Tree<'a>,
    open: Vec<NodeId>,
    root: Option<NodeId>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: &BuildOptions) -> Self {
        Self {
            tree: Tree::with_limits(options.limits),
            ..Self::default()
        }
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Container new nodes are attached to.
    pub fn current_parent(&self) -> Option<NodeId> {
        self.open.last().copied()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn tree(&self) -> &Tree<'a> {
        &self.tree
    }

    /// A root exists and every container has been closed.
    pub fn is_complete(&self) -> bool {
        self.root.is_some() && self.open.is_empty()
    }

    /// Feeds one token found at input offset `pos`.
    pub fn push(&mut self, pos: usize, token: Token<'a>) -> Result<(), BuildError> {
        tracing::trace!(pos, ?token, depth = self.open.len(), "builder token");
        match token {
            Token::Close(container) => {
                let Some(&top) = self.open.last() else {
                    return Err(BuildError::Structure { pos });
                };
                if self.tree[top].kind() != container.kind() {
                    return Err(BuildError::Structure { pos });
                }
                self.open.pop();
            }
            Token::Open(container) => {
                let id = self.attach(pos, container.value())?;
                self.open.push(id);
            }
            Token::Literal(value) => {
                self.attach(pos, value)?;
            }
        }
        Ok(())
    }

    fn attach(&mut self, pos: usize, value: Value<'a>) -> Result<NodeId, BuildError> {
        if self.is_complete() {
            return Err(BuildError::TrailingContent { pos });
        }
        let id = self.tree.alloc(value)?;
        match self.open.last() {
            Some(&parent) => self.tree.link(parent, id),
            None => self.root = Some(id),
        }
        Ok(id)
    }

    /// Ends the stream at offset `end`.
    pub fn finish(self, end: usize) -> Result<Built<'a>, BuildError> {
        if !self.open.is_empty() {
            return Err(BuildError::IncompleteStructure { pos: end });
        }
        let root = self.root.ok_or(BuildError::EmptyInput)?;
        Ok(Built {
            tree: self.tree,
            root,
            consumed: end,
        })
    }
}

/// Builds a tree from the whole of `input` with default options.
pub fn build(input: &str) -> Result<Built<'_>, BuildError> {
    build_range(input, 0, input.len(), &BuildOptions::default())
}

pub fn build_with<'a>(input: &'a str, options: &BuildOptions) -> Result<Built<'a>, BuildError> {
    build_range(input, 0, input.len(), options)
}

/// Builds a tree from `input[start..end]`. Reported positions are offsets
/// into the whole of `input`.
pub fn build_range<'a>(
    input: &'a str,
    start: usize,
    end: usize,
    options: &BuildOptions,
) -> Result<Built<'a>, BuildError> {
    let mut lexer = Lexer::new(input, start, end)?;
    let mut builder = TreeBuilder::with_options(options);
    let built = feed(&mut lexer, &mut builder, options.trailing)
        .and_then(|consumed| builder.finish(consumed.unwrap_or(end)));
    match &built {
        Ok(b) => tracing::debug!(nodes = b.tree.live_nodes(), consumed = b.consumed, "tree built"),
        Err(err) => tracing::debug!(%err, position = ?err.position(), "tree build failed"),
    }
    built
}

/// Drains `lexer` into `builder`. Returns the stop offset when the trailing
/// policy ended the stream early.
fn feed<'a>(
    lexer: &mut Lexer<'a>,
    builder: &mut TreeBuilder<'a>,
    trailing: TrailingPolicy,
) -> Result<Option<usize>, BuildError> {
    while let Some(item) = lexer.next() {
        let (pos, token) = item?;
        builder.push(pos, token)?;
        if trailing == TrailingPolicy::Ignore && builder.is_complete() {
            return Ok(Some(lexer.offset()));
        }
    }
    Ok(None)
}
