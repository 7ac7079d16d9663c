//! Arena holding the nodes of one value tree.
//!
//! Slots are reused through a free list, so a [`NodeId`] stays valid until
//! the subtree containing it is passed to [`Tree::free`]. The arena also
//! plays the role of the allocation context: growth can fail (see
//! [`TreeLimits`]) and every owned payload byte is accounted so callers can
//! check that a free released everything.

use std::borrow::Cow;
use std::ops::{Index, IndexMut};

use thiserror::Error;

use crate::node::{Kind, Node, NodeId, Value};
use crate::options::TreeLimits;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node limit of {limit} reached")]
    NodeLimit { limit: usize },
    #[error("out of memory growing the node arena")]
    OutOfMemory,
    #[error("node {id} is a {found}, expected {expected}")]
    WrongKind {
        id: NodeId,
        found: Kind,
        expected: Kind,
    },
    #[error("node {id} is not live")]
    NotLive { id: NodeId },
    #[error("node {id} already has a parent")]
    AlreadyLinked { id: NodeId },
    #[error("linking {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

#[derive(Debug, Clone, Default)]
pub struct Tree<'a> {
    slots: Vec<Option<Node<'a>>>,
    free: Vec<u32>,
    live: usize,
    owned: usize,
    limits: TreeLimits,
}

impl<'a> Tree<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: TreeLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Number of nodes currently allocated.
    pub fn live_nodes(&self) -> usize {
        self.live
    }

    /// Payload bytes owned by the tree (borrowed views are not counted).
    pub fn owned_bytes(&self) -> usize {
        self.owned
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<'a>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<'a>> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Allocates a detached node.
    pub fn alloc(&mut self, value: Value<'a>) -> Result<NodeId, TreeError> {
        if let Some(limit) = self.limits.max_nodes {
            if self.live >= limit {
                return Err(TreeError::NodeLimit { limit });
            }
        }
        let owned = value.owned_len();
        let node = Node::new(value);
        let id = match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(node);
                NodeId(idx)
            }
            None => {
                let idx = u32::try_from(self.slots.len()).map_err(|_| TreeError::OutOfMemory)?;
                self.slots
                    .try_reserve(1)
                    .map_err(|_| TreeError::OutOfMemory)?;
                self.slots.push(Some(node));
                NodeId(idx)
            }
        };
        self.live += 1;
        self.owned += owned;
        Ok(id)
    }

    /// Links a detached `child` as the new last child of `parent`.
    ///
    /// Nothing is changed unless both ids are live, `child` has no parent,
    /// and `child` is neither `parent` nor one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check_link(parent, child)?;
        self.link(parent, child);
        Ok(())
    }

    fn check_detached(&self, child: NodeId) -> Result<(), TreeError> {
        match self.get(child) {
            None => Err(TreeError::NotLive { id: child }),
            Some(node) if node.parent.is_some() => Err(TreeError::AlreadyLinked { id: child }),
            Some(_) => Ok(()),
        }
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.get(parent).is_none() {
            return Err(TreeError::NotLive { id: parent });
        }
        self.check_detached(child)?;
        let mut curr = Some(parent);
        while let Some(id) = curr {
            if id == child {
                return Err(TreeError::WouldCycle { parent, child });
            }
            curr = self.get(id).and_then(|n| n.parent);
        }
        Ok(())
    }

    /// Appends without checks. `child` must be freshly allocated.
    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        let last = self[parent].last_child;
        match last {
            Some(last) => self[last].next = Some(child),
            None => self[parent].first_child = Some(child),
        }
        let p = &mut self[parent];
        p.last_child = Some(child);
        p.length += 1;
        self[child].parent = Some(parent);
    }

    /// Unlinks `id` from its parent's child list, if it has one.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else {
            return;
        };
        let next = self[id].next;
        let mut prev = None;
        let mut curr = self.get(parent).and_then(|p| p.first_child);
        while let Some(c) = curr {
            if c == id {
                break;
            }
            prev = Some(c);
            curr = self.get(c).and_then(|n| n.next);
        }
        if let Some(p) = self.get_mut(parent) {
            if p.first_child == Some(id) {
                p.first_child = next;
            }
            if p.last_child == Some(id) {
                p.last_child = prev;
            }
            p.length = p.length.saturating_sub(1);
        }
        if let Some(prev) = prev.and_then(|p| self.get_mut(p)) {
            prev.next = next;
        }
        let node = &mut self[id];
        node.parent = None;
        node.next = None;
    }

    /// Frees `id` and its whole subtree, returning the number of nodes
    /// released. A node that is still linked into a parent is unlinked
    /// first. Freeing an id that is not live is a no-op.
    pub fn free(&mut self, id: NodeId) -> usize {
        if self.get(id).is_none() {
            return 0;
        }
        self.detach(id);
        let mut freed = 0;
        let mut stack = vec![id];
        while let Some(curr) = stack.pop() {
            let Some(node) = self.slots.get_mut(curr.index()).and_then(Option::take) else {
                continue;
            };
            let mut child = node.first_child;
            while let Some(c) = child {
                stack.push(c);
                child = self.get(c).and_then(|n| n.next);
            }
            self.owned -= node.value.owned_len();
            self.live -= 1;
            self.free.push(curr.0);
            freed += 1;
        }
        tracing::trace!(root = %id, freed, "freed subtree");
        freed
    }

    /// Direct children of `id`, in order.
    pub fn children(&self, id: NodeId) -> Children<'_, 'a> {
        Children {
            tree: self,
            curr: self.get(id).and_then(|n| n.first_child),
        }
    }

    /// Key/value pairs of a map. A trailing key with no value is never
    /// yielded.
    pub fn pairs(&self, id: NodeId) -> Pairs<'_, 'a> {
        Pairs {
            tree: self,
            curr: self.get(id).and_then(|n| n.first_child),
        }
    }

    // Constructors. New nodes are detached until linked.

    pub fn create_map(&mut self) -> Result<NodeId, TreeError> {
        self.alloc(Value::Map)
    }

    pub fn create_array(&mut self) -> Result<NodeId, TreeError> {
        self.alloc(Value::Array)
    }

    /// Negative values become signed ints, everything else unsigned.
    pub fn create_int(&mut self, value: i64) -> Result<NodeId, TreeError> {
        if value < 0 {
            self.alloc(Value::Int(i128::from(value)))
        } else {
            self.alloc(Value::Uint(value.unsigned_abs()))
        }
    }

    pub fn create_uint(&mut self, value: u64) -> Result<NodeId, TreeError> {
        self.alloc(Value::Uint(value))
    }

    pub fn create_double(&mut self, value: f64) -> Result<NodeId, TreeError> {
        self.alloc(Value::Double(value))
    }

    pub fn create_text(&mut self, text: impl Into<Cow<'a, str>>) -> Result<NodeId, TreeError> {
        let bytes = match text.into() {
            Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
            Cow::Owned(s) => Cow::Owned(s.into_bytes()),
        };
        self.alloc(Value::Text(bytes))
    }

    pub fn create_bytes(&mut self, bytes: impl Into<Cow<'a, [u8]>>) -> Result<NodeId, TreeError> {
        self.alloc(Value::Bytes(bytes.into()))
    }

    pub fn create_bool(&mut self, value: bool) -> Result<NodeId, TreeError> {
        self.alloc(if value { Value::True } else { Value::False })
    }

    pub fn create_null(&mut self) -> Result<NodeId, TreeError> {
        self.alloc(Value::Null)
    }

    pub fn create_undefined(&mut self) -> Result<NodeId, TreeError> {
        self.alloc(Value::Undefined)
    }

    pub fn create_simple(&mut self, value: u8) -> Result<NodeId, TreeError> {
        self.alloc(Value::Simple(value))
    }

    /// Wraps a detached `child` in a new tag node.
    pub fn create_tag(&mut self, tag: u64, child: NodeId) -> Result<NodeId, TreeError> {
        self.check_detached(child)?;
        let id = self.alloc(Value::Tag(tag))?;
        self.link(id, child);
        Ok(id)
    }

    fn expect_kind(&self, id: NodeId, expected: Kind) -> Result<(), TreeError> {
        let found = self.get(id).ok_or(TreeError::NotLive { id })?.kind();
        if found == expected {
            Ok(())
        } else {
            Err(TreeError::WrongKind {
                id,
                found,
                expected,
            })
        }
    }

    /// Appends an integer-keyed pair to `map`.
    pub fn map_put_int(&mut self, map: NodeId, key: i64, value: NodeId) -> Result<(), TreeError> {
        self.expect_kind(map, Kind::Map)?;
        self.check_link(map, value)?;
        let key = self.create_int(key)?;
        self.link(map, key);
        self.link(map, value);
        Ok(())
    }

    /// Appends a text-keyed pair to `map`.
    pub fn map_put_text(
        &mut self,
        map: NodeId,
        key: impl Into<Cow<'a, str>>,
        value: NodeId,
    ) -> Result<(), TreeError> {
        self.expect_kind(map, Kind::Map)?;
        self.check_link(map, value)?;
        let key = self.create_text(key)?;
        self.link(map, key);
        self.link(map, value);
        Ok(())
    }

    pub fn array_append(&mut self, array: NodeId, value: NodeId) -> Result<(), TreeError> {
        self.expect_kind(array, Kind::Array)?;
        self.check_link(array, value)?;
        self.link(array, value);
        Ok(())
    }
}

impl<'a> Index<NodeId> for Tree<'a> {
    type Output = Node<'a>;

    fn index(&self, id: NodeId) -> &Node<'a> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id} is not live"),
        }
    }
}

impl<'a> IndexMut<NodeId> for Tree<'a> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id} is not live"),
        }
    }
}

pub struct Children<'t, 'a> {
    tree: &'t Tree<'a>,
    curr: Option<NodeId>,
}

impl Iterator for Children<'_, '_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.curr?;
        self.curr = self.tree.get(id)?.next;
        Some(id)
    }
}

pub struct Pairs<'t, 'a> {
    tree: &'t Tree<'a>,
    curr: Option<NodeId>,
}

impl Iterator for Pairs<'_, '_> {
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<(NodeId, NodeId)> {
        let key = self.curr?;
        let value = self.tree.get(key)?.next?;
        self.curr = self.tree.get(value)?.next;
        Some((key, value))
    }
}
