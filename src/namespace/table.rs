// CLASSIFICATION: COMMUNITY
// Filename: table.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Node plan and node table.
//!
//! [`plan`] turns a layout and descriptor table into an ordered list of
//! `{index, parent, name, kind}` tuples, parents always first. [`NodeTable`]
//! is a fixed set of slots, one per planned node, recording what currently
//! exists so teardown never needs any other bookkeeping.

use super::{NamespaceLayout, NodeHandle};
use crate::error::ExposeError;
use crate::registers::{DescriptorTable, RegisterDescriptor};

/// Slot of the root directory.
pub const ROOT_INDEX: usize = 0;
/// Slot of the register sub‑directory.
pub const SUBDIR_INDEX: usize = 1;
/// Slot of the first register leaf.
pub const FIRST_LEAF_INDEX: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// One node the controller will create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNode {
    pub index: usize,
    pub parent: Option<usize>,
    pub name: String,
    pub kind: NodeKind,
    pub descriptor: Option<RegisterDescriptor>,
}

/// Root, sub‑directory, then one leaf per descriptor in table order.
pub fn plan(layout: &NamespaceLayout, table: &DescriptorTable) -> Vec<PlannedNode> {
    let mut steps = Vec::with_capacity(FIRST_LEAF_INDEX + table.len());
    steps.push(PlannedNode {
        index: ROOT_INDEX,
        parent: None,
        name: layout.root.clone(),
        kind: NodeKind::Directory,
        descriptor: None,
    });
    steps.push(PlannedNode {
        index: SUBDIR_INDEX,
        parent: Some(ROOT_INDEX),
        name: layout.subdir.clone(),
        kind: NodeKind::Directory,
        descriptor: None,
    });
    for (i, d) in table.iter().enumerate() {
        steps.push(PlannedNode {
            index: FIRST_LEAF_INDEX + i,
            parent: Some(SUBDIR_INDEX),
            name: d.name.clone(),
            kind: NodeKind::File,
            descriptor: Some(d.clone()),
        });
    }
    steps
}

/// A node that exists in the exposure namespace.
#[derive(Debug, Clone)]
pub struct NamespaceNode {
    pub index: usize,
    pub parent_index: Option<usize>,
    pub kind: NodeKind,
    pub bound_descriptor: Option<RegisterDescriptor>,
    pub handle: NodeHandle,
}

/// Fixed‑size table of created nodes.
#[derive(Debug, Default)]
pub struct NodeTable {
    slots: Vec<Option<NamespaceNode>>,
}

impl NodeTable {
    /// A table with `slots` empty entries. Never resized afterwards.
    pub fn with_slots(slots: usize) -> Self {
        Self {
            slots: (0..slots).map(|_| None).collect(),
        }
    }

    /// Store `node` at `index`. The slot must exist and be empty.
    pub fn set(&mut self, index: usize, node: NamespaceNode) -> Result<(), ExposeError> {
        let capacity = self.slots.len();
        match self.slots.get_mut(index) {
            Some(slot @ None) => {
                *slot = Some(node);
                Ok(())
            }
            Some(Some(existing)) => Err(ExposeError::InternalConsistency(format!(
                "slot {index} already holds {}",
                existing.handle.path()
            ))),
            None => Err(ExposeError::InternalConsistency(format!(
                "slot {index} outside table of {capacity}"
            ))),
        }
    }

    pub fn get(&self, index: usize) -> Option<&NamespaceNode> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Empty a slot, returning what it held. Clearing an empty slot is a no‑op.
    pub fn clear(&mut self, index: usize) -> Option<NamespaceNode> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Empty every slot, highest index first.
    pub fn drain_reverse(&mut self) -> Vec<NamespaceNode> {
        self.slots.iter_mut().rev().filter_map(Option::take).collect()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamespaceNode> {
        self.slots.iter().filter_map(Option::as_ref)
    }
}
