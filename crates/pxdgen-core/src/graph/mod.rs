//! The declaration graph: an arena of declaration nodes plus the ordered
//! top-level module.
//!
//! Nodes are addressed by [`DeclId`] handles that stay valid for the life of
//! the graph. Nodes are never removed, so the same handle may be referenced
//! from many places (typedef targets, field types, function arguments) and
//! reference cycles through pointers are representable.

pub mod decl;

use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use self::decl::{Container, Decl};
use crate::error::GraphError;
use crate::fundamental::{canonical_key, FundamentalType};

/// Stable handle to a node in a [`DeclGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclId(u32);

impl DeclId {
    pub fn from_index(index: usize) -> Self {
        DeclId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The ordered list of top-level items to emit.
///
/// Each node appears at most once; order is the order of first appearance in
/// the source, as adjusted by translation and flattening.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    items: Vec<DeclId>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item. Returns false if it was already present.
    pub fn push(&mut self, id: DeclId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.items.push(id);
        true
    }

    /// Insert an item at `index`. An item already present elsewhere is moved.
    pub fn insert(&mut self, index: usize, id: DeclId) {
        let mut index = index;
        if let Some(pos) = self.position(id) {
            self.items.remove(pos);
            if pos < index {
                index -= 1;
            }
        }
        let index = index.min(self.items.len());
        self.items.insert(index, id);
    }

    /// Insert several items immediately before `anchor`, preserving their
    /// order. Falls back to appending when `anchor` is not an item.
    pub fn splice_before(&mut self, anchor: DeclId, ids: &[DeclId]) {
        for &id in ids {
            match self.position(anchor) {
                Some(pos) => self.insert(pos, id),
                None => {
                    self.push(id);
                }
            }
        }
    }

    pub fn remove(&mut self, id: DeclId) -> Option<usize> {
        let pos = self.position(id)?;
        self.items.remove(pos);
        Some(pos)
    }

    pub fn position(&self, id: DeclId) -> Option<usize> {
        self.items.iter().position(|&item| item == id)
    }

    pub fn contains(&self, id: DeclId) -> bool {
        self.items.contains(&id)
    }

    pub fn items(&self) -> &[DeclId] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Arena of declaration nodes with the module built from them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclGraph {
    decls: Vec<Decl>,
    /// Canonical specifier key -> fundamental node, so each spelling of a
    /// fundamental type shares one node.
    fundamentals: HashMap<String, DeclId>,
    module: Module,
}

impl DeclGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::from_index(self.decls.len());
        self.decls.push(decl);
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        self.decls.get_mut(id.index())
    }

    /// The node for a fundamental type spelled by `names`, in any order.
    pub fn fundamental<S: AsRef<str>>(&mut self, names: &[S]) -> DeclId {
        let key = canonical_key(names);
        if let Some(&id) = self.fundamentals.get(&key) {
            return id;
        }
        let id = self.add(Decl::Fundamental(FundamentalType::from_key(&key)));
        self.fundamentals.insert(key, id);
        id
    }

    pub fn pointer_to(&mut self, target: DeclId) -> DeclId {
        self.add(Decl::Pointer { target })
    }

    pub fn array_of(&mut self, target: DeclId, dim: Option<u64>) -> DeclId {
        self.add(Decl::Array { target, dim })
    }

    pub fn assign_typedef_target(&mut self, id: DeclId, target: DeclId) -> Result<(), GraphError> {
        match self.get_mut(id) {
            Some(Decl::Typedef(td)) => td.assign_target(target),
            _ => Err(GraphError::NotATypedef(id)),
        }
    }

    pub fn container(&self, id: DeclId) -> Option<&Container> {
        self.get(id).and_then(Decl::as_container)
    }

    pub fn container_mut(&mut self, id: DeclId) -> Result<&mut Container, GraphError> {
        self.get_mut(id)
            .and_then(Decl::as_container_mut)
            .ok_or(GraphError::NotAnAggregate(id))
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    pub fn is_item(&self, id: DeclId) -> bool {
        self.module.contains(id)
    }

    /// Iterate module items together with their nodes.
    pub fn items(&self) -> impl Iterator<Item = (DeclId, &Decl)> + '_ {
        self.module.iter().map(move |id| (id, &self[id]))
    }

    /// Iterate every node in the arena, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> + '_ {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, decl)| (DeclId::from_index(i), decl))
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl Index<DeclId> for DeclGraph {
    type Output = Decl;

    fn index(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }
}

impl IndexMut<DeclId> for DeclGraph {
    fn index_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }
}
