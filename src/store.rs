use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use crate::error::TreeError;
use crate::model::{NodeFactory, NodeModel, TreeId, TreeModel};
use crate::node::TreeNode;

/// Arena owning every node of one tree, keyed by id.
///
/// Children lists own the structure; parents are stored as plain ids.
pub struct NodeStore<Id> {
    nodes: FxHashMap<Id, TreeNode<Id>>,
    roots: Vec<Id>,
}

impl<Id: TreeId> Default for NodeStore<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: TreeId> NodeStore<Id> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
            roots: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: Id) -> Option<&TreeNode<Id>> {
        self.nodes.get(&id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: Id) -> Option<&mut TreeNode<Id>> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn node(&self, id: Id) -> Result<&TreeNode<Id>, TreeError> {
        self.nodes.get(&id).ok_or_else(|| TreeError::unknown(id))
    }

    pub(crate) fn node_mut(&mut self, id: Id) -> Result<&mut TreeNode<Id>, TreeError> {
        self.nodes.get_mut(&id).ok_or_else(|| TreeError::unknown(id))
    }

    pub fn root_ids(&self) -> &[Id] {
        &self.roots
    }

    /// Children of `parent`, or the roots for `None`.
    pub fn siblings_of(&self, parent: Option<Id>) -> &[Id] {
        match parent {
            Some(parent) => self.nodes.get(&parent).map_or(&[], |node| node.children.as_slice()),
            None => &self.roots,
        }
    }

    fn child_list_mut(&mut self, parent: Option<Id>) -> Result<&mut Vec<Id>, TreeError> {
        match parent {
            Some(parent) => Ok(&mut self.node_mut(parent)?.children),
            None => Ok(&mut self.roots),
        }
    }

    #[inline]
    pub fn parent_of(&self, id: Id) -> Option<Id> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    #[inline]
    pub fn level_of(&self, id: Id) -> u16 {
        self.nodes.get(&id).map_or(0, |node| node.level)
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: Id) -> SmallVec<[Id; 8]> {
        let mut out = SmallVec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent_of(parent);
        }
        out
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor_of(&self, ancestor: Id, id: Id) -> bool {
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Pre-order traversal starting at `start`; returning `true` from `visit`
    /// skips the children of the visited node.
    pub fn visit_nodes<F>(&self, start: &[Id], mut visit: F)
    where
        F: FnMut(&TreeNode<Id>) -> bool,
    {
        let mut stack: Vec<Id> = start.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !visit(node) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// Ids of `start` and all their descendants, pre-order.
    pub fn collect_subtree(&self, start: &[Id]) -> Vec<Id> {
        let mut out = Vec::new();
        self.visit_nodes(start, |node| {
            out.push(node.id);
            false
        });
        out
    }

    /// Validates that none of the models (or their descendants) exist yet and
    /// that ids are unique among them.
    pub(crate) fn check_insertable(&self, models: &[NodeModel<Id>]) -> Result<(), TreeError> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut stack: Vec<&NodeModel<Id>> = models.iter().collect();
        while let Some(model) = stack.pop() {
            if self.nodes.contains_key(&model.id) || !seen.insert(model.id) {
                return Err(TreeError::duplicate(model.id));
            }
            stack.extend(model.child_nodes.iter());
        }
        Ok(())
    }

    /// Creates the nodes for `models` (recursively) and links them below `parent`
    /// at their requested child index. Returns the ids of the top-level inserted nodes,
    /// ordered by their final child index.
    pub(crate) fn insert_models<F: NodeFactory<Id> + ?Sized>(
        &mut self,
        factory: &F,
        models: &[NodeModel<Id>],
        parent: Option<Id>,
    ) -> Result<Vec<Id>, TreeError> {
        let level = match parent {
            Some(parent) => self.node(parent)?.level + 1,
            None => 0,
        };
        let mut sorted: Vec<&NodeModel<Id>> = models.iter().collect();
        sorted.sort_by_key(|model| model.child_node_index.unwrap_or(usize::MAX));

        let mut inserted = Vec::with_capacity(sorted.len());
        let mut first_index = usize::MAX;
        for model in sorted {
            let id = self.create_subtree(factory, model, parent, level);
            let list = self.child_list_mut(parent)?;
            let at = model.child_node_index.unwrap_or(list.len()).min(list.len());
            list.insert(at, id);
            first_index = first_index.min(at);
            inserted.push(id);
        }
        if first_index != usize::MAX {
            self.update_child_node_index(parent, first_index);
        }
        inserted.sort_by_key(|id| self.nodes.get(id).map_or(0, |node| node.child_node_index));
        Ok(inserted)
    }

    fn create_subtree<F: NodeFactory<Id> + ?Sized>(
        &mut self,
        factory: &F,
        model: &NodeModel<Id>,
        parent: Option<Id>,
        level: u16,
    ) -> Id {
        let mut node = factory.create_node(model);
        node.parent = parent;
        node.level = level;
        node.children = Vec::with_capacity(model.child_nodes.len());
        node.filter_dirty = true;
        let id = node.id;
        self.nodes.insert(id, node);
        for (index, child) in model.child_nodes.iter().enumerate() {
            let child_id = self.create_subtree(factory, child, Some(id), level + 1);
            if let Some(child_node) = self.nodes.get_mut(&child_id) {
                child_node.child_node_index = index;
            }
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }
        id
    }

    /// Unlinks `id` from its parent (or the roots) and drops it with its whole subtree.
    /// Returns the removed ids, pre-order.
    pub(crate) fn remove_subtree(&mut self, id: Id) -> Vec<Id> {
        let parent = self.parent_of(id);
        if let Ok(list) = self.child_list_mut(parent) {
            list.retain(|child| *child != id);
        }
        let removed = self.collect_subtree(&[id]);
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }
        removed
    }

    /// Replaces the child order of `parent` (or the roots).
    pub(crate) fn set_children(
        &mut self,
        parent: Option<Id>,
        children: Vec<Id>,
    ) -> Result<(), TreeError> {
        *self.child_list_mut(parent)? = children;
        self.update_child_node_index(parent, 0);
        Ok(())
    }

    /// Renumbers `child_node_index` of the children of `parent` from `start` on.
    pub(crate) fn update_child_node_index(&mut self, parent: Option<Id>, start: usize) {
        let children: SmallVec<[Id; 16]> = self.siblings_of(parent).iter().copied().collect();
        for (index, child) in children.iter().enumerate().skip(start) {
            if let Some(node) = self.nodes.get_mut(child) {
                node.child_node_index = index;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeNode<Id>> {
        self.nodes.values()
    }
}

impl<Id: TreeId> TreeModel for NodeStore<Id> {
    type Id = Id;

    fn roots(&self) -> &[Self::Id] {
        &self.roots
    }

    fn children(&self, id: Self::Id) -> &[Self::Id] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    fn contains(&self, id: Self::Id) -> bool {
        self.nodes.contains_key(&id)
    }

    fn size_hint(&self) -> usize {
        self.nodes.len()
    }
}
