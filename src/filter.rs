use crate::error::TreeError;
use crate::model::TreeId;
use crate::node::TreeNode;
use crate::selection::Selection;
use crate::store::NodeStore;

/// Read-only view passed to every filter.
pub struct FilterContext<'a, Id> {
    pub store: &'a NodeStore<Id>,
    pub selection: &'a Selection<Id>,
    /// Lazy expanding enabled on the tree.
    pub lazy_expanding_enabled: bool,
}

/// Visibility predicate. A node is in the flat list only if every filter accepts it.
///
/// Any `Fn(&TreeNode<Id>) -> bool` closure is a filter.
pub trait NodeFilter<Id> {
    fn accept(&self, node: &TreeNode<Id>, cx: &FilterContext<'_, Id>) -> bool;
}

impl<Id, F> NodeFilter<Id> for F
where
    F: Fn(&TreeNode<Id>) -> bool,
{
    #[inline]
    fn accept(&self, node: &TreeNode<Id>, _cx: &FilterContext<'_, Id>) -> bool {
        self(node)
    }
}

/// Identifies a filter registered in a [`FilterChain`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FilterHandle(u64);

/// Ordered list of filters with per-node accept caching.
pub struct FilterChain<Id> {
    filters: Vec<(FilterHandle, Box<dyn NodeFilter<Id>>)>,
    next_handle: u64,
}

impl<Id: TreeId> Default for FilterChain<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: TreeId> FilterChain<Id> {
    pub const fn new() -> Self {
        Self {
            filters: Vec::new(),
            next_handle: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn add<F>(&mut self, filter: F) -> FilterHandle
    where
        F: NodeFilter<Id> + 'static,
    {
        let handle = FilterHandle(self.next_handle);
        self.next_handle += 1;
        self.filters.push((handle, Box::new(filter)));
        handle
    }

    /// Returns `false` if the handle was not registered.
    pub fn remove(&mut self, handle: FilterHandle) -> bool {
        let before = self.filters.len();
        self.filters.retain(|(registered, _)| *registered != handle);
        self.filters.len() != before
    }

    #[inline]
    pub fn contains(&self, handle: FilterHandle) -> bool {
        self.filters.iter().any(|(registered, _)| *registered == handle)
    }

    pub fn accept(&self, node: &TreeNode<Id>, cx: &FilterContext<'_, Id>) -> bool {
        self.filters.iter().all(|(_, filter)| filter.accept(node, cx))
    }

    /// Recomputes the accept state of `id` if it is dirty.
    ///
    /// Returns `true` if the node was dirty or its accept state flipped. A change marks
    /// the direct children dirty so they are re-evaluated when visited.
    pub(crate) fn apply_for_node(
        &self,
        store: &mut NodeStore<Id>,
        selection: &Selection<Id>,
        lazy_expanding_enabled: bool,
        id: Id,
    ) -> Result<bool, TreeError> {
        let (accepted, was_accepted, was_dirty) = {
            let node = store.node(id)?;
            let cx = FilterContext {
                store,
                selection,
                lazy_expanding_enabled,
            };
            (self.accept(node, &cx), node.filter_accepted, node.filter_dirty)
        };
        let changed = was_dirty || accepted != was_accepted;
        if !changed {
            return Ok(false);
        }
        let node = store.node_mut(id)?;
        node.filter_accepted = accepted;
        node.filter_dirty = false;
        let children = node.children.clone();
        for child in children {
            if let Some(child) = store.get_mut(child) {
                child.filter_dirty = true;
            }
        }
        Ok(true)
    }
}

/// Hides the children of a lazily expanded node unless they lead to the selection.
///
/// Installed first in every tree's chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct LazyNodeFilter;

impl<Id: TreeId> NodeFilter<Id> for LazyNodeFilter {
    fn accept(&self, node: &TreeNode<Id>, cx: &FilterContext<'_, Id>) -> bool {
        let Some(parent) = node.parent.and_then(|parent| cx.store.get(parent)) else {
            return true;
        };
        if !cx.lazy_expanding_enabled || !parent.expanded_lazy || !parent.lazy_expanding_enabled
        {
            return true;
        }
        cx.selection.contains(node.id) || cx.selection.is_ancestor_of_selection(cx.store, node.id)
    }
}

/// Accepts only the selection path; the root nodes while nothing is selected.
#[derive(Clone, Copy, Debug, Default)]
pub struct BreadcrumbFilter;

impl<Id: TreeId> NodeFilter<Id> for BreadcrumbFilter {
    fn accept(&self, node: &TreeNode<Id>, cx: &FilterContext<'_, Id>) -> bool {
        if cx.selection.is_empty() {
            return node.parent.is_none();
        }
        cx.selection.in_path(node.id)
    }
}

/// Case-insensitive substring match on the node text.
///
/// Ancestors of a matching node are accepted too, so that matches stay reachable.
#[derive(Clone, Debug, Default)]
pub struct TextFilter {
    needle: String,
}

impl TextFilter {
    pub fn new(needle: impl AsRef<str>) -> Self {
        Self {
            needle: needle.as_ref().to_lowercase(),
        }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    fn matches<Id>(&self, node: &TreeNode<Id>) -> bool {
        node.text.to_lowercase().contains(&self.needle)
    }
}

impl<Id: TreeId> NodeFilter<Id> for TextFilter {
    fn accept(&self, node: &TreeNode<Id>, cx: &FilterContext<'_, Id>) -> bool {
        if self.needle.is_empty() || self.matches(node) {
            return true;
        }
        let mut found = false;
        cx.store.visit_nodes(&node.children, |descendant| {
            found = found || self.matches(descendant);
            found
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DefaultNodeFactory, NodeModel};

    fn store() -> NodeStore<u32> {
        let mut store = NodeStore::new();
        let models = [NodeModel::new(1).text("Animals").children([
            NodeModel::new(2).text("Cat"),
            NodeModel::new(3).text("Dog").children([NodeModel::new(4).text("Beagle")]),
        ])];
        store
            .insert_models(&DefaultNodeFactory, &models, None)
            .unwrap();
        store
    }

    #[test]
    fn chain_requires_every_filter() {
        let store = store();
        let selection = Selection::default();
        let cx = FilterContext {
            store: &store,
            selection: &selection,
            lazy_expanding_enabled: true,
        };
        let mut chain = FilterChain::new();
        chain.add(|node: &TreeNode<u32>| node.id() != 2);
        let odd = chain.add(|node: &TreeNode<u32>| node.id() % 2 == 1);
        assert!(chain.accept(store.get(1).unwrap(), &cx));
        assert!(!chain.accept(store.get(4).unwrap(), &cx));
        assert!(chain.remove(odd));
        assert!(!chain.remove(odd));
        assert!(chain.accept(store.get(4).unwrap(), &cx));
    }

    #[test]
    fn apply_marks_children_dirty_on_change() {
        let mut store = store();
        let selection = Selection::default();
        let mut chain = FilterChain::new();
        assert!(chain.apply_for_node(&mut store, &selection, true, 3).unwrap());
        store.get_mut(4).unwrap().filter_dirty = false;
        assert!(!chain.apply_for_node(&mut store, &selection, true, 3).unwrap());

        chain.add(|node: &TreeNode<u32>| node.id() != 3);
        assert!(chain.apply_for_node(&mut store, &selection, true, 3).unwrap());
        assert!(!store.get(3).unwrap().is_filter_accepted());
        assert!(store.get(4).unwrap().is_filter_dirty());
    }

    #[test]
    fn text_filter_keeps_ancestors_of_matches() {
        let store = store();
        let selection = Selection::default();
        let cx = FilterContext {
            store: &store,
            selection: &selection,
            lazy_expanding_enabled: true,
        };
        let filter = TextFilter::new("BEA");
        assert!(filter.accept(store.get(1).unwrap(), &cx));
        assert!(filter.accept(store.get(3).unwrap(), &cx));
        assert!(filter.accept(store.get(4).unwrap(), &cx));
        assert!(!filter.accept(store.get(2).unwrap(), &cx));
    }

    #[test]
    fn breadcrumb_filter_accepts_selection_path() {
        let store = store();
        let mut selection = Selection::default();
        let cx = FilterContext {
            store: &store,
            selection: &selection,
            lazy_expanding_enabled: true,
        };
        assert!(BreadcrumbFilter.accept(store.get(1).unwrap(), &cx));
        assert!(!BreadcrumbFilter.accept(store.get(3).unwrap(), &cx));

        selection.replace(vec![3], &store);
        let cx = FilterContext {
            store: &store,
            selection: &selection,
            lazy_expanding_enabled: true,
        };
        for id in [1, 3, 4] {
            assert!(BreadcrumbFilter.accept(store.get(id).unwrap(), &cx));
        }
        assert!(!BreadcrumbFilter.accept(store.get(2).unwrap(), &cx));
    }

    #[test]
    fn lazy_filter_only_shows_selection_below_lazy_parent() {
        let mut store = store();
        {
            let root = store.get_mut(1).unwrap();
            root.expanded = true;
            root.expanded_lazy = true;
            root.lazy_expanding_enabled = true;
        }
        let mut selection = Selection::default();
        selection.replace(vec![4], &store);
        let cx = FilterContext {
            store: &store,
            selection: &selection,
            lazy_expanding_enabled: true,
        };
        assert!(LazyNodeFilter.accept(store.get(3).unwrap(), &cx));
        assert!(!LazyNodeFilter.accept(store.get(2).unwrap(), &cx));

        let cx = FilterContext {
            lazy_expanding_enabled: false,
            ..cx
        };
        assert!(LazyNodeFilter.accept(store.get(2).unwrap(), &cx));
    }
}
