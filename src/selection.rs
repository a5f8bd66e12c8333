use rustc_hash::FxHashSet;

use crate::model::{TreeId, TreeModel};
use crate::store::NodeStore;

/// Ordered selection; the first id is the primary selection.
///
/// Also caches the selection path used by breadcrumb display: ancestors of the
/// primary selection, the primary selection itself and its direct children.
#[derive(Clone, Debug)]
pub struct Selection<Id> {
    ids: Vec<Id>,
    set: FxHashSet<Id>,
    path: FxHashSet<Id>,
}

impl<Id: TreeId> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            set: FxHashSet::default(),
            path: FxHashSet::default(),
        }
    }
}

impl<Id: TreeId> Selection<Id> {
    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    #[inline]
    pub fn primary(&self) -> Option<Id> {
        self.ids.first().copied()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.set.contains(&id)
    }

    #[inline]
    pub fn in_path(&self, id: Id) -> bool {
        self.path.contains(&id)
    }

    /// Returns `true` if `ids` holds the same nodes regardless of order.
    pub(crate) fn same_nodes(&self, ids: &[Id]) -> bool {
        ids.len() == self.ids.len() && ids.iter().all(|id| self.set.contains(id))
    }

    /// Returns `true` if `id` is an ancestor of any selected node.
    pub fn is_ancestor_of_selection(&self, store: &NodeStore<Id>, id: Id) -> bool {
        self.ids.iter().any(|selected| store.is_ancestor_of(id, *selected))
    }

    pub(crate) fn replace(&mut self, ids: Vec<Id>, store: &NodeStore<Id>) {
        self.set = ids.iter().copied().collect();
        self.ids = ids;
        self.update_path(store);
    }

    pub(crate) fn update_path(&mut self, store: &NodeStore<Id>) {
        self.path.clear();
        let Some(primary) = self.primary() else {
            return;
        };
        self.path.insert(primary);
        self.path.extend(store.children(primary).iter().copied());
        self.path.extend(store.ancestors(primary));
    }

    /// Drops ids no longer present in `store`. Returns `true` if anything was dropped.
    pub(crate) fn retain_existing(&mut self, store: &NodeStore<Id>) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| store.get(*id).is_some());
        if self.ids.len() == before {
            return false;
        }
        self.set = self.ids.iter().copied().collect();
        self.update_path(store);
        true
    }
}
