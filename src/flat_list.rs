use rustc_hash::{FxBuildHasher, FxHashSet};
use smallvec::SmallVec;

use crate::model::TreeId;
use crate::range::Range;
use crate::store::NodeStore;

/// Ordered list of the visible nodes plus a presence index.
///
/// Members are exactly the filter-accepted nodes whose ancestors all show their
/// children, ordered as a pre-order walk of the full tree would visit them.
#[derive(Clone, Debug)]
pub struct FlatList<Id> {
    ids: Vec<Id>,
    present: FxHashSet<Id>,
}

impl<Id: TreeId> Default for FlatList<Id> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<Id: TreeId> FlatList<Id> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            present: FxHashSet::with_capacity_and_hasher(capacity, FxBuildHasher),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Id> {
        self.ids.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Id] {
        &self.ids
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.present.contains(&id)
    }

    /// Linear lookup; the presence index short-circuits absent ids.
    pub fn index_of(&self, id: Id) -> Option<usize> {
        if !self.present.contains(&id) {
            return None;
        }
        self.ids.iter().position(|candidate| *candidate == id)
    }

    pub(crate) fn insert_slice(&mut self, at: usize, ids: &[Id]) {
        let at = at.min(self.ids.len());
        self.ids.splice(at..at, ids.iter().copied());
        self.present.extend(ids.iter().copied());
    }

    pub(crate) fn remove_range(&mut self, range: Range) -> Vec<Id> {
        let to = range.to.min(self.ids.len());
        let from = range.from.min(to);
        let removed: Vec<Id> = self.ids.drain(from..to).collect();
        for id in &removed {
            self.present.remove(id);
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
        self.present.clear();
    }

    /// Index one past the visible subtree of the entry at `index`.
    ///
    /// Descendants directly follow their ancestor and are deeper, so the scan stops
    /// at the first entry on the same level or shallower.
    pub fn subtree_end(&self, store: &NodeStore<Id>, index: usize) -> usize {
        let Some(id) = self.get(index) else {
            return self.len();
        };
        let level = store.level_of(id);
        self.ids[index + 1..]
            .iter()
            .position(|candidate| store.level_of(*candidate) <= level)
            .map_or(self.len(), |offset| index + 1 + offset)
    }

    /// The visible slice made of `id` and its visible descendants.
    pub fn subtree_range(&self, store: &NodeStore<Id>, id: Id) -> Option<Range> {
        let index = self.index_of(id)?;
        Some(Range::new(index, self.subtree_end(store, index)))
    }

    /// Where `id` has to be inserted to keep pre-order.
    ///
    /// After the visible subtree of the nearest preceding sibling that is present,
    /// otherwise right after the parent. `None` if the parent itself is not present.
    pub fn find_insert_position(&self, store: &NodeStore<Id>, id: Id) -> Option<usize> {
        let parent = store.parent_of(id);
        let siblings = store.siblings_of(parent);
        let own = siblings
            .iter()
            .position(|sibling| *sibling == id)
            .unwrap_or(siblings.len());
        for sibling in siblings[..own].iter().rev() {
            if let Some(index) = self.index_of(*sibling) {
                return Some(self.subtree_end(store, index));
            }
        }
        match parent {
            Some(parent) => self.index_of(parent).map(|index| index + 1),
            None => Some(0),
        }
    }
}

/// Run of new contiguous entries waiting to be spliced in at one position.
#[derive(Clone, Debug)]
pub struct InsertBatch<Id> {
    insert_at: usize,
    ids: SmallVec<[Id; 16]>,
}

impl<Id: TreeId> InsertBatch<Id> {
    pub fn new(insert_at: usize) -> Self {
        Self {
            insert_at,
            ids: SmallVec::new(),
        }
    }

    #[inline]
    pub const fn insert_at(&self) -> usize {
        self.insert_at
    }

    /// Flat-list index the next entry of the batch will land on.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.insert_at + self.ids.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    #[inline]
    pub fn push(&mut self, id: Id) {
        self.ids.push(id);
    }

    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    pub fn range(&self) -> Range {
        Range::new(self.insert_at, self.next_index())
    }
}
