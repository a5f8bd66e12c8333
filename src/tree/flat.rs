use tracing::trace;

use super::{TARGET, Tree};
use crate::animation::Animator;
use crate::error::TreeError;
use crate::flat_list::InsertBatch;
use crate::model::TreeId;
use crate::node::TreeNode;
use crate::range::Range;
use crate::render::RowRenderer;
use crate::viewport::Transition;

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    /// Re-evaluates the filter chain for `id`. Returns `true` if its state changed.
    pub(super) fn apply_filters(&mut self, id: Id) -> Result<bool, TreeError> {
        self.filters.apply_for_node(
            &mut self.store,
            &self.selection,
            self.config.lazy_expanding_enabled,
            id,
        )
    }

    pub(super) fn is_accepted(&mut self, id: Id) -> Result<bool, TreeError> {
        self.apply_filters(id)?;
        Ok(self.store.node(id)?.filter_accepted)
    }

    /// Returns `true` if every ancestor of `id` is visible and shows its children.
    pub(super) fn is_reachable(&self, id: Id) -> bool {
        match self.store.parent_of(id) {
            None => true,
            Some(parent) => {
                self.flat.contains(parent)
                    && self.store.get(parent).is_some_and(TreeNode::shows_children)
            }
        }
    }

    /// Brings the flat-list membership of `id` in line with its filter state.
    ///
    /// Returns the ids that left the flat list.
    pub(super) fn refresh_node(
        &mut self,
        id: Id,
        show: Option<Transition>,
        hide: Option<Transition>,
    ) -> Result<Vec<Id>, TreeError> {
        let accepted = self.is_accepted(id)?;
        let present = self.flat.contains(id);
        if accepted && !present {
            self.add_to_flat_list(id, show)?;
        } else if !accepted && present {
            return self.remove_from_flat_list(id, hide);
        }
        Ok(Vec::new())
    }

    /// Recomputes the whole flat list. The viewport is rebuilt on the next render.
    pub(super) fn rebuild_flat_list(&mut self) -> Result<(), TreeError> {
        self.flat.clear();
        self.viewport.invalidate();
        self.layout_invalid = true;
        self.add_children_to_flat_list(None, None)
    }

    /// Adds `id` and its visible descendants, if it is accepted and reachable.
    pub(super) fn add_to_flat_list(
        &mut self,
        id: Id,
        transition: Option<Transition>,
    ) -> Result<(), TreeError> {
        if self.flat.contains(id) || !self.is_reachable(id) {
            return Ok(());
        }
        let mut batch = None;
        self.add_nodes(&[id], &mut batch, transition)?;
        self.flush_batch(&mut batch, transition)
    }

    /// Brings the children of `parent` (the roots for `None`) and their visible
    /// descendants up to date: present children that are no longer accepted are removed,
    /// new accepted ones are inserted in batches.
    pub(super) fn add_children_to_flat_list(
        &mut self,
        parent: Option<Id>,
        transition: Option<Transition>,
    ) -> Result<(), TreeError> {
        if let Some(parent) = parent {
            let node = self.store.node(parent)?;
            if !node.shows_children() || !self.flat.contains(parent) {
                return Ok(());
            }
        }
        let children = self.store.siblings_of(parent).to_vec();
        let mut batch = None;
        self.add_nodes(&children, &mut batch, transition)?;
        self.flush_batch(&mut batch, transition)
    }

    fn add_nodes(
        &mut self,
        ids: &[Id],
        batch: &mut Option<InsertBatch<Id>>,
        transition: Option<Transition>,
    ) -> Result<(), TreeError> {
        for &id in ids {
            let accepted = self.is_accepted(id)?;
            if self.flat.contains(id) {
                self.flush_batch(batch, transition)?;
                if !accepted {
                    self.remove_from_flat_list(id, transition.map(Transition::reversed))?;
                    continue;
                }
            } else {
                if !accepted {
                    continue;
                }
                if batch.is_none() {
                    let Some(at) = self.flat.find_insert_position(&self.store, id) else {
                        continue;
                    };
                    *batch = Some(InsertBatch::new(at));
                }
                if let Some(pending) = batch.as_mut() {
                    pending.push(id);
                }
                if self.batch_reaches_window_end(batch.as_ref()) {
                    self.flush_batch(batch, transition)?;
                }
            }
            let node = self.store.node(id)?;
            if node.shows_children() && !node.children.is_empty() {
                let children = node.children.clone();
                self.add_nodes(&children, batch, transition)?;
            }
        }
        Ok(())
    }

    /// A batch that would be attached must not grow past the end of the render window.
    fn batch_reaches_window_end(&self, batch: Option<&InsertBatch<Id>>) -> bool {
        let Some(batch) = batch else {
            return false;
        };
        if !self.rendered
            || self.viewport.is_dirty()
            || !self.viewport.attaches_at(batch.insert_at())
        {
            return false;
        }
        batch.next_index() >= self.viewport.rendered().from + self.viewport.view_range_size()
    }

    fn flush_batch(
        &mut self,
        batch: &mut Option<InsertBatch<Id>>,
        transition: Option<Transition>,
    ) -> Result<(), TreeError> {
        let Some(batch) = batch.take() else {
            return Ok(());
        };
        if batch.is_empty() {
            return Ok(());
        }
        self.flat.insert_slice(batch.insert_at(), batch.ids());
        trace!(
            target: TARGET,
            "{} new nodes inserted into the flat list at {}",
            batch.len(),
            batch.insert_at()
        );
        let (viewport, mut cx) = self.parts();
        viewport.rows_inserted(&mut cx, batch.insert_at(), batch.len(), transition)
    }

    /// Removes `id` with its visible subtree. Returns the removed ids.
    pub(super) fn remove_from_flat_list(
        &mut self,
        id: Id,
        transition: Option<Transition>,
    ) -> Result<Vec<Id>, TreeError> {
        let Some(range) = self.flat.subtree_range(&self.store, id) else {
            return Ok(Vec::new());
        };
        Ok(self.remove_flat_range(range, transition))
    }

    /// Removes the visible descendants of `parent`, or every entry for `None`.
    pub(super) fn remove_children_from_flat_list(
        &mut self,
        parent: Option<Id>,
        transition: Option<Transition>,
    ) -> Vec<Id> {
        let range = match parent {
            Some(parent) => {
                let Some(index) = self.flat.index_of(parent) else {
                    return Vec::new();
                };
                Range::new(index + 1, self.flat.subtree_end(&self.store, index))
            }
            None => Range::new(0, self.flat.len()),
        };
        self.remove_flat_range(range, transition)
    }

    fn remove_flat_range(&mut self, range: Range, transition: Option<Transition>) -> Vec<Id> {
        if range.is_empty() {
            return Vec::new();
        }
        let removed = self.flat.remove_range(range);
        trace!(target: TARGET, "{} nodes removed from the flat list at {}", removed.len(), range);
        let (viewport, mut cx) = self.parts();
        viewport.rows_removed(&mut cx, range, &removed, transition);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{abcd, expected_flat_list, wide};
    use crate::config::TreeConfig;
    use crate::model::NodeModel;
    use crate::range::Range;

    #[test]
    fn expanding_inserts_children_after_parent() {
        let mut tree = abcd(TreeConfig::default());
        tree.expand_node(1).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 2, 3]);
        tree.expand_node(2).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 2, 4, 3]);
        assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    }

    #[test]
    fn collapsing_removes_the_whole_visible_subtree() {
        let mut tree = abcd(TreeConfig::default());
        tree.expand_node(1).unwrap();
        tree.expand_node(2).unwrap();
        tree.collapse_node(1).unwrap();
        assert_eq!(tree.visible_nodes(), &[1]);
        assert!(!tree.is_visible(4));
        assert!(tree.node(2).unwrap().is_expanded());
    }

    #[test]
    fn batch_is_flushed_at_the_window_end() {
        let mut tree = wide(1, 30, TreeConfig::default().view_range_size(10));
        tree.set_view_height(5);
        tree.render().unwrap();
        tree.drain_events();
        tree.renderer_mut().clear_log();

        tree.expand_node(0).unwrap();
        assert_eq!(tree.visible_nodes().len(), 31);
        // Only the window starting at the root gets rows.
        assert_eq!(tree.renderer().rendered_log().len(), 9);
        assert_eq!(tree.viewport().rendered(), Range::new(0, 10));
    }

    #[test]
    fn rejected_present_children_are_removed() {
        let mut tree = abcd(TreeConfig::default());
        tree.expand_node(1).unwrap();
        tree.add_filter(|node: &crate::TreeNode<u32>| node.id() != 3).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 2]);
        tree.insert_nodes(vec![NodeModel::new(5).at_index(0)], Some(1)).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 5, 2]);
        assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    }
}
