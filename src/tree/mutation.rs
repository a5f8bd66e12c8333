use rustc_hash::FxHashSet;
use tracing::{debug, debug_span};

use super::{TARGET, Tree};
use crate::animation::{AnimationKind, Animator};
use crate::error::TreeError;
use crate::event::TreeEvent;
use crate::model::{NodeModel, TreeId};
use crate::node::TreeNode;
use crate::render::RowRenderer;

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    /// Inserts `models` (with their children) below `parent`, or as roots.
    ///
    /// Each model lands at its `child_node_index`, or at the end. Visible new nodes enter
    /// the flat list in pre-order position.
    pub fn insert_nodes(
        &mut self,
        models: Vec<NodeModel<Id>>,
        parent: Option<Id>,
    ) -> Result<(), TreeError> {
        let _span =
            debug_span!(target: TARGET, "insert_nodes", count = models.len(), ?parent).entered();
        if let Some(parent) = parent {
            self.store.node(parent)?;
        }
        self.store.check_insertable(&models)?;
        let inserted = self.store.insert_models(&*self.factory, &models, parent)?;
        let checked: Vec<Id> = self
            .store
            .collect_subtree(&inserted)
            .into_iter()
            .filter(|id| self.store.get(*id).is_some_and(|node| node.checked))
            .collect();
        if !checked.is_empty() {
            self.checked.extend(checked.iter().copied());
            self.update_children_checked(&checked);
        }

        let transition = self.transition(AnimationKind::SlideDown, true);
        self.add_children_to_flat_list(parent, transition)?;
        self.selection.update_path(&self.store);
        if let Some(parent) = parent {
            self.decorate(parent);
        }
        self.layout_invalid = true;
        self.emit(TreeEvent::NodesInserted {
            nodes: inserted,
            parent,
        });
        Ok(())
    }

    /// Deletes `ids` with their subtrees. Every id must be a child of `parent` (a root
    /// for `None`); nothing is deleted otherwise.
    pub fn delete_nodes(&mut self, ids: &[Id], parent: Option<Id>) -> Result<(), TreeError> {
        let _span =
            debug_span!(target: TARGET, "delete_nodes", count = ids.len(), ?parent).entered();
        if let Some(parent) = parent {
            self.store.node(parent)?;
        }
        for id in ids {
            if self.store.node(*id)?.parent != parent {
                return Err(TreeError::unexpected_parent(*id, parent));
            }
        }
        let mut seen = FxHashSet::default();
        let ids: Vec<Id> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Ok(());
        }
        self.remove_subtrees(&ids, parent)?;
        self.emit(TreeEvent::NodesDeleted { nodes: ids, parent });
        Ok(())
    }

    /// Deletes every child of `parent`, or every root for `None`.
    pub fn delete_all_child_nodes(&mut self, parent: Option<Id>) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "delete_all_child_nodes", ?parent).entered();
        if let Some(parent) = parent {
            self.store.node(parent)?;
        }
        let children = self.store.siblings_of(parent).to_vec();
        if !children.is_empty() {
            self.remove_subtrees(&children, parent)?;
        }
        self.emit(TreeEvent::AllChildNodesDeleted { parent });
        Ok(())
    }

    fn remove_subtrees(&mut self, ids: &[Id], parent: Option<Id>) -> Result<(), TreeError> {
        let transition = self.transition(AnimationKind::SlideUp, true);
        let mut deleted = Vec::new();
        for id in ids {
            self.remove_from_flat_list(*id, transition)?;
            deleted.extend(self.store.remove_subtree(*id));
        }
        let (viewport, mut cx) = self.parts();
        viewport.forget(&mut cx, &deleted);

        let gone: FxHashSet<Id> = deleted.iter().copied().collect();
        self.checked.retain(|id| !gone.contains(id));
        self.store.update_child_node_index(parent, 0);
        self.forget_deleted_selection();
        self.selection.update_path(&self.store);
        if let Some(parent) = parent {
            self.refresh_children_checked(parent);
            self.decorate(parent);
        }
        self.layout_invalid = true;
        Ok(())
    }

    /// Reorders the children of `parent` (the roots for `None`). `order` must be a
    /// permutation of the current children.
    pub fn update_node_order(
        &mut self,
        order: Vec<Id>,
        parent: Option<Id>,
    ) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "update_node_order", ?parent).entered();
        if let Some(parent) = parent {
            self.store.node(parent)?;
        }
        let current = self.store.siblings_of(parent);
        if current.len() != order.len() {
            return Err(TreeError::ChildCountMismatch {
                expected: current.len(),
                actual: order.len(),
            });
        }
        let current_set: FxHashSet<Id> = current.iter().copied().collect();
        let order_set: FxHashSet<Id> = order.iter().copied().collect();
        if current_set != order_set {
            return Err(TreeError::ChildSetMismatch);
        }
        if current == order.as_slice() {
            return Ok(());
        }

        self.remove_children_from_flat_list(parent, None);
        self.store.set_children(parent, order)?;
        self.add_children_to_flat_list(parent, None)?;
        self.viewport.invalidate();
        self.layout_invalid = true;
        self.emit(TreeEvent::ChildNodeOrderChanged { parent });
        Ok(())
    }

    /// Applies the `leaf`, `enabled` and lazy-expanding flags of `models` to the nodes
    /// with the same id. Unknown ids are skipped.
    pub fn update_nodes(&mut self, models: Vec<NodeModel<Id>>) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "update_nodes", count = models.len()).entered();
        let mut updated = Vec::with_capacity(models.len());
        for model in &models {
            let Some(node) = self.store.get_mut(model.id) else {
                debug!(target: TARGET, id = ?model.id, "update for unknown node skipped");
                continue;
            };
            node.leaf = model.leaf;
            node.enabled = model.enabled;
            if node.lazy_expanding_enabled != model.lazy_expanding_enabled {
                node.lazy_expanding_enabled = model.lazy_expanding_enabled;
                if !model.lazy_expanding_enabled && node.expanded_lazy {
                    node.expanded_lazy = false;
                    // The lazy filter no longer hides any of the children.
                    let (id, shows_children) = (node.id, node.shows_children());
                    if shows_children {
                        self.add_children_to_flat_list(Some(id), None)?;
                    } else {
                        self.remove_children_from_flat_list(Some(id), None);
                    }
                }
            }
            updated.push(model.id);
        }
        self.refresh_nodes(&updated)?;
        self.emit(TreeEvent::NodesUpdated { nodes: updated });
        Ok(())
    }

    /// Edits a node in place, then refilters it and emits `NodeChanged`.
    pub fn change_node<F>(&mut self, id: Id, edit: F) -> Result<(), TreeError>
    where
        F: FnOnce(&mut TreeNode<Id>),
    {
        let node = self.store.node_mut(id)?;
        edit(node);
        self.refresh_nodes(&[id])?;
        self.emit(TreeEvent::NodeChanged { node: id });
        Ok(())
    }

    fn refresh_nodes(&mut self, ids: &[Id]) -> Result<(), TreeError> {
        let show = self.transition(AnimationKind::SlideDown, true);
        let hide = self.transition(AnimationKind::SlideUp, true);
        let mut hidden = Vec::new();
        for id in ids {
            if self.is_reachable(*id) {
                hidden.extend(self.refresh_node(*id, show, hide)?);
            }
            self.decorate(*id);
        }
        self.layout_invalid = true;
        let deselect: Vec<Id> = hidden
            .into_iter()
            .filter(|id| self.selection.contains(*id))
            .collect();
        if !deselect.is_empty() {
            self.deselect_nodes(&deselect, false)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{abcd, expected_flat_list, wide};
    use crate::config::TreeConfig;
    use crate::error::TreeError;
    use crate::event::TreeEvent;
    use crate::model::NodeModel;

    #[test]
    fn insert_at_child_index_keeps_preorder() {
        let mut tree = abcd(TreeConfig::default());
        tree.set_node_expanded_recursive(1, true, Default::default()).unwrap();
        tree.insert_nodes(vec![NodeModel::new(5).text("E").at_index(1)], Some(1)).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 2, 4, 5, 3]);
        assert_eq!(tree.node(3).unwrap().child_node_index(), 2);
        assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    }

    #[test]
    fn duplicate_insert_is_rejected_without_changes() {
        let mut tree = abcd(TreeConfig::default());
        let err = tree.insert_nodes(vec![NodeModel::new(9), NodeModel::new(2)], None).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateNode(_)));
        assert!(tree.node(9).is_none());
    }

    #[test]
    fn delete_removes_subtree_selection_and_checks() {
        let mut tree = abcd(TreeConfig::default().checkable(true));
        tree.render().unwrap();
        tree.select_node(4).unwrap();
        tree.check_node(4).unwrap();
        tree.validate_layout().unwrap();
        tree.drain_events();

        tree.delete_nodes(&[2], Some(1)).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 3]);
        assert!(tree.node(4).is_none());
        assert!(tree.checked_nodes().is_empty());
        assert!(!tree.node(1).unwrap().is_children_checked());
        assert_eq!(tree.selected_node(), None);
        assert_eq!(tree.node(3).unwrap().child_node_index(), 0);
        assert_eq!(tree.renderer().live_rows(), 2);
        let events = tree.drain_events();
        assert!(events.contains(&TreeEvent::NodesDeleted {
            nodes: vec![2],
            parent: Some(1),
        }));
    }

    #[test]
    fn delete_with_wrong_parent_fails() {
        let mut tree = abcd(TreeConfig::default());
        let err = tree.delete_nodes(&[4], Some(1)).unwrap_err();
        assert!(matches!(err, TreeError::UnexpectedParent { .. }));
        assert!(tree.node(4).is_some());
    }

    #[test]
    fn delete_all_child_nodes_emits_one_event() {
        let mut tree = wide(2, 3, TreeConfig::default());
        tree.expand_node(0).unwrap();
        tree.drain_events();
        tree.delete_all_child_nodes(Some(0)).unwrap();
        assert_eq!(tree.visible_nodes(), &[0, 1000]);
        assert_eq!(tree.drain_events(), vec![TreeEvent::AllChildNodesDeleted { parent: Some(0) }]);
    }

    #[test]
    fn reorder_validates_and_relinearizes() {
        let mut tree = abcd(TreeConfig::default());
        tree.set_node_expanded_recursive(1, true, Default::default()).unwrap();
        assert_eq!(
            tree.update_node_order(vec![3], Some(1)),
            Err(TreeError::ChildCountMismatch { expected: 2, actual: 1 })
        );
        assert_eq!(tree.update_node_order(vec![3, 4], Some(1)), Err(TreeError::ChildSetMismatch));

        tree.update_node_order(vec![3, 2], Some(1)).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 3, 2, 4]);
        assert_eq!(tree.node(3).unwrap().child_node_index(), 0);
        assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    }

    #[test]
    fn update_nodes_skips_unknown_ids() {
        let mut tree = abcd(TreeConfig::default());
        tree.drain_events();
        tree.update_nodes(vec![NodeModel::new(3).leaf(true), NodeModel::new(42)]).unwrap();
        assert!(tree.node(3).unwrap().is_leaf());
        assert_eq!(tree.drain_events(), vec![TreeEvent::NodesUpdated { nodes: vec![3] }]);
    }

    #[test]
    fn change_node_refilters() {
        let mut tree = abcd(TreeConfig::default());
        tree.expand_node(1).unwrap();
        tree.add_filter(crate::filter::TextFilter::new("c")).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 3]);
        tree.change_node(2, |node| node.set_text("cc")).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 2, 3]);
    }
}
