use smallvec::SmallVec;
use tracing::debug_span;

use super::{TARGET, Tree};
use crate::animation::Animator;
use crate::config::{DisplayStyle, ExpandOptions};
use crate::error::TreeError;
use crate::event::TreeEvent;
use crate::model::TreeId;
use crate::render::RowRenderer;

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    #[inline]
    pub fn select_node(&mut self, id: Id) -> Result<(), TreeError> {
        self.select_nodes(vec![id])
    }

    /// Primary selection.
    #[inline]
    pub fn selected_node(&self) -> Option<Id> {
        self.selection.primary()
    }

    #[inline]
    pub fn is_node_selected(&self, id: Id) -> bool {
        self.selection.contains(id)
    }

    /// Replaces the selection. The first id is the primary selection; its ancestors are
    /// expanded until it is visible.
    pub fn select_nodes(&mut self, ids: Vec<Id>) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "select_nodes", count = ids.len()).entered();
        for id in &ids {
            self.store.node(*id)?;
        }
        let mut ids = ids;
        let mut seen = rustc_hash::FxHashSet::default();
        ids.retain(|id| seen.insert(*id));
        if self.selection.same_nodes(&ids) && self.selection.primary() == ids.first().copied() {
            return Ok(());
        }

        let previous: SmallVec<[Id; 4]> = self.selection.ids().iter().copied().collect();
        let lazy_parent_affected = previous
            .iter()
            .chain(ids.iter())
            .any(|id| self.has_lazy_parent(*id));
        self.selection.replace(ids, &self.store);
        self.emit(TreeEvent::NodesSelected {
            nodes: self.selection.ids().to_vec(),
        });
        for id in previous {
            self.decorate(id);
        }
        let selected: SmallVec<[Id; 4]> = self.selection.ids().iter().copied().collect();
        for id in selected {
            self.decorate(id);
        }

        if let Some(primary) = self.selection.primary() {
            if !self.flat.contains(primary) {
                self.expand_all_parent_nodes(primary)?;
            }
            if self.config.display_style == DisplayStyle::Breadcrumb {
                self.set_node_expanded(primary, true, ExpandOptions::new().animate(false))?;
            }
        }
        if self.config.display_style == DisplayStyle::Breadcrumb || lazy_parent_affected {
            self.filter_all()?;
        }
        self.layout_invalid = true;
        Ok(())
    }

    /// Removes `ids` from the selection; with `collect_children`, their selected
    /// descendants as well.
    pub fn deselect_nodes(&mut self, ids: &[Id], collect_children: bool) -> Result<(), TreeError> {
        let mut removed: rustc_hash::FxHashSet<Id> = ids.iter().copied().collect();
        if collect_children {
            removed.extend(
                self.selection
                    .ids()
                    .iter()
                    .copied()
                    .filter(|selected| {
                        ids.iter().any(|id| self.store.is_ancestor_of(*id, *selected))
                    }),
            );
        }
        let remaining: Vec<Id> = self
            .selection
            .ids()
            .iter()
            .copied()
            .filter(|id| !removed.contains(id))
            .collect();
        if remaining.len() == self.selection.ids().len() {
            return Ok(());
        }
        self.select_nodes(remaining)
    }

    pub fn deselect_all(&mut self) -> Result<(), TreeError> {
        self.select_nodes(Vec::new())
    }

    /// Drops deleted nodes from the selection without any further side effect.
    pub(super) fn forget_deleted_selection(&mut self) {
        if self.selection.retain_existing(&self.store) {
            self.emit(TreeEvent::NodesSelected {
                nodes: self.selection.ids().to_vec(),
            });
        }
    }

    fn has_lazy_parent(&self, id: Id) -> bool {
        self.store
            .parent_of(id)
            .and_then(|parent| self.store.get(parent))
            .is_some_and(|parent| parent.expanded_lazy)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{abcd, expected_flat_list};
    use crate::config::{DisplayStyle, TreeConfig};
    use crate::event::TreeEvent;

    #[test]
    fn selecting_a_hidden_node_expands_its_ancestors() {
        let mut tree = abcd(TreeConfig::default());
        tree.select_nodes(vec![4]).unwrap();
        assert!(tree.node(1).unwrap().is_expanded());
        assert!(tree.node(2).unwrap().is_expanded());
        assert_eq!(tree.visible_nodes(), &[1, 2, 4, 3]);
        assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    }

    #[test]
    fn reselecting_the_same_nodes_is_silent() {
        let mut tree = abcd(TreeConfig::default());
        tree.select_nodes(vec![1]).unwrap();
        tree.drain_events();
        tree.select_nodes(vec![1]).unwrap();
        assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn selection_is_decorated() {
        let mut tree = abcd(TreeConfig::default());
        tree.render().unwrap();
        tree.select_node(1).unwrap();
        assert!(tree.renderer().is_selected(1));
        tree.deselect_all().unwrap();
        assert!(!tree.renderer().is_selected(1));
        assert_eq!(tree.selected_node(), None);
    }

    #[test]
    fn deselect_can_collect_children() {
        let mut tree = abcd(TreeConfig::default());
        tree.select_nodes(vec![2, 4, 3]).unwrap();
        tree.deselect_nodes(&[2], true).unwrap();
        assert_eq!(tree.selection().ids(), &[3]);
        assert!(!tree.is_node_selected(4));
    }

    #[test]
    fn breadcrumb_shows_only_the_selection_path() {
        let mut tree = abcd(TreeConfig::default().display_style(DisplayStyle::Breadcrumb));
        assert_eq!(tree.visible_nodes(), &[1]);
        tree.select_node(2).unwrap();
        assert!(tree.node(2).unwrap().is_expanded());
        assert_eq!(tree.visible_nodes(), &[1, 2, 4]);
        assert_eq!(
            tree.drain_events()
                .iter()
                .filter(|event| matches!(event, TreeEvent::NodesSelected { .. }))
                .count(),
            1
        );
    }
}
