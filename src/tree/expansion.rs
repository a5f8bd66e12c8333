use tracing::{debug, debug_span};

use super::{TARGET, Tree};
use crate::animation::{AnimationKind, Animator};
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
    pub fn expand_node(&mut self, id: Id) -> Result<(), TreeError> {
        self.set_node_expanded(id, true, ExpandOptions::new())
    }

    #[inline]
    pub fn collapse_node(&mut self, id: Id) -> Result<(), TreeError> {
        self.set_node_expanded(id, false, ExpandOptions::new())
    }

    /// Expands or collapses `id` and updates the flat list below it.
    ///
    /// With lazy expanding, only the children leading to the selection become visible
    /// until the node is expanded with `lazy(false)`. In breadcrumb display, nodes on the
    /// selection path cannot be collapsed.
    pub fn set_node_expanded(
        &mut self,
        id: Id,
        expanded: bool,
        opts: ExpandOptions,
    ) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "set_node_expanded", ?id, expanded).entered();
        let node = self.store.node(id)?;
        let (was_expanded, was_lazy) = (node.expanded, node.expanded_lazy);
        let mut expanded = expanded;
        if !expanded
            && self.config.display_style == DisplayStyle::Breadcrumb
            && self.is_on_selection_path(id)
        {
            debug!(target: TARGET, ?id, "collapse rejected on the breadcrumb path");
            expanded = true;
        }
        let lazy = match opts.lazy {
            Some(lazy) => lazy,
            None if expanded == was_expanded => was_lazy,
            None if expanded => node.lazy_expanding_enabled,
            None => false,
        };
        let lazy = lazy && expanded && self.lazy_expanding_enabled();

        if opts.collapse_child_nodes {
            let children = node.children.clone();
            let quiet = ExpandOptions {
                lazy: None,
                animate: false,
                collapse_child_nodes: true,
                render_expansion: false,
            };
            for child in children {
                if self.store.get(child).is_some_and(|child| child.shows_children()) {
                    self.set_node_expanded(child, false, quiet)?;
                }
            }
        }

        if was_expanded == expanded && was_lazy == lazy {
            return Ok(());
        }
        let node = self.store.node_mut(id)?;
        node.expanded = expanded;
        node.expanded_lazy = lazy;

        if !self.rebuild_suppressed {
            self.refresh_node(id, None, None)?;
            if expanded {
                // Also covers a change of the lazy flag alone, which flips the children.
                let transition = self.transition(AnimationKind::HeightOpen, opts.animate);
                self.add_children_to_flat_list(Some(id), transition)?;
            } else {
                let transition = self.transition(AnimationKind::HeightClose, opts.animate);
                self.remove_children_from_flat_list(Some(id), transition);
            }
            self.viewport.invalidate();
            self.layout_invalid = true;
        }
        if opts.render_expansion {
            self.decorate(id);
        }
        self.emit(TreeEvent::NodeExpanded {
            node: id,
            expanded,
            expanded_lazy: lazy,
        });
        Ok(())
    }

    /// Expands or collapses `id` and all its descendants.
    pub fn set_node_expanded_recursive(
        &mut self,
        id: Id,
        expanded: bool,
        opts: ExpandOptions,
    ) -> Result<(), TreeError> {
        let subtree = self.store.collect_subtree(&[id]);
        if expanded {
            // Parents first so every child is reachable when it is expanded.
            for node in subtree {
                if !self.store.node(node)?.leaf {
                    self.set_node_expanded(node, true, opts)?;
                }
            }
        } else {
            for node in subtree.into_iter().rev() {
                self.set_node_expanded(node, false, opts)?;
            }
        }
        Ok(())
    }

    /// Collapses every node, then rebuilds the flat list and the viewport once.
    pub fn collapse_all(&mut self) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "collapse_all").entered();
        let expanded = self
            .store
            .iter()
            .filter(|node| node.shows_children())
            .map(|node| node.id)
            .collect::<Vec<_>>();
        if expanded.is_empty() {
            return Ok(());
        }
        self.rebuild_suppressed = true;
        let result = expanded.iter().try_for_each(|id| {
            self.set_node_expanded(
                *id,
                false,
                ExpandOptions::new().animate(false),
            )
        });
        self.rebuild_suppressed = false;
        result?;
        self.rebuild_flat_list()?;
        self.rerender_viewport()
    }

    /// Expands the ancestors of the primary selection so that it becomes visible.
    pub(super) fn expand_all_parent_nodes(&mut self, id: Id) -> Result<(), TreeError> {
        let mut ancestors = self.store.ancestors(id);
        ancestors.reverse();
        for ancestor in ancestors {
            if self.store.node(ancestor)?.expanded {
                // Already expanded, possibly lazily: the selection changed what it shows.
                self.add_children_to_flat_list(Some(ancestor), None)?;
            } else {
                self.set_node_expanded(ancestor, true, ExpandOptions::new().animate(false))?;
            }
        }
        if !self.flat.contains(id) {
            self.add_to_flat_list(id, None)?;
        }
        self.viewport.invalidate();
        self.layout_invalid = true;
        Ok(())
    }

    fn is_on_selection_path(&self, id: Id) -> bool {
        self.selection.contains(id) || self.selection.is_ancestor_of_selection(&self.store, id)
    }
}
