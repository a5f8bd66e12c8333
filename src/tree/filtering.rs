use tracing::debug_span;

use super::{TARGET, Tree};
use crate::animation::{AnimationKind, Animator};
use crate::config::{DisplayStyle, ExpandOptions};
use crate::error::TreeError;
use crate::filter::{BreadcrumbFilter, FilterHandle, NodeFilter};
use crate::model::TreeId;
use crate::render::RowRenderer;

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    /// Adds a filter and refilters the tree.
    pub fn add_filter<F>(&mut self, filter: F) -> Result<FilterHandle, TreeError>
    where
        F: NodeFilter<Id> + 'static,
    {
        let handle = self.add_filter_deferred(filter);
        self.filter_all()?;
        Ok(handle)
    }

    /// Adds a filter without refiltering; call [`filter`](Self::filter) afterwards.
    pub fn add_filter_deferred<F>(&mut self, filter: F) -> FilterHandle
    where
        F: NodeFilter<Id> + 'static,
    {
        self.filters.add(filter)
    }

    /// Removes a filter and refilters the tree. Unknown handles are ignored.
    pub fn remove_filter(&mut self, handle: FilterHandle) -> Result<(), TreeError> {
        if self.remove_filter_deferred(handle) {
            self.filter_all()?;
        }
        Ok(())
    }

    pub fn remove_filter_deferred(&mut self, handle: FilterHandle) -> bool {
        self.filters.remove(handle)
    }

    #[inline]
    pub fn has_filter(&self, handle: FilterHandle) -> bool {
        self.filters.contains(handle)
    }

    /// Re-evaluates every filter on the visible part of the tree.
    #[inline]
    pub fn filter(&mut self) -> Result<(), TreeError> {
        self.filter_all()
    }

    #[inline]
    pub const fn display_style(&self) -> DisplayStyle {
        self.config.display_style
    }

    pub fn set_display_style(&mut self, style: DisplayStyle) -> Result<(), TreeError> {
        if style == self.config.display_style {
            return Ok(());
        }
        self.config.display_style = style;
        match (style, self.breadcrumb_filter.take()) {
            (DisplayStyle::Breadcrumb, _) => {
                self.breadcrumb_filter = Some(self.filters.add(BreadcrumbFilter));
                if let Some(primary) = self.selection.primary() {
                    if !self.flat.contains(primary) {
                        self.expand_all_parent_nodes(primary)?;
                    }
                    self.set_node_expanded(primary, true, ExpandOptions::new().animate(false))?;
                }
            }
            (DisplayStyle::Default, Some(handle)) => {
                self.filters.remove(handle);
            }
            (DisplayStyle::Default, None) => {}
        }
        self.filter_all()?;
        self.viewport.invalidate();
        self.layout_invalid = true;
        Ok(())
    }

    /// Walks the tree from the roots and applies filter changes to the flat list.
    /// Subtrees of nodes that do not show their children are skipped. Nodes that get
    /// filtered out are deselected.
    pub(super) fn filter_all(&mut self) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "filter_all").entered();
        let show = self.transition(AnimationKind::SlideDown, true);
        let hide = self.transition(AnimationKind::SlideUp, true);
        let mut rejected = Vec::new();
        let mut stack: Vec<Id> = self.store.root_ids().iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.apply_filters(id)? {
                let accepted = self.store.node(id)?.filter_accepted;
                if accepted {
                    self.add_to_flat_list(id, show)?;
                } else {
                    rejected.push(id);
                    self.remove_from_flat_list(id, hide)?;
                }
            }
            let node = self.store.node(id)?;
            if node.filter_accepted && node.shows_children() {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        self.layout_invalid = true;
        let deselect: Vec<Id> = rejected
            .into_iter()
            .filter(|id| self.selection.contains(*id))
            .collect();
        if !deselect.is_empty() {
            self.deselect_nodes(&deselect, false)?;
        }
        Ok(())
    }
}
