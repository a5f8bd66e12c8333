use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, debug_span};

use super::{TARGET, Tree};
use crate::animation::Animator;
use crate::config::CheckOptions;
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
    pub fn check_node(&mut self, id: Id) -> Result<(), TreeError> {
        self.check_nodes(&[id], CheckOptions::new())
    }

    /// Sets the check state of `ids`.
    ///
    /// In single-check mode checking a node unchecks the previously checked ones in the
    /// same update. Emits one `NodesChecked` event listing every node that changed.
    pub fn check_nodes(&mut self, ids: &[Id], opts: CheckOptions) -> Result<(), TreeError> {
        let _span =
            debug_span!(target: TARGET, "check_nodes", count = ids.len(), checked = opts.checked)
                .entered();
        if !self.config.checkable {
            debug!(target: TARGET, "tree is not checkable");
            return Ok(());
        }
        for id in ids {
            self.store.node(*id)?;
        }
        let check_children = opts.check_children.unwrap_or(self.config.auto_check_children);
        let targets = if check_children {
            self.store.collect_subtree(ids)
        } else {
            ids.to_vec()
        };

        let mut updated: Vec<Id> = Vec::new();
        if opts.checked && !self.config.multi_check {
            // Only the first target may end up checked.
            let Some(&target) = targets.iter().find(|id| self.is_checkable(**id, opts)) else {
                return Ok(());
            };
            let previous: Vec<Id> =
                self.checked.iter().copied().filter(|id| *id != target).collect();
            for id in previous {
                if self.set_checked(id, false)? {
                    updated.push(id);
                }
            }
            if self.set_checked(target, true)? {
                updated.push(target);
            }
        } else {
            for id in targets {
                if self.is_checkable(id, opts) && self.set_checked(id, opts.checked)? {
                    updated.push(id);
                }
            }
        }
        if updated.is_empty() {
            return Ok(());
        }
        self.update_children_checked(&updated);
        for id in &updated {
            self.decorate(*id);
        }
        self.emit(TreeEvent::NodesChecked { nodes: updated });
        Ok(())
    }

    /// Unchecks `ids`; with `collect_children`, their checked descendants as well.
    pub fn uncheck_nodes(&mut self, ids: &[Id], collect_children: bool) -> Result<(), TreeError> {
        let opts = CheckOptions::new().checked(false).check_children(collect_children);
        self.check_nodes(ids, opts)
    }

    pub fn is_node_checked(&self, id: Id) -> bool {
        self.store.get(id).is_some_and(|node| node.checked)
    }

    fn is_checkable(&self, id: Id, opts: CheckOptions) -> bool {
        self.store
            .get(id)
            .is_some_and(|node| node.enabled || !opts.check_only_enabled)
    }

    /// Returns `true` if the flag changed.
    fn set_checked(&mut self, id: Id, checked: bool) -> Result<bool, TreeError> {
        let node = self.store.node_mut(id)?;
        if node.checked == checked {
            return Ok(false);
        }
        node.checked = checked;
        if checked {
            self.checked.push(id);
        } else {
            self.checked.retain(|candidate| *candidate != id);
        }
        Ok(true)
    }

    /// Recomputes `children_checked` bottom-up along the ancestor chains of `changed`,
    /// stopping at the first ancestor whose flag does not change.
    pub(super) fn update_children_checked(&mut self, changed: &[Id]) {
        let mut parents: SmallVec<[Id; 8]> = SmallVec::new();
        let mut seen = FxHashSet::default();
        for id in changed {
            if let Some(parent) = self.store.parent_of(*id) {
                if seen.insert(parent) {
                    parents.push(parent);
                }
            }
        }
        // Deepest first, so a parent sees the updated flags of its children.
        parents.sort_by_key(|id| std::cmp::Reverse(self.store.level_of(*id)));
        for parent in parents {
            self.refresh_children_checked(parent);
        }
    }

    pub(super) fn refresh_children_checked(&mut self, start: Id) {
        let mut current = Some(start);
        while let Some(id) = current {
            let children = self.store.siblings_of(Some(id));
            let value = children.iter().any(|child| {
                self.store
                    .get(*child)
                    .is_some_and(|child| child.checked || child.children_checked)
            });
            let Some(node) = self.store.get_mut(id) else {
                return;
            };
            if node.children_checked == value {
                return;
            }
            node.children_checked = value;
            current = node.parent;
            self.decorate(id);
        }
    }
}
