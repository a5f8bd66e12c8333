use rustc_hash::FxHashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug_span;

use super::{TARGET, Tree};
use crate::animation::Animator;
use crate::error::TreeError;
use crate::model::TreeId;
use crate::render::RowRenderer;

/// Snapshot of the view state (expansion, selection, checks, scroll offset).
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeSnapshot<Id> {
    /// Expanded nodes, fully expanded ones only.
    pub expanded: Vec<Id>,
    /// Lazily expanded nodes.
    pub expanded_lazy: Vec<Id>,
    /// Selection, primary first.
    pub selected: Vec<Id>,
    /// Checked nodes in check order.
    pub checked: Vec<Id>,
    pub scroll_top: u32,
}

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    pub fn snapshot(&self) -> TreeSnapshot<Id> {
        let mut expanded = Vec::new();
        let mut expanded_lazy = Vec::new();
        self.store.visit_nodes(self.store.root_ids(), |node| {
            if node.expanded_lazy {
                expanded_lazy.push(node.id);
            } else if node.expanded {
                expanded.push(node.id);
            }
            false
        });
        TreeSnapshot {
            expanded,
            expanded_lazy,
            selected: self.selection.ids().to_vec(),
            checked: self.checked.clone(),
            scroll_top: self.scroll_top,
        }
    }

    /// Restores a snapshot taken with [`snapshot`](Self::snapshot). Ids that no longer
    /// exist are skipped. No events are emitted; the flat list and the viewport are
    /// rebuilt from scratch.
    pub fn restore(&mut self, snapshot: TreeSnapshot<Id>) -> Result<(), TreeError> {
        let _span = debug_span!(target: TARGET, "restore").entered();
        let expanded: FxHashSet<Id> = snapshot.expanded.iter().copied().collect();
        let lazy: FxHashSet<Id> = snapshot.expanded_lazy.iter().copied().collect();
        let checked: FxHashSet<Id> = snapshot.checked.iter().copied().collect();
        let ids: Vec<Id> = self.store.iter().map(|node| node.id).collect();
        for id in ids {
            let node = self.store.node_mut(id)?;
            node.expanded_lazy = lazy.contains(&id) && self.config.lazy_expanding_enabled;
            node.expanded = expanded.contains(&id) || lazy.contains(&id);
            node.checked = checked.contains(&id);
            node.children_checked = false;
        }
        self.checked = snapshot
            .checked
            .into_iter()
            .filter(|id| self.store.get(*id).is_some())
            .collect();
        let marked = self.checked.clone();
        for id in marked {
            for ancestor in self.store.ancestors(id) {
                if let Some(node) = self.store.get_mut(ancestor) {
                    node.children_checked = true;
                }
            }
        }
        let selected: Vec<Id> = snapshot
            .selected
            .into_iter()
            .filter(|id| self.store.get(*id).is_some())
            .collect();
        self.selection.replace(selected, &self.store);
        self.scroll_top = snapshot.scroll_top;
        self.rebuild_flat_list()?;
        self.rerender_viewport()
    }
}
