#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

use super::Tree;
use crate::action::{ActionOutcome, TreeAction};
use crate::animation::Animator;
use crate::config::{CheckOptions, ExpandOptions};
use crate::error::TreeError;
#[cfg(feature = "keymap")]
use crate::keymap::TreeKeyBindings;
use crate::model::TreeId;
use crate::render::RowRenderer;

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: Animator<R::Handle>,
{
    /// Applies a keyboard-level action to the primary selection.
    pub fn handle_action<C>(
        &mut self,
        action: TreeAction<C>,
    ) -> Result<ActionOutcome<C>, TreeError> {
        let handled = match action {
            TreeAction::SelectPrev => self.select_relative(-1)?,
            TreeAction::SelectNext => self.select_relative(1)?,
            TreeAction::SelectFirst => self.select_visible(self.flat.get(0))?,
            TreeAction::SelectLast => {
                let last = self.flat.len().checked_sub(1);
                self.select_visible(last.and_then(|last| self.flat.get(last)))?
            }
            TreeAction::SelectParent => {
                let parent = self.selected_node().and_then(|id| self.store.parent_of(id));
                self.select_visible(parent)?
            }
            TreeAction::SelectChild => self.select_child()?,
            TreeAction::ToggleNode => match self.selected_expandable() {
                Some((id, shows)) => {
                    self.set_node_expanded(id, !shows, ExpandOptions::new())?;
                    true
                }
                None => false,
            },
            TreeAction::ToggleRecursive => match self.selected_expandable() {
                Some((id, shows)) => {
                    self.set_node_expanded_recursive(id, !shows, ExpandOptions::new())?;
                    true
                }
                None => false,
            },
            TreeAction::ToggleCheck => match self.selected_node() {
                Some(id) if self.config.checkable => {
                    let checked = self.is_node_checked(id);
                    self.check_nodes(&[id], CheckOptions::new().checked(!checked))?;
                    true
                }
                _ => false,
            },
            TreeAction::ExpandAll => {
                let roots = self.store.root_ids().to_vec();
                for root in &roots {
                    let opts = ExpandOptions::new().animate(false);
                    self.set_node_expanded_recursive(*root, true, opts)?;
                }
                !roots.is_empty()
            }
            TreeAction::CollapseAll => {
                self.collapse_all()?;
                true
            }
            TreeAction::DeleteNode => {
                if self.selected_node().is_none() {
                    return Ok(ActionOutcome::Unhandled);
                }
                return Ok(ActionOutcome::Action(TreeAction::DeleteNode));
            }
            TreeAction::Custom(custom) => {
                return Ok(ActionOutcome::Action(TreeAction::Custom(custom)));
            }
        };
        Ok(if handled {
            ActionOutcome::Handled
        } else {
            ActionOutcome::Unhandled
        })
    }

    /// Resolves `key` through `bindings` and handles the resulting action.
    #[cfg(feature = "keymap")]
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        bindings: &TreeKeyBindings,
    ) -> Result<ActionOutcome, TreeError> {
        match bindings.resolve(key) {
            Some(action) => self.handle_action(action),
            None => Ok(ActionOutcome::Unhandled),
        }
    }

    fn select_relative(&mut self, delta: isize) -> Result<bool, TreeError> {
        let Some(current) = self.selected_node().and_then(|id| self.flat.index_of(id)) else {
            return self.select_visible(self.flat.get(0));
        };
        let target = current.checked_add_signed(delta).and_then(|index| self.flat.get(index));
        self.select_visible(target)
    }

    fn select_child(&mut self) -> Result<bool, TreeError> {
        let Some((id, shows)) = self.selected_expandable() else {
            return Ok(false);
        };
        if !shows {
            self.set_node_expanded(id, true, ExpandOptions::new())?;
            return Ok(true);
        }
        let child = self
            .store
            .siblings_of(Some(id))
            .iter()
            .copied()
            .find(|child| self.flat.contains(*child));
        self.select_visible(child)
    }

    fn select_visible(&mut self, id: Option<Id>) -> Result<bool, TreeError> {
        let Some(id) = id else {
            return Ok(false);
        };
        if self.selected_node() == Some(id) {
            return Ok(false);
        }
        self.select_node(id)?;
        self.scroll_to(id)?;
        Ok(true)
    }

    /// Selected node with children and whether it shows them.
    fn selected_expandable(&self) -> Option<(Id, bool)> {
        let node = self.store.get(self.selected_node()?)?;
        (!node.leaf && node.has_children()).then(|| (node.id, node.shows_children()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::abcd;
    use crate::action::{ActionOutcome, TreeAction};
    use crate::config::TreeConfig;

    #[test]
    fn navigation_walks_the_flat_list() {
        let mut tree = abcd(TreeConfig::default());
        let outcome = tree.handle_action::<()>(TreeAction::SelectNext).unwrap();
        assert_eq!(outcome, ActionOutcome::Handled);
        assert_eq!(tree.selected_node(), Some(1));
        let outcome = tree.handle_action::<()>(TreeAction::SelectNext).unwrap();
        assert_eq!(outcome, ActionOutcome::Unhandled);

        tree.handle_action::<()>(TreeAction::SelectChild).unwrap();
        assert!(tree.node(1).unwrap().is_expanded());
        tree.handle_action::<()>(TreeAction::SelectChild).unwrap();
        assert_eq!(tree.selected_node(), Some(2));
        tree.handle_action::<()>(TreeAction::SelectLast).unwrap();
        assert_eq!(tree.selected_node(), Some(3));
        tree.handle_action::<()>(TreeAction::SelectParent).unwrap();
        assert_eq!(tree.selected_node(), Some(1));
    }

    #[test]
    fn toggles_and_forwarded_actions() {
        let mut tree = abcd(TreeConfig::default().checkable(true));
        let outcome = tree.handle_action::<()>(TreeAction::ToggleNode).unwrap();
        assert_eq!(outcome, ActionOutcome::Unhandled);
        tree.select_node(1).unwrap();
        tree.handle_action::<()>(TreeAction::ToggleRecursive).unwrap();
        assert_eq!(tree.visible_nodes(), &[1, 2, 4, 3]);
        tree.handle_action::<()>(TreeAction::ToggleCheck).unwrap();
        assert!(tree.is_node_checked(1));
        assert_eq!(
            tree.handle_action(TreeAction::Custom(7u8)).unwrap(),
            ActionOutcome::Action(TreeAction::Custom(7))
        );
        assert_eq!(
            tree.handle_action::<()>(TreeAction::DeleteNode).unwrap(),
            ActionOutcome::Action(TreeAction::DeleteNode)
        );
        tree.handle_action::<()>(TreeAction::CollapseAll).unwrap();
        assert_eq!(tree.visible_nodes(), &[1]);
    }
}
