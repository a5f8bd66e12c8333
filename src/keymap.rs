use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::TreeAction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    #[default]
    Default,
    Vim,
    Arrows,
}

#[derive(Clone, Copy, Debug)]
pub struct TreeKeyBindings {
    profile: KeymapProfile,
}

impl Default for TreeKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    pub fn resolve<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        if key.modifiers.contains(KeyModifiers::SHIFT) {
            match key.code {
                KeyCode::Up => return Some(TreeAction::SelectFirst),
                KeyCode::Down => return Some(TreeAction::SelectLast),
                KeyCode::Right => return Some(TreeAction::ToggleRecursive),
                _ => {}
            }
        }

        let nav_action = match self.profile {
            KeymapProfile::Default => self.resolve_default_nav(key),
            KeymapProfile::Vim => self.resolve_vim_nav(key),
            KeymapProfile::Arrows => self.resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }

        self.resolve_common(key)
    }

    pub fn resolve_with<C, F>(&self, key: KeyEvent, custom: F) -> Option<TreeAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        if let Some(action) = custom(key) {
            return Some(TreeAction::Custom(action));
        }

        self.resolve(key)
    }

    const fn resolve_default_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(TreeAction::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(TreeAction::SelectNext),
            KeyCode::Left | KeyCode::Char('h') => Some(TreeAction::SelectParent),
            KeyCode::Right | KeyCode::Char('l') => Some(TreeAction::SelectChild),
            _ => None,
        }
    }

    const fn resolve_vim_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Char('k') => Some(TreeAction::SelectPrev),
            KeyCode::Char('j') => Some(TreeAction::SelectNext),
            KeyCode::Char('h') => Some(TreeAction::SelectParent),
            KeyCode::Char('l') => Some(TreeAction::SelectChild),
            _ => None,
        }
    }

    const fn resolve_arrow_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up => Some(TreeAction::SelectPrev),
            KeyCode::Down => Some(TreeAction::SelectNext),
            KeyCode::Left => Some(TreeAction::SelectParent),
            KeyCode::Right => Some(TreeAction::SelectChild),
            _ => None,
        }
    }

    fn resolve_common<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Char(' ' | 'x') => Some(TreeAction::ToggleCheck),
            KeyCode::Enter => Some(TreeAction::ToggleNode),
            KeyCode::Char('*') => Some(TreeAction::ToggleRecursive),
            KeyCode::Char('E') => Some(TreeAction::ExpandAll),
            KeyCode::Char('C' | '-') => Some(TreeAction::CollapseAll),
            KeyCode::Delete | KeyCode::Char('D') => Some(TreeAction::DeleteNode),
            KeyCode::Home | KeyCode::Char('g') => Some(TreeAction::SelectFirst),
            KeyCode::End | KeyCode::Char('G') => Some(TreeAction::SelectLast),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::{KeymapProfile, TreeKeyBindings};
    use crate::action::TreeAction;

    #[test]
    fn profiles_differ_on_letter_navigation() {
        let j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        let arrows = TreeKeyBindings::with_profile(KeymapProfile::Arrows);
        assert_eq!(TreeKeyBindings::new().resolve::<()>(j), Some(TreeAction::SelectNext));
        assert_eq!(arrows.resolve::<()>(j), None);
    }

    #[test]
    fn custom_resolver_wins() {
        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        let bindings = TreeKeyBindings::new();
        assert_eq!(bindings.resolve::<()>(key), Some(TreeAction::ToggleCheck));
        assert_eq!(
            bindings.resolve_with(key, |_| Some("open")),
            Some(TreeAction::Custom("open"))
        );
    }
}
