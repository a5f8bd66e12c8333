use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the tree lays out its nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DisplayStyle {
    #[default]
    Default,
    /// Only the selection path is shown and the selected node is always expanded.
    Breadcrumb,
}

/// Tree-wide settings.
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Number of flat-list entries kept rendered around the scroll position.
    pub view_range_size: usize,
    /// Height of a row whose height was not measured.
    pub node_height: u32,
    pub display_style: DisplayStyle,
    pub checkable: bool,
    pub multi_check: bool,
    pub auto_check_children: bool,
    pub lazy_expanding_enabled: bool,
    pub animated: bool,
    pub expand_duration: Duration,
    pub slide_duration: Duration,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeConfig {
    pub const fn new() -> Self {
        Self {
            view_range_size: 20,
            node_height: 1,
            display_style: DisplayStyle::Default,
            checkable: false,
            multi_check: true,
            auto_check_children: false,
            lazy_expanding_enabled: true,
            animated: true,
            expand_duration: Duration::from_millis(200),
            slide_duration: Duration::from_millis(250),
        }
    }

    #[must_use]
    pub const fn view_range_size(mut self, size: usize) -> Self {
        self.view_range_size = size;
        self
    }

    #[must_use]
    pub const fn node_height(mut self, height: u32) -> Self {
        self.node_height = height;
        self
    }

    #[must_use]
    pub const fn display_style(mut self, style: DisplayStyle) -> Self {
        self.display_style = style;
        self
    }

    #[must_use]
    pub const fn checkable(mut self, checkable: bool) -> Self {
        self.checkable = checkable;
        self
    }

    #[must_use]
    pub const fn multi_check(mut self, multi_check: bool) -> Self {
        self.multi_check = multi_check;
        self
    }

    #[must_use]
    pub const fn auto_check_children(mut self, auto: bool) -> Self {
        self.auto_check_children = auto;
        self
    }

    #[must_use]
    pub const fn lazy_expanding(mut self, enabled: bool) -> Self {
        self.lazy_expanding_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}

/// Options of [`Tree::set_node_expanded`](crate::Tree::set_node_expanded).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpandOptions {
    /// `None` derives the lazy state from the node.
    pub lazy: Option<bool>,
    /// Play the expand/collapse transition if the node is attached.
    pub animate: bool,
    /// Collapse expanded children first.
    pub collapse_child_nodes: bool,
    /// Redecorate the node row after the change.
    pub render_expansion: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpandOptions {
    pub const fn new() -> Self {
        Self {
            lazy: None,
            animate: true,
            collapse_child_nodes: false,
            render_expansion: true,
        }
    }

    #[must_use]
    pub const fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = Some(lazy);
        self
    }

    #[must_use]
    pub const fn animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    #[must_use]
    pub const fn collapse_child_nodes(mut self, collapse: bool) -> Self {
        self.collapse_child_nodes = collapse;
        self
    }
}

/// Options of [`Tree::check_nodes`](crate::Tree::check_nodes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    pub checked: bool,
    /// Also check the children of each node; `None` follows the tree setting.
    pub check_children: Option<bool>,
    /// Skip disabled nodes.
    pub check_only_enabled: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckOptions {
    pub const fn new() -> Self {
        Self {
            checked: true,
            check_children: None,
            check_only_enabled: true,
        }
    }

    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub const fn check_children(mut self, check_children: bool) -> Self {
        self.check_children = Some(check_children);
        self
    }

    #[must_use]
    pub const fn check_only_enabled(mut self, only_enabled: bool) -> Self {
        self.check_only_enabled = only_enabled;
        self
    }
}
