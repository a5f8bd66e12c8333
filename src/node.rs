use crate::model::{NodeModel, TreeId};

/// A node owned by the [`NodeStore`](crate::store::NodeStore).
///
/// Structural fields (parent, children, level, child index) are maintained by the
/// store; state flags are maintained by the tree coordinator. Only presentation data
/// such as the text can be edited directly.
#[derive(Clone, Debug)]
pub struct TreeNode<Id> {
    pub(crate) id: Id,
    pub(crate) parent: Option<Id>,
    pub(crate) children: Vec<Id>,
    pub(crate) child_node_index: usize,
    pub(crate) level: u16,
    pub(crate) text: String,
    pub(crate) expanded: bool,
    pub(crate) expanded_lazy: bool,
    pub(crate) lazy_expanding_enabled: bool,
    pub(crate) checked: bool,
    pub(crate) children_checked: bool,
    pub(crate) filter_accepted: bool,
    pub(crate) filter_dirty: bool,
    pub(crate) leaf: bool,
    pub(crate) enabled: bool,
    // Measured row height, `None` while unknown.
    pub(crate) height: Option<u32>,
}

impl<Id: TreeId> TreeNode<Id> {
    /// Creates a detached, enabled, collapsed node.
    pub fn new(id: Id) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            child_node_index: 0,
            level: 0,
            text: String::new(),
            expanded: false,
            expanded_lazy: false,
            lazy_expanding_enabled: false,
            checked: false,
            children_checked: false,
            filter_accepted: true,
            filter_dirty: true,
            leaf: false,
            enabled: true,
            height: None,
        }
    }

    /// Creates a node carrying the flags of `model` (children are not copied).
    pub fn from_model(model: &NodeModel<Id>) -> Self {
        Self {
            text: model.text.clone(),
            child_node_index: model.child_node_index.unwrap_or(usize::MAX),
            expanded: model.expanded,
            expanded_lazy: model.expanded_lazy,
            lazy_expanding_enabled: model.lazy_expanding_enabled,
            checked: model.checked,
            leaf: model.leaf,
            enabled: model.enabled,
            ..Self::new(model.id)
        }
    }

    #[inline]
    pub const fn id(&self) -> Id {
        self.id
    }

    #[inline]
    pub const fn parent(&self) -> Option<Id> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[Id] {
        &self.children
    }

    #[inline]
    pub const fn child_node_index(&self) -> usize {
        self.child_node_index
    }

    #[inline]
    pub const fn level(&self) -> u16 {
        self.level
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[inline]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[inline]
    pub const fn is_expanded_lazy(&self) -> bool {
        self.expanded_lazy
    }

    /// Children of this node are reachable in the flat list.
    #[inline]
    pub const fn shows_children(&self) -> bool {
        self.expanded || self.expanded_lazy
    }

    #[inline]
    pub const fn is_lazy_expanding_enabled(&self) -> bool {
        self.lazy_expanding_enabled
    }

    #[inline]
    pub const fn is_checked(&self) -> bool {
        self.checked
    }

    #[inline]
    pub const fn is_children_checked(&self) -> bool {
        self.children_checked
    }

    #[inline]
    pub const fn is_filter_accepted(&self) -> bool {
        self.filter_accepted
    }

    #[inline]
    pub const fn is_filter_dirty(&self) -> bool {
        self.filter_dirty
    }

    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.leaf
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub const fn height(&self) -> Option<u32> {
        self.height
    }
}
