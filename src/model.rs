use std::fmt::Debug;
use std::hash::Hash;

use crate::node::TreeNode;

/// Bounds required from node identifiers.
pub trait TreeId: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> TreeId for T {}

/// Read-only tree contract used for traversal.
///
/// A proper forest is expected (not a DAG):
/// - no cycles (DFS traversal is used directly);
/// - each node has at most one parent;
/// - identifiers are stable for the node's lifetime.
pub trait TreeModel {
    /// Node identifier type.
    type Id: TreeId;

    /// Returns the top-level nodes in display order.
    fn roots(&self) -> &[Self::Id];
    /// Returns the node's children in display order.
    fn children(&self, id: Self::Id) -> &[Self::Id];
    /// Returns `true` if the node exists in the model.
    fn contains(&self, id: Self::Id) -> bool;
    /// Returns an approximate size hint (not required to be exact).
    fn size_hint(&self) -> usize {
        0
    }
}

/// Collects the nodes of `model` in pre-order, descending only where `descend` allows.
pub fn preorder<T, F>(model: &T, mut descend: F) -> Vec<T::Id>
where
    T: TreeModel,
    F: FnMut(T::Id) -> bool,
{
    let mut out = Vec::with_capacity(model.size_hint());
    let mut stack: Vec<T::Id> = model.roots().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        out.push(id);
        if descend(id) {
            stack.extend(model.children(id).iter().rev().copied());
        }
    }
    out
}

/// Plain node data as delivered by the application or server.
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        rename_all = "camelCase",
        default,
        bound(
            serialize = "Id: serde::Serialize",
            deserialize = "Id: serde::Deserialize<'de> + Default"
        )
    )
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeModel<Id> {
    pub id: Id,
    pub text: String,
    /// Position among the siblings; `None` appends.
    pub child_node_index: Option<usize>,
    pub expanded: bool,
    pub expanded_lazy: bool,
    pub lazy_expanding_enabled: bool,
    pub checked: bool,
    pub leaf: bool,
    pub enabled: bool,
    pub child_nodes: Vec<NodeModel<Id>>,
}

impl<Id: Default> Default for NodeModel<Id> {
    fn default() -> Self {
        Self::new(Id::default())
    }
}

impl<Id> NodeModel<Id> {
    /// Creates a model with default values (enabled, collapsed, no children).
    pub const fn new(id: Id) -> Self {
        Self {
            id,
            text: String::new(),
            child_node_index: None,
            expanded: false,
            expanded_lazy: false,
            lazy_expanding_enabled: false,
            checked: false,
            leaf: false,
            enabled: true,
            child_nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub const fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    #[must_use]
    pub const fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn leaf(mut self, leaf: bool) -> Self {
        self.leaf = leaf;
        self
    }

    #[must_use]
    pub const fn lazy_expanding(mut self, enabled: bool) -> Self {
        self.lazy_expanding_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.child_node_index = Some(index);
        self
    }

    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.child_nodes = children.into_iter().collect();
        self
    }
}

/// Creates tree nodes from plain models.
pub trait NodeFactory<Id: TreeId> {
    /// Returns a detached node for `model` with defaults applied.
    /// Structural links (parent, level, children) are set by the store.
    fn create_node(&self, model: &NodeModel<Id>) -> TreeNode<Id>;
}

impl<Id, F> NodeFactory<Id> for F
where
    Id: TreeId,
    F: Fn(&NodeModel<Id>) -> TreeNode<Id>,
{
    #[inline]
    fn create_node(&self, model: &NodeModel<Id>) -> TreeNode<Id> {
        self(model)
    }
}

/// Factory copying the model flags verbatim.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultNodeFactory;

impl<Id: TreeId> NodeFactory<Id> for DefaultNodeFactory {
    fn create_node(&self, model: &NodeModel<Id>) -> TreeNode<Id> {
        TreeNode::from_model(model)
    }
}
