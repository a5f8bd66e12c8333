#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Change notification emitted by the tree, drained with
/// [`Tree::drain_events`](crate::Tree::drain_events).
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeEvent<Id> {
    NodesInserted { nodes: Vec<Id>, parent: Option<Id> },
    NodesDeleted { nodes: Vec<Id>, parent: Option<Id> },
    NodesUpdated { nodes: Vec<Id> },
    AllChildNodesDeleted { parent: Option<Id> },
    NodeExpanded { node: Id, expanded: bool, expanded_lazy: bool },
    NodesSelected { nodes: Vec<Id> },
    /// Every node whose check state changed in one update, unchecked ones included.
    NodesChecked { nodes: Vec<Id> },
    NodeChanged { node: Id },
    ChildNodeOrderChanged { parent: Option<Id> },
}

impl<Id> TreeEvent<Id> {
    /// Event name as used by listeners keyed by string.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NodesInserted { .. } => "nodesInserted",
            Self::NodesDeleted { .. } => "nodesDeleted",
            Self::NodesUpdated { .. } => "nodesUpdated",
            Self::AllChildNodesDeleted { .. } => "allChildNodesDeleted",
            Self::NodeExpanded { .. } => "nodeExpanded",
            Self::NodesSelected { .. } => "nodesSelected",
            Self::NodesChecked { .. } => "nodesChecked",
            Self::NodeChanged { .. } => "nodeChanged",
            Self::ChildNodeOrderChanged { .. } => "childNodeOrderChanged",
        }
    }
}
