/// Actions that a user or application can initiate on the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeAction<Custom = ()> {
    /// Move selection to the previous visible node.
    SelectPrev,
    /// Move selection to the next visible node.
    SelectNext,
    /// Move selection to the parent node.
    SelectParent,
    /// Expand the selection; if already expanded, move to its first visible child.
    SelectChild,
    /// Select the first visible node.
    SelectFirst,
    /// Select the last visible node.
    SelectLast,
    /// Toggle expansion for the selected node only.
    ToggleNode,
    /// Toggle expansion recursively for the selected subtree.
    ToggleRecursive,
    /// Toggle the check state of the selected node.
    ToggleCheck,
    /// Expand all nodes in the tree.
    ExpandAll,
    /// Collapse all nodes in the tree.
    CollapseAll,
    /// Request deleting the selected node; forwarded to the caller.
    DeleteNode,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action or key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionOutcome<Custom = ()> {
    /// The action was handled internally and state was updated.
    Handled,
    /// The action was ignored (e.g., nothing selected / nothing to do).
    Unhandled,
    /// The action is forwarded to the caller for handling.
    Action(TreeAction<Custom>),
}
