pub use crate::{
    ActionOutcome, Animator, CheckOptions, DisplayStyle, ExpandOptions, NodeFilter, NodeModel,
    NodeTextLabel, QueuedAnimator, Range, RowRenderer, RowSurface, TextFilter, Tree, TreeAction,
    TreeConfig, TreeError, TreeEvent, TreeGlyphs, TreeId, TreeLabelPrefix, TreeLabelProvider,
    TreeLabelRenderer, TreeNode, TreeRowContext, TreeSnapshot, TreeView, TreeViewStyle,
    tree_label_line,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};
