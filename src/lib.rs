//! Incremental viewport renderer for large, filtered trees, with a ratatui front end.
//!
//! A [`Tree`] keeps its nodes in a [`NodeStore`], flattens the visible ones into a
//! [`FlatList`] and keeps only a bounded window of that list attached to a row surface
//! ([`RowRenderer`]). Filters, expansion, selection and checks update the flat list
//! incrementally; rows outside the window are replaced by filler heights so that the
//! scroll geometry stays exact.
//!
//! [`TreeView`] draws a tree rendered into a [`RowSurface`].
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `Tree::handle_key`.
//! - `serde`: serde support for [`TreeSnapshot`], [`NodeModel`], [`TreeConfig`] and [`TreeEvent`].

mod action;
mod animation;
mod config;
mod context;
mod error;
mod event;
mod filter;
mod flat_list;
mod glyphs;
#[cfg(feature = "keymap")]
mod keymap;
mod model;
mod node;
pub mod prelude;
mod range;
mod render;
mod scrollbar;
mod selection;
mod store;
mod style;
mod tree;
mod viewport;
mod widget;

pub use action::{ActionOutcome, TreeAction};
pub use animation::{
    AnimationKind, AnimationToken, Animator, NoAnimation, QueuedAnimation, QueuedAnimator,
};
pub use config::{CheckOptions, DisplayStyle, ExpandOptions, TreeConfig};
pub use context::TreeRowContext;
pub use error::TreeError;
pub use event::TreeEvent;
pub use filter::{
    BreadcrumbFilter, FilterChain, FilterContext, FilterHandle, LazyNodeFilter, NodeFilter,
    TextFilter,
};
pub use flat_list::{FlatList, InsertBatch};
pub use glyphs::{
    NodeTextLabel, TreeGlyphs, TreeLabelPrefix, TreeLabelProvider, TreeLabelRenderer,
    tree_label_line,
};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings};
pub use model::{DefaultNodeFactory, NodeFactory, NodeModel, TreeId, TreeModel, preorder};
pub use node::TreeNode;
pub use range::{Range, RangeError, Ranges};
pub use render::{RowHandle, RowPosition, RowRenderer, RowSurface};
pub use scrollbar::{ScrollMetrics, ScrollbarThumb, ThumbGeometry};
pub use selection::Selection;
pub use store::NodeStore;
pub use style::TreeViewStyle;
pub use tree::{Tree, TreeSnapshot};
pub use viewport::{RowPhase, Viewport};
pub use widget::TreeView;
