//! The tree coordinator.
//!
//! [`Tree`] owns the node store, the filter chain, the flat list and the viewport, and
//! exposes the mutation API. Every mutation updates the flat list before it returns;
//! attached rows follow immediately or when their transition finishes.

mod actions;
mod check;
mod expansion;
mod filtering;
mod flat;
mod layout;
mod mutation;
mod select;
mod snapshot;

use crate::animation::{AnimationKind, NoAnimation};
use crate::config::TreeConfig;
use crate::event::TreeEvent;
use crate::filter::{FilterChain, FilterHandle, LazyNodeFilter};
use crate::flat_list::FlatList;
use crate::model::{DefaultNodeFactory, NodeFactory, TreeId};
use crate::node::TreeNode;
use crate::render::RowRenderer;
use crate::scrollbar::ScrollbarThumb;
use crate::selection::Selection;
use crate::store::NodeStore;
use crate::viewport::{RenderCx, Transition, Viewport};

pub use snapshot::TreeSnapshot;

pub(crate) const TARGET: &str = "tree_viewport";

/// Hierarchical node set rendered through a bounded viewport.
///
/// `R` renders single rows, `A` drives row transitions.
pub struct Tree<Id: TreeId, R: RowRenderer<Id>, A = NoAnimation> {
    store: NodeStore<Id>,
    filters: FilterChain<Id>,
    breadcrumb_filter: Option<FilterHandle>,
    flat: FlatList<Id>,
    viewport: Viewport<Id, R::Handle>,
    renderer: R,
    animator: A,
    factory: Box<dyn NodeFactory<Id>>,
    config: TreeConfig,
    selection: Selection<Id>,
    checked: Vec<Id>,
    events: Vec<TreeEvent<Id>>,
    rendered: bool,
    rebuild_suppressed: bool,
    layout_invalid: bool,
    scroll_top: u32,
    view_height: u32,
    scrollbar: ScrollbarThumb,
}

impl<Id, R> Tree<Id, R, NoAnimation>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
{
    /// Creates an empty tree without row transitions.
    pub fn new(renderer: R, config: TreeConfig) -> Self {
        Self::with_animator(renderer, NoAnimation, config)
    }
}

impl<Id, R, A> Tree<Id, R, A>
where
    Id: TreeId + 'static,
    R: RowRenderer<Id>,
    A: crate::animation::Animator<R::Handle>,
{
    /// Creates an empty tree using `animator` for row transitions.
    pub fn with_animator(renderer: R, animator: A, config: TreeConfig) -> Self {
        let mut filters = FilterChain::new();
        filters.add(LazyNodeFilter);
        let mut tree = Self {
            store: NodeStore::new(),
            filters,
            breadcrumb_filter: None,
            flat: FlatList::default(),
            viewport: Viewport::new(config.view_range_size),
            renderer,
            animator,
            factory: Box::new(DefaultNodeFactory),
            config,
            selection: Selection::default(),
            checked: Vec::new(),
            events: Vec::new(),
            rendered: false,
            rebuild_suppressed: false,
            layout_invalid: false,
            scroll_top: 0,
            view_height: 0,
            scrollbar: ScrollbarThumb::new(),
        };
        if config.display_style == crate::config::DisplayStyle::Breadcrumb {
            tree.breadcrumb_filter = Some(tree.filters.add(crate::filter::BreadcrumbFilter));
        }
        tree
    }

    /// Replaces the factory creating nodes from inserted models.
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: NodeFactory<Id> + 'static,
    {
        self.factory = Box::new(factory);
        self
    }

    #[must_use]
    pub fn with_scrollbar(mut self, scrollbar: ScrollbarThumb) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    #[inline]
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    #[inline]
    pub const fn store(&self) -> &NodeStore<Id> {
        &self.store
    }

    #[inline]
    pub fn node(&self, id: Id) -> Option<&TreeNode<Id>> {
        self.store.get(id)
    }

    #[inline]
    pub const fn flat_list(&self) -> &FlatList<Id> {
        &self.flat
    }

    /// Ids of the visible nodes in display order.
    #[inline]
    pub fn visible_nodes(&self) -> &[Id] {
        self.flat.as_slice()
    }

    #[inline]
    pub fn is_visible(&self, id: Id) -> bool {
        self.flat.contains(id)
    }

    #[inline]
    pub const fn viewport(&self) -> &Viewport<Id, R::Handle> {
        &self.viewport
    }

    #[inline]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[inline]
    pub const fn animator(&self) -> &A {
        &self.animator
    }

    #[inline]
    pub const fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    #[inline]
    pub const fn selection(&self) -> &Selection<Id> {
        &self.selection
    }

    /// Nodes currently checked, in check order.
    #[inline]
    pub fn checked_nodes(&self) -> &[Id] {
        &self.checked
    }

    /// Returns `true` once [`render`](Self::render) was called.
    #[inline]
    pub const fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Returns `true` if mutations are waiting for [`validate_layout`](Self::validate_layout).
    #[inline]
    pub const fn is_layout_invalid(&self) -> bool {
        self.layout_invalid
    }

    #[inline]
    pub const fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    #[inline]
    pub const fn scrollbar(&self) -> &ScrollbarThumb {
        &self.scrollbar
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<TreeEvent<Id>> {
        std::mem::take(&mut self.events)
    }

    /// Visits `start` and its descendants in pre-order; returning `true` skips children.
    pub fn visit_nodes<F>(&self, start: &[Id], visit: F)
    where
        F: FnMut(&TreeNode<Id>) -> bool,
    {
        self.store.visit_nodes(start, visit);
    }

    fn emit(&mut self, event: TreeEvent<Id>) {
        self.events.push(event);
    }

    /// Splits the tree into the viewport and the collaborators it works on.
    fn parts(&mut self) -> (&mut Viewport<Id, R::Handle>, RenderCx<'_, Id, R, A>) {
        (
            &mut self.viewport,
            RenderCx {
                flat: &self.flat,
                store: &self.store,
                selection: &self.selection,
                renderer: &mut self.renderer,
                animator: &mut self.animator,
            },
        )
    }

    fn decorate(&mut self, id: Id) {
        let (viewport, mut cx) = self.parts();
        viewport.decorate(&mut cx, id);
    }

    fn transition(&self, kind: AnimationKind, animate: bool) -> Option<Transition> {
        if !(animate && self.config.animated && self.rendered) {
            return None;
        }
        let duration = match kind {
            AnimationKind::HeightOpen | AnimationKind::HeightClose => self.config.expand_duration,
            AnimationKind::SlideDown | AnimationKind::SlideUp => self.config.slide_duration,
        };
        Some(Transition { kind, duration })
    }

    fn lazy_expanding_enabled(&self) -> bool {
        self.config.lazy_expanding_enabled
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{NodeModel, preorder};
    use crate::render::RowSurface;

    pub(crate) type TestTree = Tree<u32, RowSurface<u32>>;

    /// Flat list a full pre-order walk predicts.
    pub(crate) fn expected_flat_list<A>(tree: &Tree<u32, RowSurface<u32>, A>) -> Vec<u32>
    where
        A: crate::animation::Animator<crate::render::RowHandle>,
    {
        let store = tree.store();
        let mut out = Vec::new();
        let mut stack: Vec<u32> = store.root_ids().iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = store.get(id) else {
                continue;
            };
            if !node.is_filter_accepted() {
                continue;
            }
            out.push(id);
            if node.shows_children() {
                stack.extend(node.children().iter().rev().copied());
            }
        }
        out
    }

    // A
    // ├─ B
    // │  └─ D
    // └─ C
    pub(crate) fn abcd(config: TreeConfig) -> TestTree {
        let mut tree = Tree::new(RowSurface::new(), config);
        tree.insert_nodes(
            vec![NodeModel::new(1).text("A").children([
                NodeModel::new(2).text("B").children([NodeModel::new(4).text("D")]),
                NodeModel::new(3).text("C"),
            ])],
            None,
        )
        .unwrap();
        tree
    }

    /// `count` roots with `children` children each, all collapsed.
    pub(crate) fn wide(roots: u32, children: u32, config: TreeConfig) -> TestTree {
        let mut tree = Tree::new(RowSurface::new(), config);
        let models: Vec<_> = (0..roots)
            .map(|root| {
                let id = root * 1000;
                NodeModel::new(id)
                    .text(format!("node {id}"))
                    .children((1..=children).map(|child| NodeModel::new(id + child)))
            })
            .collect();
        tree.insert_nodes(models, None).unwrap();
        tree
    }

    #[test]
    fn new_tree_is_empty() {
        let tree: TestTree = Tree::new(RowSurface::new(), TreeConfig::default());
        assert!(tree.visible_nodes().is_empty());
        assert!(!tree.is_rendered());
        assert_eq!(preorder(tree.store(), |_| true), Vec::<u32>::new());
    }

    #[test]
    fn inserted_roots_are_visible_collapsed() {
        let tree = abcd(TreeConfig::default());
        assert_eq!(tree.visible_nodes(), &[1]);
        assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    }
}
