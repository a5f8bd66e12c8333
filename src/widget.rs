use std::marker::PhantomData;

use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::text::Span;
use ratatui::widgets::{
    Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
};
use smallvec::SmallVec;
use tracing::error;

use crate::animation::{Animator, NoAnimation};
use crate::context::TreeRowContext;
use crate::glyphs::{NodeTextLabel, TreeGlyphs, TreeLabelRenderer};
use crate::model::TreeId;
use crate::render::{RowHandle, RowSurface};
use crate::style::TreeViewStyle;
use crate::tree::{TARGET, Tree};

/// Tree widget drawing the rows attached to a [`RowSurface`].
///
/// Rendering runs [`Tree::validate_layout`] first, so the widget is the place where
/// pending viewport work is applied once per frame.
pub struct TreeView<'a, Id, A = NoAnimation, L = NodeTextLabel> {
    label: L,
    style: TreeViewStyle<'a>,
    glyphs: TreeGlyphs<'a>,
    _tree: PhantomData<fn(Id, A)>,
}

impl<'a, Id, A> TreeView<'a, Id, A, NodeTextLabel> {
    pub const fn new(style: TreeViewStyle<'a>) -> Self {
        Self {
            label: NodeTextLabel,
            style,
            glyphs: TreeGlyphs::unicode(),
            _tree: PhantomData,
        }
    }
}

impl<'a, Id, A, L> TreeView<'a, Id, A, L> {
    #[must_use]
    pub const fn glyphs(mut self, glyphs: TreeGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn label<M>(self, label: M) -> TreeView<'a, Id, A, M> {
        TreeView {
            label,
            style: self.style,
            glyphs: self.glyphs,
            _tree: PhantomData,
        }
    }
}

impl<Id, A, L> TreeView<'_, Id, A, L>
where
    Id: TreeId + 'static,
    A: Animator<RowHandle>,
    L: TreeLabelRenderer<Id>,
{
    /// Applies the area height and the pending layout work to `tree`.
    fn prepare(tree: &mut Tree<Id, RowSurface<Id>, A>, height: u32) {
        if tree.view_height() != height {
            if let Err(err) = tree.set_view_height(height) {
                error!(target: TARGET, %err, "view height rejected");
            }
        }
        let result = if tree.is_rendered() {
            tree.validate_layout()
        } else {
            tree.render().and_then(|()| tree.validate_layout())
        };
        if let Err(err) = result {
            error!(target: TARGET, %err, "layout validation failed");
        }
    }

    /// Draws the attached rows, offset by the leading filler.
    fn render_rows(&self, area: Rect, buf: &mut Buffer, tree: &Tree<Id, RowSurface<Id>, A>) {
        let top = tree.scroll_top();
        let bottom = top.saturating_add(u32::from(area.height));
        let (mut y, _) = tree.filler_heights();
        let symbol_width =
            u16::try_from(Span::raw(self.style.highlight_symbol).width()).unwrap_or(area.width);
        let label_area_width = area.width.saturating_sub(symbol_width);
        let checkable = tree.config().checkable;

        for id in tree.renderer().attached_ids() {
            if y >= bottom {
                break;
            }
            let Some(node) = tree.node(id) else {
                continue;
            };
            let row_top = y;
            y = y.saturating_add(node.height().unwrap_or(tree.config().node_height));
            if row_top < top {
                continue;
            }
            let Ok(dy) = u16::try_from(row_top - top) else {
                break;
            };
            let row = Rect {
                y: area.y + dy,
                height: 1,
                ..area
            };

            let tails = tail_stack(tree, id);
            let is_selected = tree.is_node_selected(id);
            let ctx = TreeRowContext {
                level: node.level(),
                is_tail_stack: tails.as_slice(),
                is_expanded: node.is_expanded(),
                is_expanded_lazy: node.is_expanded_lazy(),
                has_children: !node.is_leaf() && node.has_children(),
                is_selected,
                checked: checkable.then(|| node.is_checked()),
                children_checked: node.is_children_checked(),
                is_enabled: node.is_enabled(),
                draw_lines: self.style.draw_lines,
                line_style: self.style.line_style,
            };
            let line = self.label.line(node, &ctx, &self.glyphs);

            let symbol = if is_selected {
                self.style.highlight_symbol
            } else {
                ""
            };
            let width = usize::from(symbol_width);
            buf.set_stringn(row.x, row.y, symbol, width, self.style.block_style);
            buf.set_line(row.x + symbol_width, row.y, &line, label_area_width);

            let mut row_style = self.style.block_style;
            if ctx.checked == Some(true) {
                row_style = row_style.patch(self.style.checked_style);
            }
            if !ctx.is_enabled {
                row_style = row_style.patch(self.style.disabled_style);
            }
            if is_selected {
                row_style = row_style.patch(self.style.highlight_style);
            }
            buf.set_style(row, row_style);
        }
    }

    #[inline]
    fn render_scrollbar(
        area: Rect,
        buf: &mut Buffer,
        tree: &Tree<Id, RowSurface<Id>, A>,
        inner_height: usize,
        scroll_rows: usize,
    ) {
        let scroll_len = scroll_rows.saturating_add(1);
        let position = (tree.scroll_top() as usize).min(scroll_len.saturating_sub(1));
        let mut scrollbar_state = ScrollbarState::new(scroll_len)
            .position(position)
            .viewport_content_length(inner_height);
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .render(area, buf, &mut scrollbar_state);
    }
}

/// For each depth `1..=level` of `id`, whether the node on the path at that depth is
/// the last of its visible siblings.
fn tail_stack<Id, A>(tree: &Tree<Id, RowSurface<Id>, A>, id: Id) -> SmallVec<[bool; 16]>
where
    Id: TreeId + 'static,
    A: Animator<RowHandle>,
{
    let store = tree.store();
    let mut path: SmallVec<[Id; 16]> = store.ancestors(id).into_iter().collect();
    path.reverse();
    path.push(id);
    path.iter()
        .skip(1)
        .map(|&node| {
            let siblings = store.siblings_of(store.parent_of(node));
            siblings
                .iter()
                .skip_while(|&&sibling| sibling != node)
                .skip(1)
                .all(|&sibling| !tree.is_visible(sibling))
        })
        .collect()
}

impl<Id, A, L> StatefulWidget for TreeView<'_, Id, A, L>
where
    Id: TreeId + 'static,
    A: Animator<RowHandle>,
    L: TreeLabelRenderer<Id>,
{
    type State = Tree<Id, RowSurface<Id>, A>;

    fn render(self, area: Rect, buf: &mut Buffer, tree: &mut Self::State) {
        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block = block
            .style(self.style.block_style)
            .border_style(self.style.border_style);

        let inner_height = block.inner(area).height;
        Self::prepare(tree, u32::from(inner_height));

        let scroll_rows = tree.content_height().saturating_sub(u32::from(inner_height)) as usize;
        let show_scrollbar = self.style.scrollbar && scroll_rows > 0 && area.width > 0;
        let (list_area, list_block, scrollbar_area) = if show_scrollbar {
            let list_area = Rect {
                width: area.width.saturating_sub(1),
                ..area
            };
            let scrollbar_area = Rect {
                x: area.x + area.width - 1,
                y: area.y,
                width: 1,
                height: area.height,
            };
            let mut borders = self.style.borders;
            borders.remove(Borders::RIGHT);
            (list_area, block.borders(borders), Some(scrollbar_area))
        } else {
            (area, block, None)
        };

        let rows_area = list_block.inner(list_area);
        list_block.render(list_area, buf);
        self.render_rows(rows_area, buf, tree);

        if let Some(scrollbar_area) = scrollbar_area {
            let inner_height = usize::from(inner_height);
            Self::render_scrollbar(scrollbar_area, buf, tree, inner_height, scroll_rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;
    use ratatui::prelude::Buffer;
    use ratatui::widgets::StatefulWidget;

    use super::TreeView;
    use crate::config::TreeConfig;
    use crate::model::NodeModel;
    use crate::render::RowSurface;
    use crate::style::TreeViewStyle;
    use crate::tree::Tree;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn render_smoke_with_scrollbar() {
        let mut tree = Tree::new(RowSurface::new(), TreeConfig::default().animated(false));
        let children = (1..=12).map(|idx| NodeModel::new(idx).text(format!("node-{idx}")));
        let root = NodeModel::new(0).text("root").expanded(true).children(children);
        tree.insert_nodes(vec![root], None).unwrap();

        let area = Rect::new(0, 0, 24, 6);
        let mut buffer = Buffer::empty(area);
        TreeView::new(TreeViewStyle::default()).render(area, &mut buffer, &mut tree);

        assert!(tree.is_rendered());
        assert_eq!(tree.view_height(), 4);
        assert!(row_text(&buffer, 1).contains("root"));
        assert!(row_text(&buffer, 2).contains("node-1"));
    }

    #[test]
    fn scrolled_rows_start_at_the_scroll_position() {
        let mut tree = Tree::new(RowSurface::new(), TreeConfig::default().animated(false));
        let roots = (0..30).map(|idx| NodeModel::new(idx).text(format!("row-{idx}"))).collect();
        tree.insert_nodes(roots, None).unwrap();

        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        let style = TreeViewStyle {
            borders: ratatui::widgets::Borders::NONE,
            ..TreeViewStyle::default()
        };
        TreeView::new(style.clone()).render(area, &mut buffer, &mut tree);
        tree.set_scroll_top(12).unwrap();
        let mut buffer = Buffer::empty(area);
        TreeView::new(style).render(area, &mut buffer, &mut tree);
        assert!(row_text(&buffer, 0).contains("row-12"));
        assert!(row_text(&buffer, 4).contains("row-16"));
    }
}
