use std::borrow::Cow;

use ratatui::text::{Line, Span};

use crate::context::TreeRowContext;
use crate::node::TreeNode;

#[derive(Clone, Copy)]
pub struct TreeGlyphs<'a> {
    pub indent: &'a str,
    pub branch_last: &'a str,
    pub branch: &'a str,
    pub vert: &'a str,
    pub empty: &'a str,
    pub leaf: &'a str,
    pub expanded: &'a str,
    pub collapsed: &'a str,
    /// Expander of a lazily expanded node.
    pub expanded_lazy: &'a str,
    pub checked: &'a str,
    pub unchecked: &'a str,
    /// Unchecked node with a checked descendant.
    pub partial: &'a str,
}

impl TreeGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "   ",
            branch_last: "└──",
            branch: "├──",
            vert: "│  ",
            empty: "   ",
            leaf: "•",
            expanded: "▼",
            collapsed: "▶",
            expanded_lazy: "▽",
            checked: "[✔]",
            unchecked: "[ ]",
            partial: "[-]",
        }
    }

    pub const fn ascii() -> Self {
        Self {
            indent: "   ",
            branch_last: "`--",
            branch: "|--",
            vert: "|  ",
            empty: "   ",
            leaf: "*",
            expanded: "v",
            collapsed: ">",
            expanded_lazy: "~",
            checked: "[x]",
            unchecked: "[ ]",
            partial: "[-]",
        }
    }
}

#[derive(Clone)]
pub struct TreeLabelPrefix<'a> {
    pub name: &'a str,
    pub prefix: Option<Cow<'a, str>>,
}

/// Supplies the label of a node; the tree lines, expander and checkbox are added
/// by [`tree_label_line`].
pub trait TreeLabelProvider<Id> {
    fn label_parts<'a>(&'a self, node: &'a TreeNode<Id>) -> TreeLabelPrefix<'a>;
}

pub trait TreeLabelRenderer<Id> {
    fn line<'a>(
        &'a self,
        node: &'a TreeNode<Id>,
        ctx: &TreeRowContext,
        glyphs: &TreeGlyphs<'a>,
    ) -> Line<'a>;
}

impl<Id, P> TreeLabelRenderer<Id> for P
where
    P: TreeLabelProvider<Id>,
{
    fn line<'a>(
        &'a self,
        node: &'a TreeNode<Id>,
        ctx: &TreeRowContext,
        glyphs: &TreeGlyphs<'a>,
    ) -> Line<'a> {
        let parts = self.label_parts(node);
        tree_label_line(ctx, parts, glyphs)
    }
}

/// Labels a node with its text.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeTextLabel;

impl<Id: crate::model::TreeId> TreeLabelProvider<Id> for NodeTextLabel {
    fn label_parts<'a>(&'a self, node: &'a TreeNode<Id>) -> TreeLabelPrefix<'a> {
        TreeLabelPrefix {
            name: node.text(),
            prefix: None,
        }
    }
}

const fn expander<'a>(ctx: &TreeRowContext<'_>, glyphs: &TreeGlyphs<'a>) -> &'a str {
    if !ctx.has_children {
        glyphs.leaf
    } else if ctx.is_expanded_lazy {
        glyphs.expanded_lazy
    } else if ctx.is_expanded {
        glyphs.expanded
    } else {
        glyphs.collapsed
    }
}

const fn checkbox<'a>(ctx: &TreeRowContext<'_>, glyphs: &TreeGlyphs<'a>) -> Option<&'a str> {
    match ctx.checked {
        Some(true) => Some(glyphs.checked),
        Some(false) if ctx.children_checked => Some(glyphs.partial),
        Some(false) => Some(glyphs.unchecked),
        None => None,
    }
}

pub fn tree_label_line<'a>(
    ctx: &TreeRowContext<'_>,
    parts: TreeLabelPrefix<'a>,
    glyphs: &TreeGlyphs<'a>,
) -> Line<'a> {
    let TreeLabelPrefix { name, prefix: op } = parts;
    let op = op.filter(|value| !value.is_empty());
    let mut spans = Vec::with_capacity(ctx.is_tail_stack.len() + 8);

    if ctx.level == 0 || !ctx.draw_lines {
        for _ in 0..ctx.level {
            spans.push(Span::raw(glyphs.empty));
        }
    } else {
        let last = ctx.is_tail_stack.len().saturating_sub(1);
        for (l, is_last) in ctx.is_tail_stack.iter().enumerate() {
            let part = match (l == last, *is_last) {
                (true, true) => glyphs.branch_last,
                (true, false) => glyphs.branch,
                (false, true) => glyphs.indent,
                (false, false) => glyphs.vert,
            };
            spans.push(Span::styled(part, ctx.line_style));
        }
    }

    // Root leaves get no bullet.
    let expander = if ctx.level == 0 && !ctx.has_children {
        ""
    } else {
        expander(ctx, glyphs)
    };
    if !expander.is_empty() {
        spans.push(Span::raw(expander));
        spans.push(Span::raw(" "));
    }
    if let Some(checkbox) = checkbox(ctx, glyphs) {
        spans.push(Span::raw(checkbox));
        spans.push(Span::raw(" "));
    }
    if let Some(op) = op {
        spans.push(Span::raw(op));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::raw(name));
    Line::from(spans)
}
