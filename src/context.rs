use ratatui::style::Style;

/// Per-row data handed to label renderers.
#[derive(Clone, Copy)]
pub struct TreeRowContext<'a> {
    pub level: u16,
    /// For each depth `1..=level`, whether the ancestor at that depth (the node
    /// itself last) is the last visible sibling.
    pub is_tail_stack: &'a [bool],
    pub is_expanded: bool,
    /// Expanded without its children being visible.
    pub is_expanded_lazy: bool,
    pub has_children: bool,
    pub is_selected: bool,
    /// `None` when the tree is not checkable.
    pub checked: Option<bool>,
    pub children_checked: bool,
    pub is_enabled: bool,
    pub draw_lines: bool,
    pub line_style: Style,
}
