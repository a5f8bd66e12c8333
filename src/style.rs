use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Borders;

/// Визуальные настройки виджета дерева.
#[derive(Clone)]
pub struct TreeViewStyle<'a> {
    pub title: Option<Line<'a>>,
    pub block_style: Style,
    pub border_style: Style,
    pub highlight_style: Style,
    pub checked_style: Style,
    pub disabled_style: Style,
    pub line_style: Style,
    pub highlight_symbol: &'a str,
    pub borders: Borders,
    /// Рисовать ли линии дерева.
    pub draw_lines: bool,
    /// Показывать полосу прокрутки, когда содержимое не помещается.
    pub scrollbar: bool,
}

impl Default for TreeViewStyle<'_> {
    fn default() -> Self {
        Self {
            title: None,
            block_style: Style::default(),
            border_style: Style::default(),
            highlight_style: Style::default(),
            checked_style: Style::default(),
            disabled_style: Style::default(),
            line_style: Style::default(),
            highlight_symbol: ">> ",
            borders: Borders::ALL,
            draw_lines: true,
            scrollbar: true,
        }
    }
}
