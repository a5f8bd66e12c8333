// Minimal example: a small tree drawn through the row surface with default styling.
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;

use tui_treeviewport::{NodeModel, RowSurface, Tree, TreeConfig, TreeView, TreeViewStyle};

fn main() -> Result<(), tui_treeviewport::TreeError> {
    // root -> {alpha -> {alpha.1}, beta}
    let root = NodeModel::new(0u32).text("root").expanded(true).children([
        NodeModel::new(1).text("alpha").children([NodeModel::new(3).text("alpha.1")]),
        NodeModel::new(2).text("beta").leaf(true),
    ]);

    // The tree owns the nodes; the surface receives the rendered rows.
    let mut tree = Tree::new(RowSurface::new(), TreeConfig::default().animated(false));
    tree.insert_nodes(vec![root], None)?;
    tree.select_node(3)?;

    // Render into an in-memory buffer (no terminal required for the example).
    let area = Rect::new(0, 0, 40, 8);
    let mut buffer = Buffer::empty(area);
    TreeView::new(TreeViewStyle::default()).render(area, &mut buffer, &mut tree);

    for y in 0..area.height {
        let line: String = (0..area.width).map(|x| buffer[(x, y)].symbol()).collect();
        println!("{}", line.trim_end());
    }
    Ok(())
}
