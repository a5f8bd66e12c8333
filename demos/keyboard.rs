// Keyboard example: resolve key presses through the bindings and log what happens.
//
// Run with `RUST_LOG=tree_viewport=debug` to see the coordinator spans.
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::StatefulWidget;
use tracing_subscriber::EnvFilter;

use tui_treeviewport::{
    ActionOutcome, KeymapProfile, NodeModel, RowSurface, TextFilter, Tree, TreeAction,
    TreeConfig, TreeKeyBindings, TreeView, TreeViewStyle,
};

fn main() -> Result<(), tui_treeviewport::TreeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Three groups of twenty items each: more rows than the window keeps attached.
    let groups = (0..3u32).map(|group| {
        let items = (1..=20).map(move |item| {
            NodeModel::new(group * 100 + item).text(format!("item {group}.{item}"))
        });
        NodeModel::new(group * 100).text(format!("group {group}")).children(items)
    });

    let config = TreeConfig::default().checkable(true).animated(false);
    let mut tree = Tree::new(RowSurface::new(), config);
    tree.insert_nodes(groups.collect(), None)?;

    let bindings = TreeKeyBindings::with_profile(KeymapProfile::Default);
    let keys = [
        KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Right, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Right, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE),
        KeyEvent::new(KeyCode::End, KeyModifiers::NONE),
        KeyEvent::new(KeyCode::Char('D'), KeyModifiers::NONE),
    ];

    let area = Rect::new(0, 0, 40, 12);
    let mut buffer = Buffer::empty(area);
    for key in keys {
        match tree.handle_key(key, &bindings)? {
            // Deletion is left to the application.
            ActionOutcome::Action(TreeAction::DeleteNode) => {
                if let Some(id) = tree.selected_node() {
                    let parent = tree.store().parent_of(id);
                    tree.delete_nodes(&[id], parent)?;
                }
            }
            outcome => println!("{:?} -> {outcome:?}", key.code),
        }
        TreeView::new(TreeViewStyle::default()).render(area, &mut buffer, &mut tree);
    }

    tree.add_filter(TextFilter::new("item 0.1"))?;
    TreeView::new(TreeViewStyle::default()).render(area, &mut buffer, &mut tree);

    for event in tree.drain_events() {
        println!("{}: {event:?}", event.name());
    }
    println!("visible: {:?}", tree.visible_nodes());
    Ok(())
}
