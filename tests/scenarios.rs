use tui_treeviewport::{
    CheckOptions, NodeModel, Range, RowSurface, TextFilter, Tree, TreeConfig, TreeEvent,
    TreeModel,
};

type TestTree = Tree<u32, RowSurface<u32>>;

fn node(id: u32, text: &str) -> NodeModel<u32> {
    NodeModel::new(id).text(text)
}

/// A(1) with children B(2) and C(3); B has the child D(4).
fn abcd(config: TreeConfig) -> TestTree {
    let mut tree = Tree::new(RowSurface::new(), config);
    let a = node(1, "A").children([node(2, "B").children([node(4, "D")]), node(3, "C")]);
    tree.insert_nodes(vec![a], None).unwrap();
    tree
}

/// Pre-order walk of the accepted nodes, descending into nodes showing their children.
fn expected_flat_list(tree: &TestTree) -> Vec<u32> {
    let store = tree.store();
    let mut out = Vec::new();
    let mut stack: Vec<u32> = store.roots().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let node = tree.node(id).unwrap();
        if !node.is_filter_accepted() {
            continue;
        }
        out.push(id);
        if node.shows_children() {
            stack.extend(store.children(id).iter().rev().copied());
        }
    }
    out
}

#[test]
fn selecting_a_hidden_node_reveals_its_path() {
    let mut tree = abcd(TreeConfig::default());
    tree.render().unwrap();
    assert_eq!(tree.visible_nodes(), &[1]);

    tree.select_node(4).unwrap();
    assert_eq!(tree.visible_nodes(), &[1, 2, 4, 3]);
    assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
    tree.validate_layout().unwrap();
    assert_eq!(tree.renderer().attached_ids(), vec![1, 2, 4, 3]);
    assert!(tree.renderer().is_selected(4));
    assert!(tree
        .drain_events()
        .contains(&TreeEvent::NodesSelected { nodes: vec![4] }));
}

#[test]
fn inserting_below_the_window_renders_nothing() {
    let mut tree = Tree::new(RowSurface::new(), TreeConfig::default().view_range_size(20));
    let roots = (0..50)
        .map(|id| NodeModel::new(id).text(format!("row {id}")).expanded(id == 40))
        .collect();
    tree.insert_nodes(roots, None).unwrap();
    tree.render().unwrap();
    assert_eq!(tree.viewport().rendered(), Range::new(0, 20));
    tree.renderer_mut().clear_log();

    let children = (100..103).map(|id| NodeModel::new(id).text("child")).collect();
    tree.insert_nodes(children, Some(40)).unwrap();

    assert_eq!(tree.visible_nodes().len(), 53);
    assert_eq!(tree.viewport().rendered(), Range::new(0, 20));
    assert!(tree.renderer().rendered_log().is_empty());
    assert_eq!(tree.visible_nodes(), expected_flat_list(&tree).as_slice());
}

#[test]
fn inserting_inside_the_window_attaches_the_rows() {
    let mut tree = Tree::new(RowSurface::new(), TreeConfig::default().view_range_size(20));
    let roots = (0..50)
        .map(|id| NodeModel::new(id).text(format!("row {id}")).expanded(id == 5))
        .collect();
    tree.insert_nodes(roots, None).unwrap();
    tree.render().unwrap();
    tree.renderer_mut().clear_log();

    let children = (100..103).map(|id| NodeModel::new(id).text("child")).collect();
    tree.insert_nodes(children, Some(5)).unwrap();
    tree.validate_layout().unwrap();

    assert_eq!(tree.renderer().rendered_log(), &[100, 101, 102]);
    let rendered = tree.viewport().rendered();
    let attached = tree.renderer().attached_ids();
    assert_eq!(attached.as_slice(), &tree.visible_nodes()[rendered.from..rendered.to]);
}

#[test]
fn inserting_a_root_above_the_window_keeps_row_order() {
    let mut tree = Tree::new(RowSurface::new(), TreeConfig::default());
    tree.insert_nodes(vec![node(2, "two")], None).unwrap();
    tree.render().unwrap();

    tree.insert_nodes(vec![node(1, "one").at_index(0)], None).unwrap();
    tree.validate_layout().unwrap();
    assert_eq!(tree.visible_nodes(), &[1, 2]);
    assert_eq!(tree.viewport().rendered(), Range::new(0, 2));
    assert_eq!(tree.renderer().attached_ids(), vec![1, 2]);
}

#[test]
fn clearing_a_filter_restores_rows_in_order() {
    let mut tree = Tree::new(RowSurface::new(), TreeConfig::default());
    let roots = vec![node(1, "one"), node(2, "two"), node(3, "three")];
    tree.insert_nodes(roots, None).unwrap();
    tree.render().unwrap();

    let filter = tree.add_filter(TextFilter::new("two")).unwrap();
    tree.validate_layout().unwrap();
    assert_eq!(tree.renderer().attached_ids(), vec![2]);

    tree.remove_filter(filter).unwrap();
    tree.validate_layout().unwrap();
    assert_eq!(tree.visible_nodes(), &[1, 2, 3]);
    assert_eq!(tree.renderer().attached_ids(), vec![1, 2, 3]);
}

#[test]
fn single_check_replaces_the_previous_check_in_one_event() {
    let mut tree = abcd(TreeConfig::default().checkable(true).multi_check(false));
    tree.check_nodes(&[3], CheckOptions::new()).unwrap();
    tree.drain_events();

    tree.check_nodes(&[4], CheckOptions::new()).unwrap();
    let checked: Vec<_> = tree
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, TreeEvent::NodesChecked { .. }))
        .collect();
    assert_eq!(checked, vec![TreeEvent::NodesChecked { nodes: vec![3, 4] }]);
    assert_eq!(tree.checked_nodes(), &[4]);
    assert!(tree.node(2).unwrap().is_children_checked());
    assert!(!tree.node(3).unwrap().is_checked());
}

#[test]
fn deleting_a_rendered_subtree_releases_its_rows() {
    let mut tree = abcd(TreeConfig::default());
    tree.set_node_expanded_recursive(1, true, Default::default()).unwrap();
    tree.render().unwrap();
    assert_eq!(tree.renderer().live_rows(), 4);

    tree.delete_nodes(&[2], Some(1)).unwrap();
    tree.validate_layout().unwrap();
    assert_eq!(tree.visible_nodes(), &[1, 3]);
    assert_eq!(tree.renderer().attached_ids(), vec![1, 3]);
    assert_eq!(tree.renderer().live_rows(), 2);
    assert!(tree.node(4).is_none());
}
