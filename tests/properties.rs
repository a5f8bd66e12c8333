use proptest::prelude::*;
use rustc_hash::FxHashSet;
use tui_treeviewport::{
    AnimationToken, Animator, ExpandOptions, FilterHandle, NodeModel, QueuedAnimator, Range,
    RowHandle, RowSurface, TextFilter, Tree, TreeConfig, TreeModel,
};

type TestTree<A = tui_treeviewport::NoAnimation> = Tree<u32, RowSurface<u32>, A>;

#[derive(Clone, Debug)]
enum Op {
    Expand(usize),
    Collapse(usize),
    ExpandRecursive(usize),
    Select(usize),
    Insert(usize, bool),
    Delete(usize),
    Filter(u8),
    ClearFilter,
    Scroll(u32),
    CollapseAll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<usize>().prop_map(Op::Expand),
        2 => any::<usize>().prop_map(Op::Collapse),
        1 => any::<usize>().prop_map(Op::ExpandRecursive),
        2 => any::<usize>().prop_map(Op::Select),
        2 => (any::<usize>(), prop::bool::weighted(0.3))
            .prop_map(|(choice, root)| Op::Insert(choice, root)),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => (0u8..10).prop_map(Op::Filter),
        1 => Just(Op::ClearFilter),
        2 => (0u32..80).prop_map(Op::Scroll),
        1 => Just(Op::CollapseAll),
    ]
}

/// Parent choices: entry `i` places node `i + 1` under `None` or an earlier node.
fn shape() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(prop::option::weighted(0.8, any::<usize>()), 1..60)
}

fn build(shape: &[Option<usize>]) -> TestTree {
    populate(Tree::new(RowSurface::new(), TreeConfig::default().view_range_size(8)), shape)
}

fn build_animated(shape: &[Option<usize>]) -> TestTree<QueuedAnimator> {
    let config = TreeConfig::default().view_range_size(8).animated(true);
    populate(Tree::with_animator(RowSurface::new(), QueuedAnimator::new(), config), shape)
}

fn populate<A: Animator<RowHandle>>(mut tree: TestTree<A>, shape: &[Option<usize>]) -> TestTree<A> {
    for (index, parent) in shape.iter().enumerate() {
        let id = u32::try_from(index).unwrap() + 1;
        let parent = parent
            .filter(|_| index > 0)
            .map(|choice| u32::try_from(choice % index).unwrap() + 1);
        let model = NodeModel::new(id).text(format!("n{id}"));
        tree.insert_nodes(vec![model], parent).unwrap();
    }
    tree
}

fn pick<A: Animator<RowHandle>>(tree: &TestTree<A>, choice: usize) -> Option<u32> {
    let mut ids: Vec<u32> = tree.store().iter().map(|node| node.id()).collect();
    ids.sort_unstable();
    (!ids.is_empty()).then(|| ids[choice % ids.len()])
}

fn expected_flat_list<A: Animator<RowHandle>>(tree: &TestTree<A>) -> Vec<u32> {
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

fn apply<A: Animator<RowHandle>>(
    tree: &mut TestTree<A>,
    filter: &mut Option<FilterHandle>,
    next_id: &mut u32,
    op: Op,
) {
    match op {
        Op::Expand(choice) => {
            if let Some(id) = pick(tree, choice) {
                tree.expand_node(id).unwrap();
            }
        }
        Op::Collapse(choice) => {
            if let Some(id) = pick(tree, choice) {
                tree.collapse_node(id).unwrap();
            }
        }
        Op::ExpandRecursive(choice) => {
            if let Some(id) = pick(tree, choice) {
                tree.set_node_expanded_recursive(id, true, ExpandOptions::new()).unwrap();
            }
        }
        Op::Select(choice) => {
            if let Some(id) = pick(tree, choice) {
                tree.select_node(id).unwrap();
            }
        }
        Op::Insert(choice, root) => {
            let parent = if root { None } else { pick(tree, choice) };
            let id = *next_id;
            *next_id += 1;
            let model = NodeModel::new(id).text(format!("n{id}")).at_index(choice % 3);
            tree.insert_nodes(vec![model], parent).unwrap();
        }
        Op::Delete(choice) => {
            if let Some(id) = pick(tree, choice) {
                let parent = tree.store().parent_of(id);
                tree.delete_nodes(&[id], parent).unwrap();
            }
        }
        Op::Filter(digit) => {
            if let Some(handle) = filter.take() {
                tree.remove_filter(handle).unwrap();
            }
            *filter = Some(tree.add_filter(TextFilter::new(digit.to_string())).unwrap());
        }
        Op::ClearFilter => {
            if let Some(handle) = filter.take() {
                tree.remove_filter(handle).unwrap();
            }
        }
        Op::Scroll(top) => tree.set_scroll_top(top).unwrap(),
        Op::CollapseAll => tree.collapse_all().unwrap(),
    }
}

/// Flat list order and presence agree with the store.
fn assert_flat_list<A: Animator<RowHandle>>(tree: &TestTree<A>) {
    let flat = tree.visible_nodes();
    assert_eq!(flat, expected_flat_list(tree).as_slice());
    let present: FxHashSet<u32> = flat.iter().copied().collect();
    assert_eq!(present.len(), flat.len(), "duplicate entries in {flat:?}");
    for node in tree.store().iter() {
        let id = node.id();
        assert_eq!(tree.is_visible(id), present.contains(&id), "presence of {id}");
    }
}

fn assert_consistent<A: Animator<RowHandle>>(tree: &TestTree<A>) {
    assert_flat_list(tree);
    let flat = tree.visible_nodes();

    let rendered = tree.viewport().rendered();
    assert!(rendered.to <= flat.len(), "{rendered} outside of {}", flat.len());
    let attached = tree.renderer().attached_ids();
    assert_eq!(attached.as_slice(), &flat[rendered.from..rendered.to]);
    for id in &flat[rendered.from..rendered.to] {
        assert!(tree.viewport().is_attached(*id));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn flat_list_and_rows_follow_every_mutation(
        shape in shape(),
        ops in prop::collection::vec(op(), 1..40),
    ) {
        let mut tree = build(&shape);
        tree.render().unwrap();
        let mut filter = None;
        let mut next_id = 1000;
        for op in ops {
            apply(&mut tree, &mut filter, &mut next_id, op);
            tree.validate_layout().unwrap();
            assert_consistent(&tree);
        }
    }

    #[test]
    fn animated_rows_settle_once_transitions_finish(
        shape in shape(),
        steps in prop::collection::vec((op(), any::<u8>()), 1..40),
    ) {
        let mut tree = build_animated(&shape);
        tree.render().unwrap();
        let mut filter = None;
        let mut next_id = 1000;
        let mut pending: Vec<AnimationToken> = Vec::new();
        for (op, mask) in steps {
            apply(&mut tree, &mut filter, &mut next_id, op);
            tree.validate_layout().unwrap();
            pending.extend(tree.animator_mut().drain().into_iter().map(|queued| queued.token));
            let mut kept = Vec::new();
            for (slot, token) in pending.drain(..).enumerate() {
                if mask & (1 << (slot % 8)) != 0 {
                    tree.animation_finished(token).unwrap();
                } else {
                    kept.push(token);
                }
            }
            pending = kept;
            tree.validate_layout().unwrap();
            assert_flat_list(&tree);
        }
        pending.extend(tree.animator_mut().drain().into_iter().map(|queued| queued.token));
        while !pending.is_empty() {
            for token in pending.drain(..) {
                tree.animation_finished(token).unwrap();
            }
            pending.extend(tree.animator_mut().drain().into_iter().map(|queued| queued.token));
        }
        tree.validate_layout().unwrap();
        prop_assert_eq!(tree.viewport().running_animations(), 0);
        assert_consistent(&tree);
    }

    #[test]
    fn expanding_twice_changes_nothing(shape in shape(), choice in any::<usize>()) {
        let mut tree = build(&shape);
        tree.render().unwrap();
        let id = pick(&tree, choice).unwrap();
        tree.expand_node(id).unwrap();
        let once = tree.visible_nodes().to_vec();
        tree.drain_events();
        tree.expand_node(id).unwrap();
        prop_assert_eq!(tree.visible_nodes(), once.as_slice());
        prop_assert!(tree.drain_events().is_empty());
    }

    #[test]
    fn subtract_then_union_restores_the_range(
        from in 0usize..50,
        len in 1usize..50,
        cut in 0usize..50,
    ) {
        let range = Range::new(from, from + len);
        let cut = cut.min(len);
        let head = Range::new(from, from + cut);
        let tail = range.subtract_contiguous(&head).unwrap();
        prop_assert_eq!(tail.size(), len - cut);
        prop_assert_eq!(head.union_contiguous(&tail).unwrap(), range);
        prop_assert_eq!(range.intersect(&head), if cut == 0 { Range::EMPTY } else { head });
        prop_assert!(range.subtract(&range).is_empty());
    }

    #[test]
    fn disjoint_ranges_do_not_merge(a in 0usize..20, b in 1usize..20, gap in 1usize..10) {
        let left = Range::new(a, a + b);
        let right = Range::new(a + b + gap, a + b + gap + b);
        prop_assert_eq!(left.union(&right).len(), 2);
        prop_assert!(left.union_contiguous(&right).is_err());
        prop_assert!(left.intersect(&right).is_empty());
    }
}
