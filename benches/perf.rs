use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tui_treeviewport::{NodeModel, RowSurface, TextFilter, Tree, TreeConfig};

type BenchTree = Tree<u32, RowSurface<u32>>;

/// `roots` root nodes with `children` children each.
fn wide(roots: u32, children: u32) -> BenchTree {
    let mut tree = Tree::new(RowSurface::new(), TreeConfig::default().animated(false));
    let models = (0..roots)
        .map(|root| {
            let id = root * 100_000;
            let nodes = (1..=children)
                .map(|child| NodeModel::new(id + child).text(format!("node {root}.{child}")));
            NodeModel::new(id).text(format!("root {root}")).children(nodes)
        })
        .collect();
    if let Err(err) = tree.insert_nodes(models, None) {
        panic!("bench tree: {err}");
    }
    tree
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/expand");
    for children in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("rendered", children), &children, |b, &children| {
            let mut tree = wide(4, children);
            tree.render().unwrap();
            b.iter(|| {
                tree.expand_node(100_000).unwrap();
                tree.validate_layout().unwrap();
                tree.collapse_node(100_000).unwrap();
                black_box(tree.visible_nodes().len());
            });
        });
    }
    group.finish();
}

fn bench_scroll(c: &mut Criterion) {
    let mut tree = wide(10, 1_000);
    tree.set_view_height(40).unwrap();
    for root in 0..10 {
        tree.expand_node(root * 100_000).unwrap();
    }
    tree.render().unwrap();
    let mut top = 0u32;
    c.bench_function("tree/scroll", |b| {
        b.iter(|| {
            top = (top + 17) % 9_000;
            tree.set_scroll_top(black_box(top)).unwrap();
        });
    });
}

fn bench_filter(c: &mut Criterion) {
    let mut tree = wide(10, 1_000);
    for root in 0..10 {
        tree.expand_node(root * 100_000).unwrap();
    }
    tree.render().unwrap();
    c.bench_function("tree/filter", |b| {
        b.iter(|| {
            let handle = tree.add_filter(TextFilter::new("node 3.")).unwrap();
            tree.remove_filter(handle).unwrap();
            black_box(tree.visible_nodes().len());
        });
    });
}

criterion_group!(benches, bench_expand, bench_scroll, bench_filter);
criterion_main!(benches);
