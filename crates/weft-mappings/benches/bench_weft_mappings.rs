use criterion::{black_box, criterion_group, criterion_main, Criterion};
use weft_mappings::namespace::Namespaces;
use weft_mappings::tree::MappingTree;
use weft_mappings::{hash_tree, remap_descriptor};

fn build_tree(classes: usize) -> MappingTree {
    let ns = Namespaces::new(["obf", "intermediate", "named"]).unwrap();
    let mut tree = MappingTree::new(ns);
    for i in 0..classes {
        let c = tree
            .add_class(vec![
                Some(format!("a{i}")),
                Some(format!("class_{i}")),
                Some(format!("net/example/Class{i}")),
            ])
            .unwrap();
        for j in 0..5 {
            tree.add_method(
                c,
                format!("(La{i};I)V"),
                vec![
                    Some(format!("m{j}")),
                    Some(format!("method_{i}_{j}")),
                    Some(format!("doThing{j}")),
                ],
            )
            .unwrap();
        }
    }
    tree
}

fn bench_hash_tree(c: &mut Criterion) {
    let tree = build_tree(1000);
    c.bench_function("hash_tree_1000_classes", |b| {
        b.iter(|| black_box(hash_tree(&tree)))
    });
}

fn bench_remap_descriptor(c: &mut Criterion) {
    let tree = build_tree(100);
    c.bench_function("remap_descriptor", |b| {
        b.iter(|| black_box(remap_descriptor("(La5;La42;I[La7;)La99;", &tree, 0, 2)))
    });
}

criterion_group!(benches, bench_hash_tree, bench_remap_descriptor);
criterion_main!(benches);
