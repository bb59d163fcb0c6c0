//! Benchmarks for ancestor resolution
//!
//! Compares the membership scan against the indexed parent lookup on a wide
//! and a deep category tree.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use forum_categories::{AncestorResolver, AncestryStrategy, Category, OrderingIndex};

/// `sections` sections, each with a chain of `depth` nested children
fn build_tree(sections: u64, depth: u32) -> Vec<Category> {
    let mut records = Vec::new();
    let mut next = 1;
    for s in 0..sections {
        let section = next;
        records.push(Category::section(section, format!("Section {s}")).with_ordering(s as i64));
        next += 1;

        let mut parent = section;
        for level in 1..=depth {
            records.push(Category::child(next, parent, level, format!("Child {next}")));
            parent = next;
            next += 1;
        }
    }
    records
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestry_resolve");

    for (sections, depth) in [(200, 3), (20, 30)] {
        let records = build_tree(sections, depth);
        let index = OrderingIndex::build(&records);
        let label = format!("{sections}x{depth}");

        for strategy in [AncestryStrategy::MembershipScan, AncestryStrategy::Indexed] {
            let resolver = AncestorResolver::new(strategy);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), &label),
                &records,
                |b, records| {
                    b.iter(|| {
                        for record in records {
                            black_box(resolver.resolve(record, &index));
                        }
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let records = build_tree(200, 5);
    c.bench_function("ordering_index_build", |b| {
        b.iter(|| black_box(OrderingIndex::build(&records)))
    });
}

criterion_group!(benches, bench_resolve, bench_index_build);
criterion_main!(benches);
