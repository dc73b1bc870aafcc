//! Strategy comparison on deep and wide graphs.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use strand_core::{Graph, Node};
use strand_exec::{Bindings, Executor};

fn chain(len: usize) -> Graph {
    let mut graph = Graph::new();
    graph.insert(Node::constant("n0", "payload")).unwrap();
    for i in 1..len {
        graph
            .insert(Node::operation(
                format!("n{i}"),
                "reverse",
                vec![format!("n{}", i - 1)],
                vec![],
            ))
            .unwrap();
    }
    graph
}

fn fan_out(width: usize) -> Graph {
    let mut graph = Graph::new();
    graph.insert(Node::constant("src", "payload")).unwrap();
    let ids: Vec<String> = (0..width).map(|i| format!("r{i}")).collect();
    for id in &ids {
        graph
            .insert(Node::operation(
                id.clone(),
                "reverse",
                vec!["src".into()],
                vec![],
            ))
            .unwrap();
    }
    graph
        .insert(Node::operation("out", "concat", ids, vec![]))
        .unwrap();
    graph
}

fn bench_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_2000");
    let empty = Bindings::new();

    group.bench_function("iterative", |b| {
        let mut graph = chain(2000);
        let mut executor = Executor::new(&mut graph);
        b.iter(|| black_box(executor.evaluate_iterative("n1999", &empty).unwrap()));
    });
    group.bench_function("parallel", |b| {
        let mut graph = chain(2000);
        let mut executor = Executor::new(&mut graph);
        b.iter(|| black_box(executor.evaluate_parallel("n1999", &empty).unwrap()));
    });
    group.finish();
}

fn bench_wide_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out_1000");
    let empty = Bindings::new();

    group.bench_function("iterative", |b| {
        let mut graph = fan_out(1000);
        let mut executor = Executor::new(&mut graph);
        b.iter(|| black_box(executor.evaluate_iterative("out", &empty).unwrap()));
    });
    group.bench_function("parallel", |b| {
        let mut graph = fan_out(1000);
        let mut executor = Executor::new(&mut graph);
        b.iter(|| black_box(executor.evaluate_parallel("out", &empty).unwrap()));
    });
    group.finish();
}

fn bench_small_recursive(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_50");
    let empty = Bindings::new();

    group.bench_function("recursive", |b| {
        let mut graph = chain(50);
        let mut executor = Executor::new(&mut graph);
        b.iter(|| black_box(executor.evaluate_recursive("n49", &empty).unwrap()));
    });
    group.bench_function("auto", |b| {
        let mut graph = chain(50);
        let mut executor = Executor::new(&mut graph);
        b.iter(|| black_box(executor.evaluate_auto("n49", &empty).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_deep_chain,
    bench_wide_fan_out,
    bench_small_recursive
);
criterion_main!(benches);
