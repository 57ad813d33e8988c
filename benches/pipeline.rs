use clause_graph::pipeline::parse_program;
use clause_graph::{
    Config, Grammar, GrammarParser, Theme, compute_layout, extract_graph, render_svg,
    visualize_source,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn family_source(people: usize) -> String {
    let mut out = String::new();
    for i in 0..people {
        out.push_str(&format!("parent(p{i}, p{}).\n", i + 1));
        if i % 5 == 0 {
            out.push_str(&format!("age(p{i}, {}).\n", 20 + i));
        }
    }
    out.push_str("grandparent(X, Z) :- parent(X, Y), parent(Y, Z).\n");
    out.push_str("adult(P) :- age(P, A), A >= 18.\n");
    out.push_str("older(P, Q) :- age(P, A), age(Q, B), A - B > 0.\n");
    out.push_str("collect(Xs) :- findall(X, parent(X, _), Xs), length(Xs, [N|_]).\n");
    out.push_str("report(In) :- collect(In), 'OutputList'(In, Out).\n");
    out
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let parser = GrammarParser::default();
    for size in [10usize, 100, 500] {
        let program = parse_program(&family_source(size), &parser);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &program.clauses,
            |b, data| {
                b.iter(|| {
                    let graph = extract_graph(black_box(data));
                    black_box(graph.nodes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_visualize(c: &mut Criterion) {
    let mut group = c.benchmark_group("visualize");
    let grammar = Grammar::default();
    for size in [10usize, 100, 500] {
        let source = family_source(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, data| {
            b.iter(|| {
                let graph = visualize_source(black_box(data), &grammar);
                black_box(graph.edges.len());
            });
        });
    }
    group.finish();
}

fn bench_layout_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_render");
    let grammar = Grammar::default();
    let theme = Theme::classic();
    let config = Config::default();
    for size in [10usize, 50, 100] {
        let graph = visualize_source(&family_source(size), &grammar);
        group.bench_with_input(BenchmarkId::from_parameter(size), &graph, |b, data| {
            b.iter(|| {
                let layout = compute_layout(black_box(data), &config.layout);
                let svg = render_svg(&layout, &theme, &config.render);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_extract, bench_visualize, bench_layout_render
);
criterion_main!(benches);
