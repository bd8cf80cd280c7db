use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use journey_engine::{
    build_graph, parse_graph, BlockOutput, DocumentFormat, JourneyEngine, MemoryJourneyStore,
};

mod helpers;
use helpers::journey_builders::{build_branch_journey, build_linear_journey};
use helpers::{bench_context, bench_runtime};

fn engine() -> JourneyEngine {
    JourneyEngine::builder(Arc::new(MemoryJourneyStore::new()))
        .context(bench_context())
        .build()
}

fn bench_engine(c: &mut Criterion) {
    let rt = bench_runtime();

    for size in [2usize, 10, 50] {
        let graph = build_graph(
            "bench-linear",
            parse_graph(&build_linear_journey(size), DocumentFormat::Yaml).unwrap(),
        )
        .unwrap();
        c.bench_with_input(BenchmarkId::new("walk_linear", size), &size, |b, size| {
            b.to_async(&rt).iter(|| async {
                let engine = engine();
                let mut run = engine.start_run("learner", &graph).await.unwrap();
                for i in 0..*size {
                    let block = format!("b{}", i);
                    engine
                        .complete_block(&graph, &mut run, &block, BlockOutput::empty())
                        .await
                        .unwrap();
                }
                black_box(run.status)
            });
        });
    }

    let graph = build_graph(
        "bench-branch",
        parse_graph(&build_branch_journey(10), DocumentFormat::Yaml).unwrap(),
    )
    .unwrap();
    c.bench_function("start_and_score_quiz", |b| {
        b.to_async(&rt).iter(|| async {
            let engine = engine();
            let mut run = engine.start_run("learner", &graph).await.unwrap();
            let step = engine
                .complete_block(
                    &graph,
                    &mut run,
                    "quiz",
                    BlockOutput::new(json!({ "scorePercent": 64 })),
                )
                .await
                .unwrap();
            black_box(step.next)
        });
    });
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
