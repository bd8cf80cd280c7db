pub mod journey_builders;

use std::sync::Arc;

use tokio::runtime::Runtime;

use journey_engine::{FakeIdGenerator, FakeTimeProvider, RuntimeContext};

pub fn bench_context() -> RuntimeContext {
    RuntimeContext::new(
        Arc::new(FakeTimeProvider::new(1_700_000_000)),
        Arc::new(FakeIdGenerator::new("bench")),
    )
}

pub fn bench_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build runtime")
}
