use std::sync::Arc;

use serde_json::json;

use journey_engine::{
    create_draft, publish_version, BlockOutput, DocumentFormat, MemoryContentCatalog,
    MemoryJourneyStore, Module, NavigationOutcome, RuntimeContext, TrackNavigator, Track,
};
use journey_engine::{ContentCatalog, JourneyEngine};

const INTRO_MODULE: &str = r#"
startBlockId: welcome
blocks:
  - id: welcome
    type: read
    content:
      title: Ownership in Rust
      body: Every value has exactly one owner.
  - id: check
    type: quiz
    content:
      passingScore: 50
      questions:
        - id: q1
          prompt: Who frees a value?
          options: ["the GC", "its owner"]
          correctOption: 1
          topic: ownership
        - id: q2
          prompt: Can two owners exist?
          options: ["yes", "no"]
          correctOption: 1
          topic: borrowing
  - id: recap
    type: read
    content:
      title: Recap
  - id: done
    type: checkpoint
    content:
      title: Module complete
edges:
  - from: welcome
    to: check
  - from: check
    to: done
    priority: 1
    condition:
      all:
        - fact: quiz.scorePercent
          op: gte
          value: 50
  - from: check
    to: recap
    priority: 2
    condition:
      all:
        - fact: quiz.scorePercent
          op: lt
          value: 50
  - from: recap
    to: check
"#;

const PRACTICE_MODULE: &str = r#"
startBlockId: practice
blocks:
  - id: practice
    type: exercise
    content:
      instructions: Fix the borrow checker error.
      passingScore: 80
edges: []
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Journey Engine ===\n");

    let catalog = Arc::new(MemoryContentCatalog::new());
    catalog.save_track(&Track::new("rust-101", "Rust 101")).await?;
    for (module_id, order, source) in [("intro", 1, INTRO_MODULE), ("practice", 2, PRACTICE_MODULE)] {
        catalog
            .save_module(&Module::new(module_id, "rust-101", order, module_id))
            .await?;
        let graph = journey_engine::parse_graph(source, DocumentFormat::Yaml)?;
        let version_id = format!("{}-v1", module_id);
        create_draft(catalog.as_ref(), module_id, version_id.clone(), graph, 0).await?;
        let report = publish_version(catalog.as_ref(), &version_id, 0).await?;
        println!("published {} ({} warnings)", version_id, report.warnings().len());
    }

    let engine = JourneyEngine::builder(Arc::new(MemoryJourneyStore::new()))
        .context(RuntimeContext::default())
        .build();
    let navigator = TrackNavigator::new(Arc::new(engine), catalog);

    let mut run = navigator.begin("learner-1", "intro").await?;
    println!("\nstarted run {} at {:?}", run.id, run.current_block_id);

    let script = [
        ("welcome", BlockOutput::empty().with_time_spent(45)),
        ("check", BlockOutput::new(json!({ "answers": { "q1": 0, "q2": 0 } }))),
        ("recap", BlockOutput::empty()),
        ("check", BlockOutput::new(json!({ "answers": { "q1": 1, "q2": 1 } }))),
        ("done", BlockOutput::empty()),
    ];
    for (block_id, output) in script {
        match navigator.complete_block(&mut run, block_id, output).await? {
            NavigationOutcome::NextBlock { block_id: next } => {
                println!("{} -> {}", block_id, next);
            }
            NavigationOutcome::ModuleHandoff {
                module_id,
                run: next_run,
                ..
            } => {
                println!("{} -> module '{}' (run {})", block_id, module_id, next_run.id);
                run = next_run;
            }
            NavigationOutcome::TrackFinished => {
                println!("{} -> track finished", block_id);
            }
        }
    }

    let graph = navigator.graph(&run.journey_version_id).await?;
    let progress = navigator.engine().progress(&graph, &run).await?;
    println!(
        "\nnow on {:?}: {} completed, {} failed, {} in progress",
        progress.current_block_id, progress.completed, progress.failed, progress.in_progress
    );
    Ok(())
}
