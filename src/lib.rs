//! # journey-engine — learning-journey graph execution
//!
//! Learning content is authored as a versioned graph of typed blocks
//! (readings, videos, quizzes, missions, AI-help sessions, ...) joined by
//! edges that may be gated on facts produced by the block just finished,
//! such as a quiz score. This crate interprets those graphs:
//!
//! - **Graph model**: deterministic edge ordering (priority, then declaration
//!   order), block lookup, reachability and cycle analysis.
//! - **Condition evaluation**: fail-closed `all` groups over a typed fact
//!   table; each block type declares the facts it contributes.
//! - **Execution engine**: the per-run state machine (`enter`,
//!   `complete_block`, `skip_block`, `abandon`) persisted through a
//!   [`JourneyStore`] with optimistic revisions.
//! - **Continuation**: hand-off to the next published module of a track.
//! - **Publishing**: three-layer validation (structure, topology, semantics)
//!   and the draft / published / archived lifecycle.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use journey_engine::{
//!     build_graph, parse_graph, BlockOutput, DocumentFormat, JourneyEngine, MemoryJourneyStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let yaml = std::fs::read_to_string("journey.yaml")?;
//!     let graph = build_graph("v1", parse_graph(&yaml, DocumentFormat::Yaml)?)?;
//!     let engine = JourneyEngine::builder(Arc::new(MemoryJourneyStore::new())).build();
//!
//!     let mut run = engine.start_run("learner-1", &graph).await?;
//!     let block = run.current_block_id.clone().unwrap_or_default();
//!     let step = engine
//!         .complete_block(&graph, &mut run, &block, BlockOutput::empty())
//!         .await?;
//!     println!("next: {:?}", step.next);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod domain;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod store;

pub use crate::api::{NavigationOutcome, TrackNavigator};
pub use crate::catalog::{
    archive_version, create_draft, publish_version, CatalogError, ContentCatalog,
    MemoryContentCatalog,
};
pub use crate::core::{
    create_event_channel, EventReceiver, EventSender, FakeIdGenerator, FakeTimeProvider,
    IdGenerator, JourneyEvent, RealIdGenerator, RealTimeProvider, RuntimeContext, TimeProvider,
};
pub use crate::domain::execution::{
    BlockOutput, BlockStatus, RunProgress, RunStatus, StepOutcome, UserBlockState,
    UserJourneyRun,
};
pub use crate::domain::model::{
    Block, BlockContent, BlockType, ComparisonOperator, Condition, ConditionGroup, Edge,
    FactValue, GraphDefinition, JourneyVersion, Module, Track, VersionStatus,
};
pub use crate::dsl::{
    parse_graph, to_graph_json, validate_graph, validate_graph_document, DocumentFormat,
    ValidationReport,
};
pub use crate::dsl::validation::{Diagnostic, DiagnosticLevel};
pub use crate::engine::{
    AiHelpConfig, Continuation, ContinuationResolver, EngineConfig, JourneyEngine,
    JourneyEngineBuilder,
};
pub use crate::error::{ErrorCode, ErrorContext, JourneyError, JourneyResult};
pub use crate::evaluator::{FactProvider, FactTable};
pub use crate::graph::{build_graph, JourneyGraph, Route};
pub use crate::store::{FileJourneyStore, JourneyStore, MemoryJourneyStore, StoreError};
