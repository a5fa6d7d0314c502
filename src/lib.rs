//! # Quizflow - Quiz Flow Graph and Live Funnel Analytics
//!
//! **Quizflow** models a multi-screen quiz as a directed graph of stages. Stages are
//! connected through typed navigation edges (buttons, per-option destinations,
//! auto-advancing loaders), projected onto canvas nodes and edges for an editor,
//! and overlaid with live funnel metrics computed from recorded quiz sessions.
//!
//! ## Core Workflow
//!
//! 1.  **Load Stages**: Convert persisted stage records into typed `Stage`s with a
//!     `StageLoader` (or implement `IntoStages` for your own format).
//! 2.  **Render the Graph**: Call `graph::recompute` with the stages, a `ViewMode` and
//!     the selected stage id to get the nodes and edges the canvas expects.
//! 3.  **Edit**: Drive a `FlowEditor` from canvas events. Every mutation is pure,
//!     pruned of dangling connections and persisted through your `StageStore`.
//! 4.  **Analyze**: Build an `AnalyticsAggregator` over your `AnalyticsSource`, refresh
//!     it, and attach a `LiveUpdateChannel` so backend pushes keep it current.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizflow::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let snapshot = QuizSnapshot::from_file("quiz.json")?;
//! let backend = Arc::new(MemoryBackend::from_snapshot(&snapshot));
//!
//! // Funnel analytics with live updates.
//! let aggregator = Arc::new(
//!     AnalyticsAggregator::builder(snapshot.quiz_id.clone(), backend.clone()).build(),
//! );
//! aggregator.refresh().await;
//! let _live = LiveUpdateChannel::new(backend.clone()).connect(&aggregator).await;
//!
//! // Editable canvas.
//! let mut editor = FlowEditor::load(snapshot.quiz_id.clone(), backend.clone()).await?;
//! editor.connect("welcome", None, "question-1").await?;
//!
//! if let Some(analytics) = aggregator.analytics() {
//!     let view = editor.view(ViewMode::Analytics(&analytics));
//!     println!("{}", serde_json::to_string_pretty(&view)?);
//!     println!("{}", FunnelFormatter::format_funnel(editor.stages(), &analytics));
//! }
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod backend;
pub mod data;
pub mod error;
pub mod graph;
pub mod live;
pub mod navigation;
pub mod prelude;
pub mod report;
pub mod stage;
pub mod ui;
