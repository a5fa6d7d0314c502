//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the quizflow
//! crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use quizflow::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let snapshot = QuizSnapshot::from_file("path/to/quiz.json")?;
//! let view = recompute(&snapshot.stages, ViewMode::Editable, None);
//! println!("{} nodes, {} edges", view.nodes.len(), view.edges.len());
//! # Ok(())
//! # }
//! ```

// Stage model
pub use crate::stage::{
    ButtonAction, ButtonConfig, ChoiceConfig, ChoiceOption, Component, ComponentConfig,
    ComponentKind, Connection, IntoStages, LoadingConfig, Position, Stage, StageLoader,
    TextConfig,
};

// Graph and navigation
pub use crate::graph::{
    FlowEditor, GraphView, GridLayout, ViewMode, recompute, to_edges, to_nodes,
};
pub use crate::navigation::{ComponentHandles, Eligibility, OptionHandle, resolve_stage};

// Analytics
pub use crate::analytics::{
    AnalyticsAggregator, AnalyticsConfig, AnalyticsState, ConversionHealth, RefreshOutcome,
    StageAnalytics, StageAnalyticsMap, conversion_rates,
};
pub use crate::live::{LiveSubscription, LiveUpdateChannel};

// Collaborators and data
pub use crate::backend::{AnalyticsSource, PushSource, StageStore, WatchedEntity};
pub use crate::data::{MemoryBackend, QuizSnapshot, Response, Session};

// Rendering host contract
pub use crate::ui::{FlowEdge, FlowNode};

// Error types
pub use crate::error::{FetchError, StageConversionError, StoreError, SubscriptionError};

// Report formatting
pub use crate::report::FunnelFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
