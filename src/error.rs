use crate::backend::WatchedEntity;
use thiserror::Error;

/// Errors raised by the session/response query collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to fetch sessions: {0}")]
    Sessions(String),

    #[error("Failed to fetch responses: {0}")]
    Responses(String),

    #[error("Failed to fetch stage order: {0}")]
    Stages(String),

    #[error("Analytics source unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the stage persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No stages stored for quiz '{quiz_id}'")]
    NotFound { quiz_id: String },

    #[error("Failed to persist stages: {0}")]
    Write(String),
}

/// Errors that can occur while establishing a push subscription.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Subscription to {entity} of quiz '{quiz_id}' was rejected: {reason}")]
    Rejected {
        quiz_id: String,
        entity: WatchedEntity,
        reason: String,
    },

    #[error("Push notification source is closed")]
    Closed,
}

/// Errors that can occur when converting persisted stage records into typed `Stage`s.
#[derive(Error, Debug, Clone)]
pub enum StageConversionError {
    #[error("Stage id '{0}' appears more than once")]
    DuplicateStageId(String),

    #[error("Stage at position {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("Failed to parse stage JSON: {0}")]
    Json(String),
}

/// Errors that can occur when reading or writing a `QuizSnapshot`.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Could not access snapshot file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}
