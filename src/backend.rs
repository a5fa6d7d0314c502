//! Contracts for the external collaborators the flow core talks to.
//!
//! Every collaborator is passed in explicitly, so the aggregator, editor and
//! live channel can run against the real backend or an in-memory fake.

use crate::data::{Response, Session};
use crate::error::{FetchError, StoreError, SubscriptionError};
use crate::stage::Stage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Loads and persists the stage list of a quiz.
#[async_trait]
pub trait StageStore: Send + Sync {
    async fn load_stages(&self, quiz_id: &str) -> Result<Vec<Stage>, StoreError>;

    /// Replaces the stored stage list. Called after every structural mutation.
    async fn save_stages(&self, quiz_id: &str, stages: &[Stage]) -> Result<(), StoreError>;
}

/// Read-only queries over recorded sessions and responses.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn list_sessions(&self, quiz_id: &str) -> Result<Vec<Session>, FetchError>;

    async fn list_responses(&self, session_ids: &[String]) -> Result<Vec<Response>, FetchError>;

    /// Stage ids of the quiz in sequence order.
    async fn list_stage_ids(&self, quiz_id: &str) -> Result<Vec<String>, FetchError>;
}

/// The entity collections a push subscription can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchedEntity {
    Sessions,
    Responses,
}

impl fmt::Display for WatchedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchedEntity::Sessions => write!(f, "sessions"),
            WatchedEntity::Responses => write!(f, "responses"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Invoked on every change. Carries no payload beyond "something changed".
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Backend change notifications.
#[async_trait]
pub trait PushSource: Send + Sync {
    /// `Sessions` subscriptions only fire for the given quiz. `Responses`
    /// subscriptions fire for every inserted response.
    async fn subscribe(
        &self,
        quiz_id: &str,
        entity: WatchedEntity,
        callback: ChangeCallback,
    ) -> Result<SubscriptionId, SubscriptionError>;

    fn unsubscribe(&self, id: SubscriptionId);
}
