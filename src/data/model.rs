use crate::error::SnapshotError;
use crate::stage::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;

/// One end-user attempt at a quiz.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub quiz_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    /// Index of the last stage the player displayed.
    #[serde(default)]
    pub current_stage_index: Option<u32>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>, quiz_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            quiz_id: quiz_id.into(),
            started_at,
            completed_at: None,
            is_completed: false,
            current_stage_index: None,
            device: None,
            referrer: None,
        }
    }

    pub fn completed(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self.is_completed = true;
        self
    }

    pub fn has_completed(&self) -> bool {
        self.is_completed || self.completed_at.is_some()
    }
}

/// A recorded arrival/answer at one stage within a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    pub id: String,
    pub session_id: String,
    pub stage_id: String,
    pub created_at: DateTime<Utc>,
}

impl Response {
    pub fn new(
        id: impl Into<String>,
        session_id: impl Into<String>,
        stage_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            session_id: session_id.into(),
            stage_id: stage_id.into(),
            created_at,
        }
    }
}

/// A self-contained quiz dump: its stages plus the recorded sessions and responses.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizSnapshot {
    pub quiz_id: String,
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl QuizSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut snapshot: QuizSnapshot = serde_json::from_str(&content)?;
        snapshot.stages.sort_by_key(|s| s.order);
        Ok(snapshot)
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub fn save(&self, path: &str) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SnapshotError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Stage ids in sequence order.
    pub fn stage_ids(&self) -> Vec<String> {
        let mut stages: Vec<&Stage> = self.stages.iter().collect();
        stages.sort_by_key(|s| s.order);
        stages.into_iter().map(|s| s.id.clone()).collect()
    }
}
