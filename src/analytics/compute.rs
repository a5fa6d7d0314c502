use crate::data::{Response, Session};
use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;

/// Funnel metrics for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StageAnalytics {
    /// Distinct sessions that reached the stage.
    pub leads: u64,
    /// Responses recorded inside the activity window.
    pub recent_activity: u64,
}

/// An immutable per-stage analytics snapshot for one quiz.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageAnalyticsMap {
    /// Stage ids in sequence order.
    pub stage_order: Vec<String>,
    pub stages: AHashMap<String, StageAnalytics>,
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub computed_at: Option<DateTime<Utc>>,
}

impl StageAnalyticsMap {
    pub fn get(&self, stage_id: &str) -> StageAnalytics {
        self.stages.get(stage_id).copied().unwrap_or_default()
    }

    pub fn leads(&self, stage_id: &str) -> u64 {
        self.get(stage_id).leads
    }

    pub fn recent_activity(&self, stage_id: &str) -> u64 {
        self.get(stage_id).recent_activity
    }
}

/// Computes the per-stage snapshot from freshly fetched raw data.
///
/// Lead counts are session-deduplicated. Recent activity counts raw responses
/// created at or after `now - window`; responses stamped ahead of `now` by a
/// skewed client clock still count. The first stage is floored at the total
/// session count, since a session can be abandoned before its first response is
/// persisted.
pub fn compute_stage_analytics(
    stage_ids: &[String],
    sessions: &[Session],
    responses: &[Response],
    now: DateTime<Utc>,
    window: Duration,
) -> StageAnalyticsMap {
    let mut stages: AHashMap<String, StageAnalytics> = stage_ids
        .iter()
        .map(|id| (id.clone(), StageAnalytics::default()))
        .collect();

    let known_sessions: AHashSet<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
    let window_start = now - window;

    let by_stage = responses
        .iter()
        .filter(|r| known_sessions.contains(r.session_id.as_str()))
        .map(|r| (r.stage_id.as_str(), r))
        .into_group_map();

    for (stage_id, stage_responses) in by_stage {
        let Some(entry) = stages.get_mut(stage_id) else {
            continue;
        };
        entry.leads = stage_responses
            .iter()
            .map(|r| r.session_id.as_str())
            .unique()
            .count() as u64;
        entry.recent_activity = stage_responses
            .iter()
            .filter(|r| r.created_at >= window_start)
            .count() as u64;
    }

    let total_sessions = sessions.len() as u64;
    if let Some(first) = stage_ids.first().and_then(|id| stages.get_mut(id)) {
        first.leads = first.leads.max(total_sessions);
    }

    StageAnalyticsMap {
        stage_order: stage_ids.to_vec(),
        stages,
        total_sessions,
        completed_sessions: sessions.iter().filter(|s| s.has_completed()).count() as u64,
        computed_at: Some(now),
    }
}
