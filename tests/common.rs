//! Common test utilities for building quiz stages, traffic and collaborators.
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use quizflow::analytics::Clock;
use quizflow::backend::{AnalyticsSource, StageStore};
use quizflow::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub const QUIZ: &str = "quiz-1";

/// The reference "now" of every analytics test.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn fixed_clock() -> Clock {
    Arc::new(fixed_now)
}

#[allow(dead_code)]
pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    fixed_now() - Duration::minutes(minutes)
}

#[allow(dead_code)]
pub fn next_button(id: &str) -> Component {
    Component::new(id, "Next", ComponentConfig::button("Next", ButtonAction::Next))
}

/// `n` stages `s0..s{n-1}`, each with a "next" button, without positions or connections.
#[allow(dead_code)]
pub fn create_plain_stages(n: usize) -> Vec<Stage> {
    (0..n)
        .map(|i| {
            Stage::new(format!("s{}", i), i as u32, format!("Stage {}", i))
                .with_component(next_button(&format!("s{}-next", i)))
        })
        .collect()
}

/// A small branching quiz.
///
/// welcome --(start)--> q1 --(q1-choice-a)--> q2 --> loading --> result
///                       \--(q1-choice-b)-----------------------^
#[allow(dead_code)]
pub fn create_quiz_stages() -> Vec<Stage> {
    let mut option_a = ChoiceOption::new("a", "Yes");
    option_a.target_stage_id = Some("q2".to_string());
    let option_b = ChoiceOption::new("b", "No");

    vec![
        Stage::new("welcome", 0, "Welcome")
            .with_component(next_button("start"))
            .with_connection(Connection::new(Some("start".into()), "q1")),
        Stage::new("q1", 1, "Question 1")
            .with_component(Component::new(
                "q1-choice",
                "Choice",
                ComponentConfig::single_choice("Do you agree?", vec![option_a, option_b]),
            ))
            .with_connection(Connection::new(Some("q1-choice-a".into()), "q2"))
            .with_connection(Connection::new(Some("q1-choice-b".into()), "result")),
        Stage::new("q2", 2, "Question 2")
            .with_component(Component::new(
                "q2-text",
                "Name",
                ComponentConfig::Text(TextConfig { placeholder: None }),
            ))
            .with_connection(Connection::to("loading")),
        Stage::new("loading", 3, "Analyzing")
            .with_component(Component::new(
                "loader",
                "Loader",
                ComponentConfig::Loading(LoadingConfig {
                    duration_ms: Some(2000),
                }),
            ))
            .with_connection(Connection::new(Some("loader".into()), "result")),
        Stage::new("result", 4, "Result").with_component(Component::new(
            "offer",
            "Offer",
            ComponentConfig::button(
                "Buy",
                ButtonAction::CustomUrl {
                    url: Some("https://example.com".into()),
                },
            ),
        )),
    ]
}

#[allow(dead_code)]
pub fn session(id: &str) -> Session {
    Session::new(id, QUIZ, minutes_ago(60))
}

#[allow(dead_code)]
pub fn response(session_id: &str, stage_id: &str, minutes: i64) -> Response {
    Response::new(
        format!("{}-{}-{}", session_id, stage_id, minutes),
        session_id,
        stage_id,
        minutes_ago(minutes),
    )
}

#[allow(dead_code)]
pub fn create_backend(
    stages: Vec<Stage>,
    sessions: Vec<Session>,
    responses: Vec<Response>,
) -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::from_snapshot(&QuizSnapshot {
        quiz_id: QUIZ.to_string(),
        stages,
        sessions,
        responses,
    }))
}

#[allow(dead_code)]
pub fn create_aggregator(source: Arc<dyn AnalyticsSource>) -> Arc<AnalyticsAggregator> {
    Arc::new(
        AnalyticsAggregator::builder(QUIZ, source)
            .with_clock(fixed_clock())
            .build(),
    )
}

/// A stage store whose writes always fail.
#[allow(dead_code)]
pub struct FailingStore;

#[async_trait]
impl StageStore for FailingStore {
    async fn load_stages(&self, quiz_id: &str) -> std::result::Result<Vec<Stage>, StoreError> {
        Err(StoreError::NotFound {
            quiz_id: quiz_id.to_string(),
        })
    }

    async fn save_stages(&self, _quiz_id: &str, _stages: &[Stage]) -> std::result::Result<(), StoreError> {
        Err(StoreError::Write("disk full".to_string()))
    }
}

/// An analytics source whose session queries wait for a gate to open, in call order.
#[allow(dead_code)]
pub struct GatedSource {
    pub inner: Arc<MemoryBackend>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

#[allow(dead_code)]
impl GatedSource {
    /// Returns the source plus one sender per gate.
    pub fn new(inner: Arc<MemoryBackend>, gates: usize) -> (Self, Vec<oneshot::Sender<()>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..gates).map(|_| oneshot::channel()).unzip();
        (
            Self {
                inner,
                gates: Mutex::new(receivers),
            },
            senders,
        )
    }

    pub fn waiting_gates(&self) -> usize {
        self.gates.lock().unwrap().len()
    }
}

#[async_trait]
impl AnalyticsSource for GatedSource {
    async fn list_sessions(&self, quiz_id: &str) -> std::result::Result<Vec<Session>, FetchError> {
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.list_sessions(quiz_id).await
    }

    async fn list_responses(&self, session_ids: &[String]) -> std::result::Result<Vec<Response>, FetchError> {
        self.inner.list_responses(session_ids).await
    }

    async fn list_stage_ids(&self, quiz_id: &str) -> std::result::Result<Vec<String>, FetchError> {
        self.inner.list_stage_ids(quiz_id).await
    }
}
