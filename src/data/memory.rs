use super::model::{QuizSnapshot, Response, Session};
use crate::backend::{
    AnalyticsSource, ChangeCallback, PushSource, StageStore, SubscriptionId, WatchedEntity,
};
use crate::error::{FetchError, StoreError, SubscriptionError};
use crate::stage::Stage;
use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

#[derive(Default)]
struct Tables {
    stages: AHashMap<String, Vec<Stage>>,
    sessions: Vec<Session>,
    responses: Vec<Response>,
    fetch_failure: Option<String>,
    rejected_entities: AHashSet<WatchedEntity>,
    push_closed: bool,
}

struct Subscriber {
    id: SubscriptionId,
    quiz_id: String,
    entity: WatchedEntity,
    callback: Arc<ChangeCallback>,
}

/// An in-memory backend implementing every collaborator contract.
///
/// Inserts fan out to push subscribers the same way the hosted backend does:
/// session changes are scoped to their quiz, response inserts reach every
/// `Responses` subscriber.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<Tables>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscription: AtomicU64,
    session_fetches: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &QuizSnapshot) -> Self {
        let backend = Self::new();
        {
            let mut tables = backend.write();
            tables
                .stages
                .insert(snapshot.quiz_id.clone(), snapshot.stages.clone());
            tables.sessions = snapshot.sessions.clone();
            tables.responses = snapshot.responses.clone();
        }
        backend
    }

    pub fn set_stages(&self, quiz_id: &str, stages: Vec<Stage>) {
        self.write().stages.insert(quiz_id.to_string(), stages);
    }

    pub fn stages(&self, quiz_id: &str) -> Vec<Stage> {
        self.read().stages.get(quiz_id).cloned().unwrap_or_default()
    }

    pub fn insert_session(&self, session: Session) {
        let quiz_id = session.quiz_id.clone();
        self.write().sessions.push(session);
        self.notify(WatchedEntity::Sessions, Some(&quiz_id));
    }

    pub fn insert_response(&self, response: Response) {
        self.write().responses.push(response);
        self.notify(WatchedEntity::Responses, None);
    }

    /// Makes every subsequent analytics query fail with `reason`. `None` heals it.
    pub fn set_fetch_failure(&self, reason: Option<&str>) {
        self.write().fetch_failure = reason.map(str::to_string);
    }

    /// Makes subscriptions to `entity` fail.
    pub fn reject_subscriptions(&self, entity: WatchedEntity) {
        self.write().rejected_entities.insert(entity);
    }

    /// Closes the push channel: current subscribers are dropped and new
    /// subscriptions fail with `SubscriptionError::Closed`.
    pub fn close_push(&self) {
        self.write().push_closed = true;
        self.lock_subscribers().clear();
    }

    /// Number of `list_sessions` calls served so far (one per aggregator refresh).
    pub fn session_fetches(&self) -> usize {
        self.session_fetches.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    fn notify(&self, entity: WatchedEntity, quiz_id: Option<&str>) {
        // Callbacks run outside the lock so they may subscribe or unsubscribe.
        let callbacks: Vec<Arc<ChangeCallback>> = self
            .lock_subscribers()
            .iter()
            .filter(|s| s.entity == entity)
            .filter(|s| quiz_id.is_none_or(|q| q == s.quiz_id))
            .map(|s| Arc::clone(&s.callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    fn check_available(&self) -> Result<(), FetchError> {
        match &self.read().fetch_failure {
            Some(reason) => Err(FetchError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StageStore for MemoryBackend {
    async fn load_stages(&self, quiz_id: &str) -> Result<Vec<Stage>, StoreError> {
        self.read()
            .stages
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                quiz_id: quiz_id.to_string(),
            })
    }

    async fn save_stages(&self, quiz_id: &str, stages: &[Stage]) -> Result<(), StoreError> {
        self.write()
            .stages
            .insert(quiz_id.to_string(), stages.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AnalyticsSource for MemoryBackend {
    async fn list_sessions(&self, quiz_id: &str) -> Result<Vec<Session>, FetchError> {
        self.session_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self
            .read()
            .sessions
            .iter()
            .filter(|s| s.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn list_responses(&self, session_ids: &[String]) -> Result<Vec<Response>, FetchError> {
        self.check_available()?;
        let wanted: AHashSet<&str> = session_ids.iter().map(String::as_str).collect();
        Ok(self
            .read()
            .responses
            .iter()
            .filter(|r| wanted.contains(r.session_id.as_str()))
            .cloned()
            .collect())
    }

    async fn list_stage_ids(&self, quiz_id: &str) -> Result<Vec<String>, FetchError> {
        self.check_available()?;
        let mut stages = self.read().stages.get(quiz_id).cloned().unwrap_or_default();
        stages.sort_by_key(|s| s.order);
        Ok(stages.into_iter().map(|s| s.id).collect())
    }
}

#[async_trait]
impl PushSource for MemoryBackend {
    async fn subscribe(
        &self,
        quiz_id: &str,
        entity: WatchedEntity,
        callback: ChangeCallback,
    ) -> Result<SubscriptionId, SubscriptionError> {
        if self.read().push_closed {
            return Err(SubscriptionError::Closed);
        }
        if self.read().rejected_entities.contains(&entity) {
            return Err(SubscriptionError::Rejected {
                quiz_id: quiz_id.to_string(),
                entity,
                reason: "channel refused".to_string(),
            });
        }
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        self.lock_subscribers().push(Subscriber {
            id,
            quiz_id: quiz_id.to_string(),
            entity,
            callback: Arc::new(callback),
        });
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_subscribers().retain(|s| s.id != id);
    }
}
