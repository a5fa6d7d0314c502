//! Bridges backend push notifications to analytics refreshes.
//!
//! Each notification triggers one full refresh of the aggregator; deltas are
//! never applied locally.

use crate::analytics::AnalyticsAggregator;
use crate::backend::{PushSource, SubscriptionId, WatchedEntity};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const WATCHED: [WatchedEntity; 2] = [WatchedEntity::Sessions, WatchedEntity::Responses];

pub struct LiveUpdateChannel {
    push: Arc<dyn PushSource>,
    enabled: bool,
}

impl LiveUpdateChannel {
    pub fn new(push: Arc<dyn PushSource>) -> Self {
        Self {
            push,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Subscribes to session and response changes of the aggregator's quiz.
    ///
    /// A failed subscription is logged and yields an inactive handle; the view
    /// then only updates on manual refresh.
    pub async fn connect(&self, aggregator: &Arc<AnalyticsAggregator>) -> LiveSubscription {
        let quiz_id = aggregator.quiz_id().to_string();
        let mut subscription = LiveSubscription {
            quiz_id: quiz_id.clone(),
            push: Arc::clone(&self.push),
            ids: Vec::new(),
            listener: None,
        };

        if !self.enabled || !aggregator.config().live_updates {
            debug!(quiz_id = %quiz_id, "Live updates disabled");
            return subscription;
        }

        let (tx, rx) = mpsc::unbounded_channel::<WatchedEntity>();
        for entity in WATCHED {
            let tx = tx.clone();
            let callback = Box::new(move || {
                // The listener is gone after teardown; late notices are dropped.
                let _ = tx.send(entity);
            });
            match self.push.subscribe(&quiz_id, entity, callback).await {
                Ok(id) => subscription.ids.push(id),
                Err(e) => {
                    warn!(quiz_id = %quiz_id, %entity, error = %e, "Live updates unavailable; falling back to manual refresh");
                    subscription.teardown();
                    return subscription;
                }
            }
        }
        drop(tx);

        subscription.listener = Some(tokio::spawn(listen(rx, Arc::downgrade(aggregator))));
        info!(quiz_id = %quiz_id, "Live analytics updates connected");
        subscription
    }
}

async fn listen(
    mut rx: mpsc::UnboundedReceiver<WatchedEntity>,
    aggregator: std::sync::Weak<AnalyticsAggregator>,
) {
    while let Some(entity) = rx.recv().await {
        let Some(aggregator) = aggregator.upgrade() else {
            break;
        };
        debug!(quiz_id = %aggregator.quiz_id(), %entity, "Change notification received");
        tokio::spawn(async move {
            aggregator.refresh().await;
        });
    }
}

/// Handle of an established live connection. Dropping it unsubscribes.
pub struct LiveSubscription {
    quiz_id: String,
    push: Arc<dyn PushSource>,
    ids: Vec<SubscriptionId>,
    listener: Option<JoinHandle<()>>,
}

impl LiveSubscription {
    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    /// Whether notifications currently trigger refreshes.
    pub fn is_live(&self) -> bool {
        self.listener.is_some()
    }

    /// Unsubscribes both streams. In-flight refreshes are left to finish.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        for id in self.ids.drain(..) {
            self.push.unsubscribe(id);
        }
        if let Some(listener) = self.listener.take() {
            listener.abort();
            debug!(quiz_id = %self.quiz_id, "Live analytics updates disconnected");
        }
    }
}

impl Drop for LiveSubscription {
    fn drop(&mut self) {
        self.teardown();
    }
}
