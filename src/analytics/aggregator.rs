use super::compute::{StageAnalyticsMap, compute_stage_analytics};
use crate::backend::AnalyticsSource;
use crate::error::FetchError;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Source of "now" for the activity window.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Length of the trailing recent-activity window.
pub const DEFAULT_ACTIVITY_WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub activity_window: Duration,
    /// Whether a live update channel should be attached to the aggregator.
    pub live_updates: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            activity_window: Duration::minutes(DEFAULT_ACTIVITY_WINDOW_MINUTES),
            live_updates: true,
        }
    }
}

/// What readers observe. Replaced as a whole on every change.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsState {
    /// Last successfully computed snapshot. Survives failed refreshes.
    pub analytics: Option<Arc<StageAnalyticsMap>>,
    pub is_loading: bool,
    /// Error of the most recent failed refresh, cleared by the next success.
    pub last_error: Option<FetchError>,
    /// Generation of the refresh that produced `analytics`.
    pub generation: u64,
}

/// The result of one refresh call.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Applied { generation: u64 },
    /// The fetch failed; previous analytics were kept.
    Failed(FetchError),
    /// A newer refresh had already been applied.
    Stale { generation: u64 },
    /// The consuming view was unmounted.
    Discarded,
}

pub struct AnalyticsAggregatorBuilder {
    quiz_id: String,
    source: Arc<dyn AnalyticsSource>,
    config: AnalyticsConfig,
    clock: Clock,
}

impl AnalyticsAggregatorBuilder {
    pub fn new(quiz_id: impl Into<String>, source: Arc<dyn AnalyticsSource>) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            source,
            config: AnalyticsConfig::default(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_config(mut self, config: AnalyticsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_activity_window(mut self, window: Duration) -> Self {
        self.config.activity_window = window;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> AnalyticsAggregator {
        let (state, _) = watch::channel(AnalyticsState::default());
        AnalyticsAggregator {
            quiz_id: self.quiz_id,
            source: self.source,
            config: self.config,
            clock: self.clock,
            state,
            next_generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            mounted: AtomicBool::new(true),
        }
    }
}

/// Computes per-stage lead counts and recent activity for one quiz.
///
/// Every refresh is a full recompute from freshly fetched sessions, responses
/// and stage order. Refreshes may overlap; each one is stamped with a
/// generation and a result is only applied when it is newer than the snapshot
/// currently published.
pub struct AnalyticsAggregator {
    quiz_id: String,
    source: Arc<dyn AnalyticsSource>,
    config: AnalyticsConfig,
    clock: Clock,
    state: watch::Sender<AnalyticsState>,
    next_generation: AtomicU64,
    in_flight: AtomicUsize,
    mounted: AtomicBool,
}

impl AnalyticsAggregator {
    pub fn builder(
        quiz_id: impl Into<String>,
        source: Arc<dyn AnalyticsSource>,
    ) -> AnalyticsAggregatorBuilder {
        AnalyticsAggregatorBuilder::new(quiz_id, source)
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// The current state.
    pub fn state(&self) -> AnalyticsState {
        self.state.borrow().clone()
    }

    /// The last good snapshot, if any.
    pub fn analytics(&self) -> Option<Arc<StageAnalyticsMap>> {
        self.state.borrow().analytics.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<AnalyticsState> {
        self.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Marks the consuming view as gone. Refreshes finishing afterwards are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Alias of `refresh` for the manual retry affordance.
    pub async fn refetch(&self) -> RefreshOutcome {
        self.refresh().await
    }

    /// Fetches raw data and recomputes the snapshot.
    ///
    /// Fetch failures are logged and leave the published analytics untouched.
    pub async fn refresh(&self) -> RefreshOutcome {
        if !self.is_mounted() {
            return RefreshOutcome::Discarded;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let in_flight = InFlight::enter(self, generation);
        debug!(quiz_id = %self.quiz_id, generation, "Refreshing funnel analytics");

        let result = self.fetch_and_compute().await;
        self.finish(in_flight, result)
    }

    async fn fetch_and_compute(&self) -> Result<StageAnalyticsMap, FetchError> {
        let sessions = self.source.list_sessions(&self.quiz_id).await?;
        let session_ids: Vec<String> = sessions.iter().map(|s| s.id.clone()).collect();
        let responses = if session_ids.is_empty() {
            Vec::new()
        } else {
            self.source.list_responses(&session_ids).await?
        };
        let stage_ids = self.source.list_stage_ids(&self.quiz_id).await?;

        Ok(compute_stage_analytics(
            &stage_ids,
            &sessions,
            &responses,
            (self.clock)(),
            self.config.activity_window,
        ))
    }

    fn finish(
        &self,
        mut in_flight: InFlight<'_>,
        result: Result<StageAnalyticsMap, FetchError>,
    ) -> RefreshOutcome {
        let generation = in_flight.generation;
        let mounted = self.is_mounted();
        let mut outcome = RefreshOutcome::Discarded;

        self.state.send_modify(|s| {
            s.is_loading = in_flight.leave();

            outcome = match result {
                _ if !mounted => RefreshOutcome::Discarded,
                Err(_) if generation <= s.generation => RefreshOutcome::Stale { generation },
                Err(e) => {
                    s.last_error = Some(e.clone());
                    RefreshOutcome::Failed(e)
                }
                Ok(_) if generation <= s.generation => RefreshOutcome::Stale { generation },
                Ok(map) => {
                    info!(
                        quiz_id = %self.quiz_id,
                        generation,
                        stages = map.stage_order.len(),
                        sessions = map.total_sessions,
                        "Funnel analytics updated"
                    );
                    s.analytics = Some(Arc::new(map));
                    s.last_error = None;
                    s.generation = generation;
                    RefreshOutcome::Applied { generation }
                }
            };
        });

        match &outcome {
            RefreshOutcome::Failed(e) => {
                warn!(quiz_id = %self.quiz_id, generation, error = %e, "Analytics refresh failed; keeping previous data")
            }
            RefreshOutcome::Stale { .. } => {
                debug!(quiz_id = %self.quiz_id, generation, "Dropping stale analytics result")
            }
            RefreshOutcome::Discarded => {
                debug!(quiz_id = %self.quiz_id, generation, "View unmounted; analytics result discarded")
            }
            RefreshOutcome::Applied { .. } => {}
        }
        outcome
    }
}

/// Marks one refresh as in flight for as long as it lives.
///
/// A refresh future dropped before completion (a timeout, a losing `select!`
/// branch) still leaves the in-flight set, so `is_loading` never sticks.
struct InFlight<'a> {
    aggregator: &'a AnalyticsAggregator,
    generation: u64,
    left: bool,
}

impl<'a> InFlight<'a> {
    fn enter(aggregator: &'a AnalyticsAggregator, generation: u64) -> Self {
        aggregator.in_flight.fetch_add(1, Ordering::SeqCst);
        aggregator.state.send_modify(|s| s.is_loading = true);
        Self {
            aggregator,
            generation,
            left: false,
        }
    }

    /// Leaves the in-flight set. Returns whether other refreshes are still running.
    fn leave(&mut self) -> bool {
        self.left = true;
        self.aggregator.in_flight.fetch_sub(1, Ordering::SeqCst) > 1
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.left {
            return;
        }
        let aggregator = self.aggregator;
        aggregator.state.send_modify(|s| s.is_loading = self.leave());
        debug!(quiz_id = %aggregator.quiz_id, generation = self.generation, "Analytics refresh cancelled");
    }
}
